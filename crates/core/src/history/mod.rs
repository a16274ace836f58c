//! Bubble sort history generation.
//!
//! A history ("script") is the complete, ordered list of [`Frame`]s observed
//! while bubble sorting an input. It is generated once, up front, and then
//! replayed by the timeline. Frames share their value and sorted-index
//! snapshots with their predecessor whenever nothing changed, so a history of
//! `k` frames over `n` values only allocates a new value snapshot per swap.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest value produced by [`generate_sequence`].
pub const MIN_VALUE: u32 = 1;
/// Largest value produced by [`generate_sequence`].
pub const MAX_VALUE: u32 = 100;

/// The event a [`Frame`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    Initial,
    Comparison,
    Swap,
    Finalized,
}

/// Which bubble sort variant generates the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Classic bubble sort: always runs every pass.
    #[default]
    Plain,
    /// Stops as soon as a full pass performs no swap.
    EarlyExit,
}

/// One recorded instant of the sort.
///
/// `values` and `sorted` are shared, read-only snapshots. Two frames may point
/// at the same allocation; consumers must never rely on that either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub kind: FrameKind,
    /// State of the array at this instant.
    pub values: Arc<[u32]>,
    /// Positions involved in the event: the compared or swapped pair, the
    /// finalized position, or every position for a bulk finalize.
    pub touched: Vec<usize>,
    /// Position locked by a `Finalized` frame. A bulk finalize reports `0`
    /// here; use [`Frame::is_bulk_finalize`] to tell the two apart.
    pub finalized_index: Option<usize>,
    /// Positions in their final place, in the order they were finalized.
    pub sorted: Arc<[usize]>,
}

impl Frame {
    /// Returns true for the terminal early-exit frame that finalizes every
    /// remaining position at once.
    pub fn is_bulk_finalize(&self) -> bool {
        self.kind == FrameKind::Finalized
            && self.touched.len() > 1
            && self.touched.len() == self.values.len()
    }

    /// Returns true when `index` is already in its final place.
    pub fn is_sorted(&self, index: usize) -> bool {
        self.sorted.contains(&index)
    }

    /// Returns true when `index` takes part in this frame's event.
    pub fn is_touched(&self, index: usize) -> bool {
        self.touched.contains(&index)
    }
}

/// Counters describing a generated history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    pub mode: SortMode,
    pub len: usize,
    pub frames: usize,
    pub comparisons: usize,
    pub swaps: usize,
    pub finalized: usize,
    pub early_exit: bool,
}

/// Immutable, ordered list of frames for one sort run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    mode: SortMode,
    frames: Vec<Frame>,
}

impl History {
    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Index of the final frame. Every generated history holds at least the
    /// initial frame, so this is only `None` for a hand-built empty history.
    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    /// Tallies the events recorded in the history.
    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            mode: self.mode,
            len: self.frames.first().map(|frame| frame.values.len()).unwrap_or(0),
            frames: self.frames.len(),
            ..Default::default()
        };

        for frame in &self.frames {
            match frame.kind {
                FrameKind::Initial => {}
                FrameKind::Comparison => summary.comparisons += 1,
                FrameKind::Swap => summary.swaps += 1,
                FrameKind::Finalized => {
                    summary.finalized += 1;
                    summary.early_exit |= frame.is_bulk_finalize();
                }
            }
        }

        summary
    }
}

/// Draws `size` values uniformly from `MIN_VALUE..=MAX_VALUE`.
///
/// Callers clamp `size` to the supported range; the generator accepts any.
pub fn generate_sequence<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<u32> {
    (0..size)
        .map(|_| rng.gen_range(MIN_VALUE..=MAX_VALUE))
        .collect()
}

/// Runs bubble sort over a copy of `input` and records every observable event.
///
/// The history always opens with an `Initial` frame and, for non-empty input,
/// ends with every position finalized. Equal neighbours are never swapped.
pub fn generate_history(input: &[u32], mode: SortMode) -> History {
    let mut script = Script::new(input);
    let n = input.len();
    if n == 0 {
        return script.finish(mode);
    }

    for pass in 0..n - 1 {
        let boundary = n - 1 - pass;
        let mut swapped = false;

        for j in 0..boundary {
            script.compare(j);
            if script.values[j] > script.values[j + 1] {
                script.swap(j);
                swapped = true;
            }
        }

        if mode == SortMode::EarlyExit && !swapped {
            script.finalize_through(boundary);
            return script.finish(mode);
        }

        script.finalize(boundary);
    }

    // The one-element remainder is sorted by construction. This also covers
    // a singleton input, where no pass runs at all.
    if !script.is_sorted(0) {
        script.finalize(0);
    }

    script.finish(mode)
}

/// Frame recorder holding the current value and sorted snapshots.
struct Script {
    values: Arc<[u32]>,
    sorted: Arc<[usize]>,
    frames: Vec<Frame>,
}

impl Script {
    fn new(input: &[u32]) -> Self {
        let mut script = Self {
            values: Arc::from(input),
            sorted: Arc::from(Vec::new()),
            frames: Vec::new(),
        };
        script.push(FrameKind::Initial, Vec::new(), None);
        script
    }

    fn compare(&mut self, j: usize) {
        self.push(FrameKind::Comparison, vec![j, j + 1], None);
    }

    fn swap(&mut self, j: usize) {
        let mut next = self.values.to_vec();
        next.swap(j, j + 1);
        self.values = Arc::from(next);
        self.push(FrameKind::Swap, vec![j, j + 1], None);
    }

    fn finalize(&mut self, index: usize) {
        self.mark([index]);
        self.push(FrameKind::Finalized, vec![index], Some(index));
    }

    /// Finalizes `0..=boundary` in one frame that touches every position.
    fn finalize_through(&mut self, boundary: usize) {
        self.mark((0..boundary).chain([boundary]));
        let touched = (0..self.values.len()).collect();
        self.push(FrameKind::Finalized, touched, Some(0));
    }

    fn is_sorted(&self, index: usize) -> bool {
        self.sorted.contains(&index)
    }

    /// Publishes a new sorted snapshot; earlier frames keep the old one.
    fn mark(&mut self, indices: impl IntoIterator<Item = usize>) {
        let mut next = self.sorted.to_vec();
        for index in indices {
            if !next.contains(&index) {
                next.push(index);
            }
        }
        self.sorted = Arc::from(next);
    }

    fn push(&mut self, kind: FrameKind, touched: Vec<usize>, finalized_index: Option<usize>) {
        self.frames.push(Frame {
            kind,
            values: Arc::clone(&self.values),
            touched,
            finalized_index,
            sorted: Arc::clone(&self.sorted),
        });
    }

    fn finish(self, mode: SortMode) -> History {
        History {
            mode,
            frames: self.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn kinds(history: &History) -> Vec<FrameKind> {
        history.frames().iter().map(|frame| frame.kind).collect()
    }

    fn assert_well_formed(input: &[u32], history: &History) {
        let first = history.get(0).expect("history has an initial frame");
        assert_eq!(first.kind, FrameKind::Initial);
        assert!(first.touched.is_empty());
        assert!(first.sorted.is_empty());
        assert_eq!(&first.values[..], input);

        for pair in history.frames().windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert_eq!(next.values.len(), input.len());
            assert!(next.sorted.starts_with(&prev.sorted), "sorted set shrank");

            let diff: Vec<usize> = (0..input.len())
                .filter(|&i| prev.values[i] != next.values[i])
                .collect();
            match next.kind {
                FrameKind::Swap => {
                    assert_eq!(diff.len(), 2);
                    assert_eq!(diff[0] + 1, diff[1]);
                    assert_eq!(next.touched, diff);
                }
                _ => assert!(diff.is_empty(), "{:?} frame changed values", next.kind),
            }
        }

        let last = history.last().expect("history is non-empty");
        let mut expected = input.to_vec();
        expected.sort_unstable();
        assert_eq!(&last.values[..], &expected[..]);

        let mut sorted = last.sorted.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..input.len()).collect::<Vec<_>>());
    }

    #[test]
    fn records_documented_opening_for_plain_mode() {
        let history = generate_history(&[5, 3, 8, 1], SortMode::Plain);
        let frames = history.frames();

        assert_eq!(
            kinds(&history)[..7],
            [
                FrameKind::Initial,
                FrameKind::Comparison,
                FrameKind::Swap,
                FrameKind::Comparison,
                FrameKind::Comparison,
                FrameKind::Swap,
                FrameKind::Finalized,
            ]
        );
        assert_eq!(frames[1].touched, vec![0, 1]);
        assert_eq!(&frames[2].values[..], &[3, 5, 8, 1]);
        assert_eq!(frames[3].touched, vec![1, 2]);
        assert_eq!(frames[4].touched, vec![2, 3]);
        assert_eq!(&frames[5].values[..], &[3, 5, 1, 8]);
        assert_eq!(frames[6].finalized_index, Some(3));
        assert_eq!(&frames[6].sorted[..], &[3]);

        let last = history.last().unwrap();
        assert_eq!(&last.values[..], &[1, 3, 5, 8]);
        assert_eq!(&last.sorted[..], &[3, 2, 1, 0]);
        assert_well_formed(&[5, 3, 8, 1], &history);
    }

    #[test]
    fn plain_mode_compares_every_pair_of_every_pass() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in [2, 5, 13, 40] {
            let input = generate_sequence(size, &mut rng);
            let summary = generate_history(&input, SortMode::Plain).summary();
            assert_eq!(summary.comparisons, size * (size - 1) / 2);
            assert_eq!(summary.finalized, size);
            assert!(!summary.early_exit);
        }
    }

    #[test]
    fn early_exit_on_sorted_input_runs_a_single_pass() {
        let input: Vec<u32> = (1..=10).collect();
        let early = generate_history(&input, SortMode::EarlyExit);
        let plain = generate_history(&input, SortMode::Plain);
        let summary = early.summary();

        assert_eq!(summary.comparisons, 9);
        assert_eq!(summary.swaps, 0);
        assert_eq!(summary.finalized, 1);
        assert!(summary.early_exit);
        assert!(early.len() < plain.len());
        assert!(early.last().unwrap().is_bulk_finalize());
        assert_well_formed(&input, &early);
    }

    #[test]
    fn early_exit_scenario_finalizes_everything_at_once() {
        let history = generate_history(&[1, 2, 3], SortMode::EarlyExit);

        assert_eq!(
            kinds(&history),
            vec![
                FrameKind::Initial,
                FrameKind::Comparison,
                FrameKind::Comparison,
                FrameKind::Finalized,
            ]
        );
        let last = history.last().unwrap();
        assert_eq!(last.touched, vec![0, 1, 2]);
        assert_eq!(&last.sorted[..], &[0, 1, 2]);
        assert_eq!(last.finalized_index, Some(0));
    }

    #[test]
    fn early_exit_stops_after_first_clean_pass() {
        // One swap in the first pass leaves the array sorted; the second
        // pass is clean and ends the run.
        let history = generate_history(&[2, 1, 3, 4], SortMode::EarlyExit);
        let summary = history.summary();

        assert_eq!(summary.swaps, 1);
        assert_eq!(summary.comparisons, 3 + 2);
        assert_eq!(summary.finalized, 2);
        assert_eq!(&history.last().unwrap().sorted[..], &[3, 0, 1, 2]);
        assert_well_formed(&[2, 1, 3, 4], &history);
    }

    #[test]
    fn early_exit_without_clean_pass_finalizes_zero_once() {
        let input = [4, 3, 2, 1];
        let history = generate_history(&input, SortMode::EarlyExit);
        let summary = history.summary();

        assert!(!summary.early_exit);
        assert_eq!(summary.finalized, 4);
        assert_eq!(&history.last().unwrap().sorted[..], &[3, 2, 1, 0]);
        assert_well_formed(&input, &history);
    }

    #[test]
    fn both_modes_hold_invariants_on_random_input() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for size in 1..=30 {
            let input = generate_sequence(size, &mut rng);
            let plain = generate_history(&input, SortMode::Plain);
            let early = generate_history(&input, SortMode::EarlyExit);

            assert_well_formed(&input, &plain);
            assert_well_formed(&input, &early);
            assert_eq!(plain.last().unwrap().values, early.last().unwrap().values);
            assert!(early.len() <= plain.len());
        }
    }

    #[test]
    fn equal_neighbours_are_never_swapped() {
        let history = generate_history(&[7, 7, 7], SortMode::Plain);
        assert_eq!(history.summary().swaps, 0);
    }

    #[test]
    fn comparisons_share_the_previous_snapshot() {
        let history = generate_history(&[3, 1, 2], SortMode::Plain);
        let frames = history.frames();

        assert!(Arc::ptr_eq(&frames[0].values, &frames[1].values));
        assert!(!Arc::ptr_eq(&frames[1].values, &frames[2].values));
        assert!(Arc::ptr_eq(&frames[2].values, &frames[3].values));
        assert_eq!(&frames[1].values[..], &[3, 1, 2]);
    }

    #[test]
    fn finalizing_does_not_rewrite_older_frames() {
        let history = generate_history(&[2, 1], SortMode::Plain);
        let frames = history.frames();

        assert!(frames[2].sorted.is_empty());
        assert_eq!(&frames[3].sorted[..], &[1]);
        assert_eq!(&frames[4].sorted[..], &[1, 0]);
    }

    #[test]
    fn degenerate_inputs() {
        let empty = generate_history(&[], SortMode::Plain);
        assert_eq!(kinds(&empty), vec![FrameKind::Initial]);

        for mode in [SortMode::Plain, SortMode::EarlyExit] {
            let single = generate_history(&[42], mode);
            assert_eq!(kinds(&single), vec![FrameKind::Initial, FrameKind::Finalized]);
            assert_eq!(&single.last().unwrap().sorted[..], &[0]);
            assert!(!single.last().unwrap().is_bulk_finalize());
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let input = [9, 4, 4, 1, 30];
        assert_eq!(
            generate_history(&input, SortMode::EarlyExit),
            generate_history(&input, SortMode::EarlyExit)
        );
    }

    #[test]
    fn generated_sequences_respect_bounds_and_seed() {
        let a = generate_sequence(100, &mut StdRng::seed_from_u64(3));
        let b = generate_sequence(100, &mut StdRng::seed_from_u64(3));

        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (MIN_VALUE..=MAX_VALUE).contains(v)));
    }
}
