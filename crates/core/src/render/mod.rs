use crate::{history::MAX_VALUE, Frame, FrameKind};

/// Consumer of frames produced by playback.
///
/// Implementations draw and nothing else: they never feed back into the
/// controller, and rendering the same frame twice must look the same.
pub trait RenderSink {
    fn render_frame(&mut self, frame: &Frame);

    /// Called once when auto-advance reaches the last frame.
    fn signal_run_complete(&mut self);
}

/// Sink that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn render_frame(&mut self, _frame: &Frame) {}
    fn signal_run_complete(&mut self) {}
}

const BAR: char = '|';
const COMPARED: char = '?';
const SWAPPED: char = '!';
const SORTED: char = '#';
const WAVE: char = '*';

/// Tallest chart [`BarChart::new`] accepts.
pub const MAX_CHART_HEIGHT: usize = 200;

/// Draws frames as a column chart made of text rows, tallest row first.
#[derive(Debug, Clone, Copy)]
pub struct BarChart {
    height: usize,
}

impl Default for BarChart {
    fn default() -> Self {
        Self { height: 12 }
    }
}

impl BarChart {
    pub fn new(height: usize) -> Self {
        Self {
            height: height.clamp(1, MAX_CHART_HEIGHT),
        }
    }

    /// Renders one frame. Touched columns take the compare or swap glyph,
    /// finalized columns the sorted glyph.
    pub fn draw(&self, frame: &Frame) -> Vec<String> {
        self.draw_with(frame, |index| match frame.kind {
            FrameKind::Comparison if frame.is_touched(index) => COMPARED,
            FrameKind::Swap if frame.is_touched(index) => SWAPPED,
            _ if frame.is_sorted(index) => SORTED,
            _ => BAR,
        })
    }

    /// Renders the completion wave: one picture per column, sweeping a
    /// highlight left to right across the finished chart.
    pub fn wave(&self, frame: &Frame) -> Vec<Vec<String>> {
        (0..frame.values.len())
            .map(|crest| self.draw_with(frame, |index| if index == crest { WAVE } else { SORTED }))
            .collect()
    }

    fn draw_with(&self, frame: &Frame, glyph: impl Fn(usize) -> char) -> Vec<String> {
        let heights: Vec<usize> = frame
            .values
            .iter()
            .map(|&value| self.scaled(value))
            .collect();

        (1..=self.height)
            .rev()
            .map(|level| {
                heights
                    .iter()
                    .enumerate()
                    .map(|(index, &height)| if height >= level { glyph(index) } else { ' ' })
                    .collect::<String>()
            })
            .collect()
    }

    fn scaled(&self, value: u32) -> usize {
        let value = value.min(MAX_VALUE) as usize;
        ((value * self.height + MAX_VALUE as usize - 1) / MAX_VALUE as usize).max(1)
    }
}

/// Render sink that keeps the most recent picture in memory.
#[derive(Debug, Default, Clone)]
pub struct Canvas {
    chart: BarChart,
    lines: Vec<String>,
    last: Option<Frame>,
    frames_rendered: usize,
    completions: usize,
}

impl Canvas {
    pub fn new(chart: BarChart) -> Self {
        Self {
            chart,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames_rendered
    }

    pub fn completions(&self) -> usize {
        self.completions
    }

    /// Completion wave for the last rendered frame.
    pub fn wave(&self) -> Vec<Vec<String>> {
        self.last
            .as_ref()
            .map(|frame| self.chart.wave(frame))
            .unwrap_or_default()
    }
}

impl RenderSink for Canvas {
    fn render_frame(&mut self, frame: &Frame) {
        self.lines = self.chart.draw(frame);
        self.last = Some(frame.clone());
        self.frames_rendered += 1;
    }

    fn signal_run_complete(&mut self) {
        self.completions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate_history, SortMode};

    #[test]
    fn draws_columns_scaled_to_height() {
        let history = generate_history(&[100, 50, 1], SortMode::Plain);
        let lines = BarChart::new(4).draw(history.get(0).unwrap());

        assert_eq!(lines, vec!["|  ", "|  ", "|| ", "|||"]);
    }

    #[test]
    fn chart_height_is_capped() {
        let history = generate_history(&[100, 1], SortMode::Plain);
        let frame = history.get(0).unwrap();

        let tall = BarChart::new(usize::MAX).draw(frame);
        assert_eq!(tall.len(), MAX_CHART_HEIGHT);
        assert!(tall.iter().all(|row| row.starts_with('|')));
        assert_eq!(BarChart::new(0).draw(frame), vec!["||"]);
    }

    #[test]
    fn marks_touched_and_sorted_columns() {
        let history = generate_history(&[100, 50], SortMode::Plain);
        let chart = BarChart::new(2);
        let frames = history.frames();

        assert_eq!(chart.draw(&frames[1]), vec!["? ", "??"]);
        assert_eq!(chart.draw(&frames[2]), vec![" !", "!!"]);
        assert_eq!(chart.draw(&frames[3]), vec![" #", "|#"]);
        assert_eq!(chart.draw(&frames[4]), vec![" #", "##"]);
    }

    #[test]
    fn canvas_tracks_renders_and_wave() {
        let history = generate_history(&[3, 2, 1], SortMode::EarlyExit);
        let mut canvas = Canvas::new(BarChart::new(3));

        for frame in history.frames() {
            canvas.render_frame(frame);
        }
        canvas.signal_run_complete();

        assert_eq!(canvas.frames_rendered(), history.len());
        assert_eq!(canvas.completions(), 1);
        assert_eq!(canvas.lines().len(), 3);

        let wave = canvas.wave();
        assert_eq!(wave.len(), 3);
        assert!(wave[1].iter().all(|row| row.chars().nth(1) != Some('#')));
    }
}
