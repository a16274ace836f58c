//! Playback of a generated [`History`].
//!
//! [`PlaybackController`] owns the history, a cursor into it, and at most one
//! pending advance. Time is cooperative: the host calls
//! [`PlaybackController::tick`] with the elapsed wall time and every advance
//! that fell due runs in order. Any user operation cancels the pending advance
//! before touching the cursor, so two timelines can never overlap.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    audio::{self, AudioSink, NullAudio},
    config::{clamp_speed, DEFAULT_SPEED},
    generate_history,
    render::{NullRender, RenderSink},
    Frame, History, SortMode,
};

/// Delay between advances at the slowest speed, in milliseconds.
pub const MAX_DELAY_MS: f64 = 500.0;
/// Delay between advances at the fastest speed, in milliseconds.
pub const MIN_DELAY_MS: f64 = 1.0;

/// Maps a speed dial reading (1..=100) to the delay before the next advance.
pub fn advance_delay(speed: u8) -> Duration {
    let dial = f64::from(clamp_speed(speed));
    let millis = MAX_DELAY_MS - (dial / 100.0) * (MAX_DELAY_MS - MIN_DELAY_MS);
    Duration::from_micros((millis * 1000.0).round() as u64)
}

/// Virtual time driven forward by the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Identifies one scheduled advance. A new handle is issued per schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    handle: TimerHandle,
    due: Duration,
}

/// Coarse state of the controller, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No history loaded.
    Idle,
    /// History loaded, cursor on the first frame, not running.
    Ready,
    Running,
    /// Stopped away from the first frame.
    Paused,
}

/// Snapshot handed to [`UiObserver`]s after every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub cursor: usize,
    pub total: usize,
    pub at_start: bool,
    pub at_end: bool,
}

/// Observer for step counters and control enablement.
pub trait UiObserver {
    fn on_position(&mut self, update: PositionUpdate);
}

/// Observer that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl UiObserver for NullObserver {
    fn on_position(&mut self, _update: PositionUpdate) {}
}

/// Steppable, pausable playback over a history.
#[derive(Debug)]
pub struct PlaybackController<R = NullRender, A = NullAudio, O = NullObserver> {
    render: R,
    audio: A,
    observer: O,
    history: Option<History>,
    cursor: usize,
    running: bool,
    speed: u8,
    clock: PlaybackClock,
    pending: Option<PendingAdvance>,
    next_handle: u64,
}

impl PlaybackController {
    /// Controller with no-op sinks, mostly useful for tests and tooling.
    pub fn headless() -> Self {
        Self::new(NullRender, NullAudio, NullObserver)
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::headless()
    }
}

impl<R: RenderSink, A: AudioSink, O: UiObserver> PlaybackController<R, A, O> {
    pub fn new(render: R, audio: A, observer: O) -> Self {
        Self {
            render,
            audio,
            observer,
            history: None,
            cursor: 0,
            running: false,
            speed: DEFAULT_SPEED,
            clock: PlaybackClock::default(),
            pending: None,
            next_handle: 0,
        }
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.set_speed(speed);
        self
    }

    pub fn render_sink(&self) -> &R {
        &self.render
    }

    pub fn audio_sink(&self) -> &A {
        &self.audio
    }

    pub fn audio_sink_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.history.as_ref()?.get(self.cursor)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.pending.map(|pending| pending.handle)
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.history.is_none() {
            PlaybackStatus::Idle
        } else if self.running {
            PlaybackStatus::Running
        } else if self.cursor == 0 {
            PlaybackStatus::Ready
        } else {
            PlaybackStatus::Paused
        }
    }

    /// Generates a fresh history and replaces the current one wholesale.
    pub fn load(&mut self, input: &[u32], mode: SortMode) {
        self.load_history(generate_history(input, mode));
    }

    /// Installs a prebuilt history. Renders the first frame without sound.
    pub fn load_history(&mut self, history: History) {
        self.cancel();
        self.running = false;
        self.cursor = 0;
        tracing::debug!(frames = history.len(), mode = ?history.mode(), "history loaded");
        self.history = Some(history);
        self.render_current();
    }

    /// Starts auto-advance, rewinding first when parked on the last frame.
    pub fn play(&mut self) {
        let Some(last) = self.last_index() else {
            return;
        };

        self.cancel();
        if self.cursor >= last {
            self.cursor = 0;
            self.render_current();
        }

        self.audio.initialize();
        self.running = true;
        self.schedule(self.clock.elapsed());
        tracing::debug!(cursor = self.cursor, speed = self.speed, "playback started");
    }

    pub fn pause(&mut self) {
        self.cancel();
        if self.running {
            self.running = false;
            tracing::debug!(cursor = self.cursor, "playback paused");
        }
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Moves one frame forward. Always pauses; never plays sound.
    pub fn step_forward(&mut self) {
        self.pause();
        if let Some(last) = self.last_index() {
            if self.cursor < last {
                self.cursor += 1;
                self.render_current();
            }
        }
    }

    /// Moves one frame back. Always pauses; never plays sound.
    pub fn step_back(&mut self) {
        self.pause();
        if self.history.is_some() && self.cursor > 0 {
            self.cursor -= 1;
            self.render_current();
        }
    }

    pub fn reset(&mut self) {
        self.pause();
        if self.history.is_some() {
            self.cursor = 0;
            self.render_current();
        }
    }

    /// Pauses and jumps to `index`, clamped to the last frame.
    pub fn seek(&mut self, index: usize) {
        self.pause();
        if let Some(last) = self.last_index() {
            self.cursor = index.min(last);
            self.render_current();
        }
    }

    /// Changes the cadence from the next scheduled advance on. A pending
    /// advance keeps its deadline.
    pub fn set_speed(&mut self, speed: u8) {
        self.speed = clamp_speed(speed);
    }

    /// Time left until the pending advance, if one is scheduled.
    pub fn next_wake(&self) -> Option<Duration> {
        self.pending.map(|pending| pending.due.saturating_sub(self.clock.elapsed()))
    }

    /// Moves the clock forward by `delta` and runs every advance that fell
    /// due, in order. Returns how many advances ran.
    pub fn tick(&mut self, delta: Duration) -> usize {
        self.clock.advance(delta);
        let now = self.clock.elapsed();
        let mut fired = 0;

        while let Some(pending) = self.pending {
            if pending.due > now {
                break;
            }
            self.pending = None;
            self.advance(pending.due);
            fired += 1;
        }

        fired
    }

    fn advance(&mut self, fired_at: Duration) {
        if !self.running {
            return;
        }
        let Some(last) = self.last_index() else {
            self.running = false;
            return;
        };

        if self.cursor >= last {
            self.running = false;
            self.render.signal_run_complete();
            self.notify();
            tracing::debug!(frames = last + 1, "run complete");
            return;
        }

        self.cursor += 1;
        self.render_current();
        if let Some(kind) = self.current_frame().map(|frame| frame.kind) {
            audio::dispatch(&mut self.audio, kind);
        }
        self.schedule(fired_at);
    }

    fn schedule(&mut self, from: Duration) {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let due = from.saturating_add(advance_delay(self.speed));
        tracing::trace!(?handle, ?due, "advance scheduled");
        self.pending = Some(PendingAdvance { handle, due });
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::trace!(handle = ?pending.handle, "advance cancelled");
        }
    }

    fn last_index(&self) -> Option<usize> {
        self.history.as_ref()?.last_index()
    }

    fn render_current(&mut self) {
        if let Some(frame) = self.history.as_ref().and_then(|h| h.get(self.cursor)) {
            self.render.render_frame(frame);
        }
        self.notify();
    }

    fn notify(&mut self) {
        let Some(history) = self.history.as_ref() else {
            return;
        };
        let total = history.len();
        self.observer.on_position(PositionUpdate {
            cursor: self.cursor,
            total,
            at_start: self.cursor == 0,
            at_end: self.cursor + 1 >= total,
        });
    }
}
