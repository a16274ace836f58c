//! Core library for the Sort Visualiser.
//!
//! Bubble sort is run once, up front, to produce a replayable history of
//! frames (comparisons, swaps, finalizations). The timeline then steps through
//! that history at a configurable cadence and pushes each frame to a render
//! sink and an audio sink supplied by the front end.

pub mod audio;
pub mod config;
pub mod error;
pub mod history;
pub mod render;
pub mod timeline;

pub use audio::{AudioSink, NullAudio, Tone, ToneBank, Waveform};
pub use config::{AppConfig, ArrayConfig, AudioConfig, PlaybackConfig};
pub use error::{Result, SortVizError};
pub use history::{
    generate_history, generate_sequence, Frame, FrameKind, History, HistorySummary, SortMode,
};
pub use render::{BarChart, Canvas, NullRender, RenderSink};
pub use timeline::{
    advance_delay, NullObserver, PlaybackClock, PlaybackController, PlaybackStatus,
    PositionUpdate, TimerHandle, UiObserver,
};
