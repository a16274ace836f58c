use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::FrameKind;

/// Receives the events that playback wants to sonify.
///
/// The controller only dispatches event kinds. Pitch, envelope and muting are
/// the sink's business.
pub trait AudioSink {
    /// Prepares the output. Called on every `play`, so it must be idempotent.
    fn initialize(&mut self);
    fn play_compare_tone(&mut self);
    fn play_swap_tone(&mut self);
    fn play_sorted_chime(&mut self);
}

/// Routes a frame kind to the matching sink call. `Initial` is silent.
pub fn dispatch<A: AudioSink + ?Sized>(sink: &mut A, kind: FrameKind) {
    match kind {
        FrameKind::Initial => {}
        FrameKind::Comparison => sink.play_compare_tone(),
        FrameKind::Swap => sink.play_swap_tone(),
        FrameKind::Finalized => sink.play_sorted_chime(),
    }
}

/// Sink that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn initialize(&mut self) {}
    fn play_compare_tone(&mut self) {}
    fn play_swap_tone(&mut self) {}
    fn play_sorted_chime(&mut self) {}
}

/// Oscillator shape of a [`Tone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    Sine,
    Triangle,
}

/// Short synthesised cue describing one sonified event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    pub gain: f32,
}

impl Tone {
    pub const COMPARE: Tone = Tone {
        frequency_hz: 440.0,
        duration_ms: 40,
        waveform: Waveform::Sine,
        gain: 0.15,
    };

    pub const SWAP: Tone = Tone {
        frequency_hz: 660.0,
        duration_ms: 60,
        waveform: Waveform::Triangle,
        gain: 0.2,
    };

    pub const SORTED: Tone = Tone {
        frequency_hz: 880.0,
        duration_ms: 120,
        waveform: Waveform::Sine,
        gain: 0.25,
    };

    /// Renders the tone as mono samples with a linear fade-out.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let len = (sample_rate as u64 * self.duration_ms as u64 / 1000) as usize;
        let rate = sample_rate.max(1) as f32;

        (0..len)
            .map(|index| {
                let phase = (index as f32 * self.frequency_hz / rate).fract();
                let envelope = 1.0 - index as f32 / len as f32;
                oscillate(self.waveform, phase) * envelope * self.gain
            })
            .collect()
    }
}

fn oscillate(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (2.0 * PI * phase).sin(),
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// In-memory sink that queues [`Tone`] cues for a backend to drain.
///
/// Cues are dropped until [`AudioSink::initialize`] has run, mirroring an
/// output device that only opens on the first user-driven `play`.
#[derive(Debug, Default, Clone)]
pub struct ToneBank {
    initialized: bool,
    muted: bool,
    pending: Vec<Tone>,
    played: usize,
}

impl ToneBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_muted(muted: bool) -> Self {
        Self {
            muted,
            ..Self::default()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.pending.clear();
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    /// Total number of cues accepted since creation.
    pub fn played(&self) -> usize {
        self.played
    }

    /// Takes every queued cue, oldest first.
    pub fn drain(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.pending)
    }

    fn enqueue(&mut self, tone: Tone) {
        if !self.initialized || self.muted {
            return;
        }
        self.played += 1;
        self.pending.push(tone);
    }
}

impl AudioSink for ToneBank {
    fn initialize(&mut self) {
        self.initialized = true;
    }

    fn play_compare_tone(&mut self) {
        self.enqueue(Tone::COMPARE);
    }

    fn play_swap_tone(&mut self) {
        self.enqueue(Tone::SWAP);
    }

    fn play_sorted_chime(&mut self) {
        self.enqueue(Tone::SORTED);
    }
}
