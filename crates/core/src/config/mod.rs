use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    history::{MAX_VALUE, MIN_VALUE},
    Result, SortMode, SortVizError,
};

pub const MIN_ARRAY_SIZE: usize = 5;
pub const MAX_ARRAY_SIZE: usize = 100;
pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 100;
pub const DEFAULT_SPEED: u8 = 50;

/// Clamps a requested array size into the supported range.
pub fn clamp_size(size: usize) -> usize {
    size.clamp(MIN_ARRAY_SIZE, MAX_ARRAY_SIZE)
}

/// Clamps a speed dial reading into the supported range.
pub fn clamp_speed(speed: u8) -> u8 {
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub array: ArrayConfig,
    pub playback: PlaybackConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects explicit input that cannot be sorted meaningfully. Size and
    /// speed are clamped on use rather than rejected.
    pub fn validate(&self) -> Result<()> {
        if let Some(values) = &self.array.values {
            if values.is_empty() {
                return Err(SortVizError::InvalidConfig(
                    "array.values must not be empty".to_string(),
                ));
            }
            if let Some(value) = values.iter().find(|v| !(MIN_VALUE..=MAX_VALUE).contains(*v)) {
                return Err(SortVizError::InvalidConfig(format!(
                    "array value {value} is outside {MIN_VALUE}..={MAX_VALUE}"
                )));
            }
        }
        Ok(())
    }
}

/// Describes the array handed to the sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    pub size: usize,
    /// Seed for reproducible random arrays.
    pub seed: Option<u64>,
    /// Explicit input; takes precedence over `size` and `seed`.
    pub values: Option<Vec<u32>>,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            size: 20,
            seed: None,
            values: None,
        }
    }
}

impl ArrayConfig {
    pub fn clamped_size(&self) -> usize {
        clamp_size(self.size)
    }
}

/// Playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub mode: SortMode,
    pub speed: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: SortMode::Plain,
            speed: DEFAULT_SPEED,
        }
    }
}

impl PlaybackConfig {
    pub fn clamped_speed(&self) -> u8 {
        clamp_speed(self.speed)
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub muted: bool,
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            sample_rate: 48_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_size_and_speed() {
        assert_eq!(clamp_size(0), MIN_ARRAY_SIZE);
        assert_eq!(clamp_size(42), 42);
        assert_eq!(clamp_size(5_000), MAX_ARRAY_SIZE);
        assert_eq!(clamp_speed(0), MIN_SPEED);
        assert_eq!(clamp_speed(255), MAX_SPEED);
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "playback": { "mode": "early-exit", "speed": 250 }, "array": { "size": 3 } }"#,
        )
        .unwrap();

        assert_eq!(config.playback.mode, SortMode::EarlyExit);
        assert_eq!(config.playback.clamped_speed(), MAX_SPEED);
        assert_eq!(config.array.clamped_size(), MIN_ARRAY_SIZE);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let err = AppConfig::from_json_str(r#"{ "array": { "values": [3, 0, 9] } }"#).unwrap_err();
        assert!(matches!(err, SortVizError::InvalidConfig(_)));
        assert!(format!("{err}").contains("outside"));

        let err = AppConfig::from_json_str(r#"{ "array": { "values": [] } }"#).unwrap_err();
        assert!(matches!(err, SortVizError::InvalidConfig(_)));
    }

    #[test]
    fn reports_malformed_json() {
        let err = AppConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SortVizError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SortVizError::Io(_)));
    }
}
