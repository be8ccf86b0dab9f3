//! Error types for session configuration.
//!
//! The per-frame core never fails; configuration is the only input that can
//! be rejected.

use std::fmt;

use crate::api::config::Channel;

/// Errors produced while parsing or validating a `SessionConfig`.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON could not be parsed.
    Parse(serde_json::Error),
    /// A session needs at least one particle.
    ZeroParticles,
    /// The cloud would not fit in the frame buffer.
    TooManyParticles { count: usize, max: usize },
    /// Speed bounds must be finite, non-negative and ordered.
    InvalidSpeedRange { min: f64, max: f64 },
    /// Frame delta cap must be finite and positive.
    InvalidFrameDelta(f64),
    /// A timeline threshold is negative or not finite.
    InvalidThreshold { index: usize, at: f64 },
    /// A fade endpoint or duration is not finite.
    InvalidFade { index: usize, channel: Channel },
    /// An initial channel level is negative or not finite.
    InvalidLevel { channel: Channel, value: f64 },
    /// A tunable parameter is negative or not finite.
    InvalidParam { name: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Failed to parse session config: {}", e),
            ConfigError::ZeroParticles => write!(f, "particle_count must be at least 1"),
            ConfigError::TooManyParticles { count, max } => {
                write!(f, "particle_count {} exceeds the limit of {}", count, max)
            }
            ConfigError::InvalidSpeedRange { min, max } => {
                write!(f, "Invalid speed range [{}, {}]: bounds must be finite, non-negative and min <= max", min, max)
            }
            ConfigError::InvalidFrameDelta(v) => {
                write!(f, "max_frame_delta must be finite and positive, got {}", v)
            }
            ConfigError::InvalidThreshold { index, at } => {
                write!(f, "Timeline event {} has invalid threshold {}", index, at)
            }
            ConfigError::InvalidFade { index, channel } => {
                write!(f, "Timeline event {} has a non-finite fade on {:?}", index, channel)
            }
            ConfigError::InvalidLevel { channel, value } => {
                write!(f, "Initial level for {:?} must be finite and non-negative, got {}", channel, value)
            }
            ConfigError::InvalidParam { name, value } => {
                write!(f, "Parameter {} must be finite and non-negative, got {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
