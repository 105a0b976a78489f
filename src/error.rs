use std::fmt;
use std::io;

use thiserror::Error;

/// Which configuration constraint was violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigErrorReason {
    WidthTooSmall(usize),
    HeightTooSmall(usize),
    WidthTooLarge(usize),
    HeightTooLarge(usize),
    NoBoxes,
    TooManyBoxes { boxes: usize, cells: usize },
    EmptyGlyph(&'static str),
    DuplicateGlyph(String),
    ZeroAttempts,
}

impl fmt::Display for ConfigErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorReason::WidthTooSmall(w) => write!(f, "width {} is less than 5", w),
            ConfigErrorReason::HeightTooSmall(h) => write!(f, "height {} is less than 5", h),
            ConfigErrorReason::WidthTooLarge(w) => write!(f, "width {} exceeds 64", w),
            ConfigErrorReason::HeightTooLarge(h) => write!(f, "height {} exceeds 64", h),
            ConfigErrorReason::NoBoxes => write!(f, "there must be at least one box"),
            ConfigErrorReason::TooManyBoxes { boxes, cells } => {
                write!(f, "{} boxes do not fit in {} cells", boxes, cells)
            }
            ConfigErrorReason::EmptyGlyph(name) => write!(f, "{} glyph is empty", name),
            ConfigErrorReason::DuplicateGlyph(glyph) => {
                write!(f, "glyph '{}' is used by more than one tile", glyph)
            }
            ConfigErrorReason::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ConfigErrorReason),
    #[error("invalid level: {0}")]
    InvalidLevel(String),
    #[error("level generation failed after {attempts} attempts")]
    GenerationFailed { attempts: usize },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ConfigErrorReason> for GameError {
    fn from(reason: ConfigErrorReason) -> Self {
        GameError::InvalidConfiguration(reason)
    }
}
