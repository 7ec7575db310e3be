use thiserror::Error;

use crate::descriptor::FocusDiscipline;

/// Top-level error type for the voxdesk dispatcher.
#[derive(Debug, Error)]
pub enum VoxError {
    #[error("command '{command_id}' declares {found} focus but was built as a {expected} command")]
    DisciplineMismatch {
        command_id: String,
        expected: FocusDiscipline,
        found: FocusDiscipline,
    },

    #[error("command '{0}' targets a specific application but names none")]
    MissingTargetApplication(String),

    #[error("invalid key combination '{combo}': {reason}")]
    InvalidKeyCombination { combo: String, reason: String },

    #[error("desktop capability failed: {0}")]
    Platform(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type VoxResult<T> = Result<T, VoxError>;
