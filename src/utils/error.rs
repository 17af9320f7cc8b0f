use crate::utils::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UomError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("uom with id {id} not found")]
    NotFound { id: String },

    #[error("uom with id {id} already exists")]
    Conflict { id: String },

    #[error("persistence error: {message}")]
    Persistence { message: String },

    #[error("id generation failed: {message}")]
    IdGeneration { message: String },

    #[error("operation canceled before completion")]
    Canceled,

    #[error("decode error: {message}")]
    Decode { message: String },

    #[error("configuration error in {field}: {message}")]
    Config { field: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used by the boundary layer to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidInput,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

impl UomError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::Decode { .. } => ErrorCategory::InvalidInput,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Canceled => ErrorCategory::Unavailable,
            Self::Persistence { .. }
            | Self::IdGeneration { .. }
            | Self::Config { .. }
            | Self::Io(_)
            | Self::Serialization(_) => ErrorCategory::Internal,
        }
    }

    /// Field/reason pairs when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for UomError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, UomError>;
