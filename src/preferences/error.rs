use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("invalid preference: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl PreferenceError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
