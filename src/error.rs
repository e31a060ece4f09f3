use crate::store::StoreError;
use std::borrow::Cow;
use thiserror::Error;

/// Infrastructure failures. Booking outcomes the user can act on are
/// `Rejected` values instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timezone error: {0}")]
    Timezone(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl AppError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn timezone<S: Into<String>>(msg: S) -> Self {
        Self::Timezone(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Server messages and transport errors can echo attendee emails or
    /// request URLs.
    pub fn is_pii_safe(&self) -> bool {
        !matches!(self, Self::Transport(_) | Self::Store(_))
    }

    pub fn to_safe_string(&self) -> String {
        self.safe_message().into_owned()
    }

    fn safe_message(&self) -> Cow<'_, str> {
        match self {
            Self::Transport(_) | Self::Store(StoreError::Transport(_)) => Cow::Borrowed("Network request failed"),
            Self::Store(StoreError::Status { status, .. }) => {
                Cow::Owned(format!("Server rejected the request ({})", status))
            }
            Self::Store(StoreError::Decode(_)) => Cow::Borrowed("Booking server sent an unreadable response"),
            local => Cow::Owned(local.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
