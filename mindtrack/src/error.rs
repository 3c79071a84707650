//! Error types for the MindTrack notifier
//!
//! All errors use thiserror for structured error handling.
//! `AppError` serializes to its display string so it can be handed to a UI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The platform has no notification capability at all
    #[error("Notifications are not supported on this platform")]
    CapabilityUnavailable,

    /// The user declined notifications; only an external settings change can undo this
    #[error("Notification permission was denied")]
    PermissionDenied,

    #[error("Delivery channel registration failed: {0}")]
    ChannelRegistrationFailed(String),

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Generic(String),
}

/// Failure of a single delivery attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No usable surface exists, or permission is not granted
    #[error("no notification surface is available")]
    Unavailable,

    #[error("{0}")]
    Failed(String),
}

impl From<DeliveryError> for AppError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::Unavailable => AppError::CapabilityUnavailable,
            DeliveryError::Failed(message) => AppError::DeliveryFailed(message),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl serde::Serialize for DeliveryError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
