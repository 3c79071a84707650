//! Platform notification capabilities
//!
//! Everything the notifier needs from the host is behind
//! [`NotificationPlatform`]: capability detection, the stored permission,
//! the consent prompt, and the two display surfaces (background worker and
//! direct). `DesktopPlatform` talks to the OS; `FakePlatform` records calls.

use crate::error::{DeliveryError, Result};
use crate::models::{NotificationRequest, WorkerMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

mod desktop;
mod fake;

pub use desktop::DesktopPlatform;
pub use fake::FakePlatform;

/// Permission value as the platform stores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlatformPermission {
    /// Never asked, or the prompt was dismissed
    #[default]
    Default,
    Granted,
    Denied,
}

#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Whether any notification capability exists
    fn is_supported(&self) -> bool;

    /// Stored permission value
    async fn permission(&self) -> PlatformPermission;

    /// Show the consent prompt and wait for the user's answer
    async fn request_permission(&self) -> Result<PlatformPermission>;

    /// Start the background delivery worker
    async fn register_worker(&self) -> Result<()>;

    /// Display through the background worker
    async fn show_worker_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError>;

    /// Display directly from the foreground
    fn show_direct_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError>;

    /// Messages posted by the worker; handed out once
    fn take_worker_messages(&self) -> Option<mpsc::UnboundedReceiver<WorkerMessage>> {
        None
    }
}
