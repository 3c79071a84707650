//! Delivery channel
//!
//! Presents a single notification on the best available surface: the
//! background worker first, then a direct notification. Outcomes are
//! published to UI subscribers and recorded in the inbox.

use crate::error::DeliveryError;
use crate::models::{DeliveryChannelState, DeliveryOutcome, NotificationEvent, NotificationRequest};
use crate::platform::NotificationPlatform;
use crate::services::inbox::NotificationInbox;
use crate::services::permission::PermissionManager;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

#[derive(Clone)]
pub struct DeliveryChannel {
    platform: Arc<dyn NotificationPlatform>,
    permission: PermissionManager,
    state: Arc<RwLock<DeliveryChannelState>>,
    inbox: NotificationInbox,
    events: broadcast::Sender<NotificationEvent>,
}

impl DeliveryChannel {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        permission: PermissionManager,
        inbox: NotificationInbox,
        events: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            platform,
            permission,
            state: Arc::new(RwLock::new(DeliveryChannelState::Pending)),
            inbox,
            events,
        }
    }

    pub async fn state(&self) -> DeliveryChannelState {
        *self.state.read().await
    }

    /// Register the background worker. Failure is recorded, not raised:
    /// delivery keeps working through the direct path.
    pub async fn register_channel(&self) -> DeliveryChannelState {
        let next = match self.platform.register_worker().await {
            Ok(()) => {
                tracing::info!("Background delivery worker registered");
                DeliveryChannelState::Registered
            }
            Err(e) => {
                tracing::warn!("Background worker registration failed: {}", e);
                DeliveryChannelState::Failed
            }
        };

        *self.state.write().await = next;
        let _ = self
            .events
            .send(NotificationEvent::ChannelStateChanged { state: next });
        next
    }

    /// Try the worker, then the direct surface
    pub async fn deliver(
        &self,
        request: &NotificationRequest,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        if !self.permission.is_granted().await {
            return Err(DeliveryError::Unavailable);
        }

        if self.state().await == DeliveryChannelState::Registered {
            match self.platform.show_worker_notification(request).await {
                Ok(()) => return Ok(DeliveryOutcome::Worker),
                Err(e) => {
                    tracing::warn!("Worker delivery failed, falling back to direct: {}", e);
                }
            }
        }

        self.platform
            .show_direct_notification(request)
            .map(|()| DeliveryOutcome::Direct)
    }

    /// Deliver and report; a failed request is dropped, never retried
    pub async fn dispatch(&self, request: NotificationRequest) -> Option<DeliveryOutcome> {
        match self.deliver(&request).await {
            Ok(outcome) => {
                tracing::info!("Notification '{}' delivered via {:?}", request.title, outcome);
                self.inbox.add(&request).await;
                let _ = self
                    .events
                    .send(NotificationEvent::Delivered { request, outcome });
                Some(outcome)
            }
            Err(error) => {
                tracing::error!("Dropping notification '{}': {}", request.title, error);
                let _ = self
                    .events
                    .send(NotificationEvent::Dropped { request, error });
                None
            }
        }
    }
}
