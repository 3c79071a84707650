//! Permission state machine
//!
//! `pending -> {granted, denied, unsupported}`. Denied and unsupported are
//! terminal for this process: the consent prompt is never shown again.

use crate::error::{AppError, Result};
use crate::models::{NotificationEvent, PermissionState};
use crate::platform::{NotificationPlatform, PlatformPermission};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

#[derive(Clone)]
pub struct PermissionManager {
    platform: Arc<dyn NotificationPlatform>,
    state: Arc<RwLock<PermissionState>>,
    events: broadcast::Sender<NotificationEvent>,
}

impl PermissionManager {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        events: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            platform,
            state: Arc::new(RwLock::new(PermissionState::Pending)),
            events,
        }
    }

    pub async fn state(&self) -> PermissionState {
        *self.state.read().await
    }

    pub async fn is_granted(&self) -> bool {
        self.state().await == PermissionState::Granted
    }

    /// What the platform reports right now; leaves the machine untouched
    pub async fn platform_state(&self) -> PermissionState {
        if !self.platform.is_supported() {
            return PermissionState::Unsupported;
        }
        match self.platform.permission().await {
            PlatformPermission::Granted => PermissionState::Granted,
            PlatformPermission::Denied => PermissionState::Denied,
            PlatformPermission::Default => PermissionState::Pending,
        }
    }

    /// Mirror the platform's stored permission
    pub async fn init(&self) -> PermissionState {
        let next = self.platform_state().await;
        self.transition(next).await;
        next
    }

    /// Ask the user for permission.
    ///
    /// Succeeds immediately when already granted. Fails without prompting
    /// when denied or unsupported. A dismissed prompt leaves the state
    /// pending and returns `Ok(Pending)`.
    pub async fn request_permission(&self) -> Result<PermissionState> {
        match self.state().await {
            PermissionState::Granted => return Ok(PermissionState::Granted),
            PermissionState::Denied => {
                tracing::info!("Permission previously denied, not prompting again");
                return Err(AppError::PermissionDenied);
            }
            PermissionState::Unsupported => return Err(AppError::CapabilityUnavailable),
            PermissionState::Pending => {}
        }

        let next = match self.platform.request_permission().await {
            Ok(PlatformPermission::Granted) => PermissionState::Granted,
            Ok(PlatformPermission::Denied) => PermissionState::Denied,
            Ok(PlatformPermission::Default) => {
                tracing::info!("Permission prompt dismissed");
                PermissionState::Pending
            }
            Err(e) => {
                tracing::error!("Error requesting notification permission: {}", e);
                PermissionState::Denied
            }
        };

        self.transition(next).await;

        match next {
            PermissionState::Denied => Err(AppError::PermissionDenied),
            other => Ok(other),
        }
    }

    async fn transition(&self, next: PermissionState) {
        let mut state = self.state.write().await;
        if *state == next {
            return;
        }

        tracing::info!("Notification permission: {:?} -> {:?}", *state, next);
        *state = next;
        // No subscribers is fine
        let _ = self
            .events
            .send(NotificationEvent::PermissionChanged { state: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FakePlatform;

    fn manager(platform: FakePlatform) -> (PermissionManager, Arc<FakePlatform>) {
        let platform = Arc::new(platform);
        let (events, _) = broadcast::channel(16);
        (PermissionManager::new(platform.clone(), events), platform)
    }

    #[tokio::test]
    async fn test_init_without_capability_is_unsupported() {
        let (manager, _) = manager(FakePlatform::unsupported());
        assert_eq!(manager.init().await, PermissionState::Unsupported);
        assert!(matches!(
            manager.request_permission().await,
            Err(AppError::CapabilityUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_init_mirrors_stored_permission() {
        let (granted, _) =
            manager(FakePlatform::new().with_permission(PlatformPermission::Granted));
        assert_eq!(granted.init().await, PermissionState::Granted);

        let (denied, _) = manager(FakePlatform::new().with_permission(PlatformPermission::Denied));
        assert_eq!(denied.init().await, PermissionState::Denied);

        let (pending, _) = manager(FakePlatform::new());
        assert_eq!(pending.init().await, PermissionState::Pending);
    }

    #[tokio::test]
    async fn test_platform_state_is_read_only() {
        let platform = Arc::new(FakePlatform::new().with_permission(PlatformPermission::Denied));
        let (events, mut rx) = broadcast::channel(16);
        let manager = PermissionManager::new(platform.clone(), events);

        assert_eq!(manager.platform_state().await, PermissionState::Denied);
        assert_eq!(manager.state().await, PermissionState::Pending);
        assert!(rx.try_recv().is_err());
        assert_eq!(platform.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_grant_from_pending() {
        let (manager, platform) = manager(FakePlatform::new());
        manager.init().await;

        let state = manager.request_permission().await.unwrap();
        assert_eq!(state, PermissionState::Granted);
        assert!(manager.is_granted().await);
        assert_eq!(platform.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_denied_never_prompts_again() {
        let (manager, platform) = manager(
            FakePlatform::new().with_prompt_answer(Some(PlatformPermission::Denied)),
        );
        manager.init().await;

        assert!(matches!(
            manager.request_permission().await,
            Err(AppError::PermissionDenied)
        ));
        assert_eq!(platform.prompt_count(), 1);

        assert!(matches!(
            manager.request_permission().await,
            Err(AppError::PermissionDenied)
        ));
        assert_eq!(platform.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_stored_denial_short_circuits() {
        let (manager, platform) =
            manager(FakePlatform::new().with_permission(PlatformPermission::Denied));
        manager.init().await;

        assert!(manager.request_permission().await.is_err());
        assert_eq!(platform.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_prompt_error_counts_as_denied() {
        let (manager, _) = manager(FakePlatform::new().with_prompt_answer(None));
        manager.init().await;

        assert!(manager.request_permission().await.is_err());
        assert_eq!(manager.state().await, PermissionState::Denied);
    }

    #[tokio::test]
    async fn test_dismissed_prompt_stays_pending() {
        let (manager, platform) = manager(
            FakePlatform::new().with_prompt_answer(Some(PlatformPermission::Default)),
        );
        manager.init().await;

        assert_eq!(
            manager.request_permission().await.unwrap(),
            PermissionState::Pending
        );
        assert_eq!(manager.request_permission().await.unwrap(), PermissionState::Pending);
        assert_eq!(platform.prompt_count(), 2);
    }

    #[tokio::test]
    async fn test_transitions_are_published() {
        let platform = Arc::new(FakePlatform::new());
        let (events, mut rx) = broadcast::channel(16);
        let manager = PermissionManager::new(platform, events);

        manager.init().await;
        manager.request_permission().await.unwrap();

        match rx.recv().await.unwrap() {
            NotificationEvent::PermissionChanged { state } => {
                assert_eq!(state, PermissionState::Granted)
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
