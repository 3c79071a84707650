//! Notification service
//!
//! Wires the permission state machine, the delivery channel and the
//! scheduler together, relays background worker messages, and owns teardown.

use crate::clock::Clock;
use crate::config;
use crate::error::Result;
use crate::models::{
    ClickPayload, DeliveryChannelState, NotificationAction, NotificationEvent, PermissionState,
    WorkerMessage,
};
use crate::platform::NotificationPlatform;
use crate::services::delivery::DeliveryChannel;
use crate::services::inbox::NotificationInbox;
use crate::services::ledger::AssessmentLedger;
use crate::services::permission::PermissionManager;
use crate::services::quotes::QuoteBank;
use crate::services::scheduler::{ScheduledTimer, SchedulerMode, SchedulerService};
use crate::services::settings::{NotificationSettings, SettingsService};
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Notification service facade
#[derive(Clone)]
pub struct NotificationService {
    platform: Arc<dyn NotificationPlatform>,
    clock: Arc<dyn Clock>,
    settings: SettingsService,
    permission: PermissionManager,
    channel: DeliveryChannel,
    scheduler: SchedulerService,
    ledger: AssessmentLedger,
    inbox: NotificationInbox,
    events: broadcast::Sender<NotificationEvent>,
    relay: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NotificationService {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        clock: Arc<dyn Clock>,
        store: KeyValueStore,
        settings: SettingsService,
        quotes: Arc<QuoteBank>,
    ) -> Self {
        let (events, _) = broadcast::channel(config::EVENT_CHANNEL_CAPACITY);
        let inbox = NotificationInbox::new();
        let ledger = AssessmentLedger::new(store);
        let permission = PermissionManager::new(platform.clone(), events.clone());
        let channel = DeliveryChannel::new(
            platform.clone(),
            permission.clone(),
            inbox.clone(),
            events.clone(),
        );
        let scheduler =
            SchedulerService::new(clock.clone(), channel.clone(), ledger.clone(), quotes);

        Self {
            platform,
            clock,
            settings,
            permission,
            channel,
            scheduler,
            ledger,
            inbox,
            events,
            relay: Arc::new(Mutex::new(None)),
        }
    }

    /// Mirror the stored permission; arm everything when already granted
    pub async fn init(&self) -> PermissionState {
        let state = self.permission.init().await;
        if state == PermissionState::Granted {
            self.activate(false).await;
        }
        self.start_relay().await;

        tracing::info!("Notification service initialized ({:?})", state);
        state
    }

    /// Ask for permission; a fresh grant arms the scheduler and sends the
    /// confirmation notification
    pub async fn request_permission(&self) -> Result<PermissionState> {
        let was_granted = self.permission.is_granted().await;
        let state = self.permission.request_permission().await?;

        if state == PermissionState::Granted && !was_granted {
            self.activate(true).await;
        }
        Ok(state)
    }

    /// Overwrite the ledger with now and move the weekly reminder
    pub async fn record_assessment_completion(&self) -> Result<()> {
        let now = self.clock.now();
        self.ledger.record_completion(now).await?;
        tracing::info!("Assessment completed at {}", now);

        self.scheduler.rearm_weekly().await;
        Ok(())
    }

    pub async fn handle_worker_message(&self, message: WorkerMessage) {
        match message {
            WorkerMessage::ScheduleNotification(payload) => {
                self.scheduler.deliver_now(payload.into_request()).await;
            }
            WorkerMessage::NotificationClick(ClickPayload {
                action: NotificationAction::Open,
                notification,
            }) => {
                tracing::debug!("Notification opened, navigating to {}", notification.url);
                let _ = self
                    .events
                    .send(NotificationEvent::Navigate { url: notification.url });
            }
            WorkerMessage::NotificationClick(ClickPayload {
                action: NotificationAction::Later,
                notification,
            }) => {
                self.scheduler.snooze(notification.into_request()).await;
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    pub fn inbox(&self) -> &NotificationInbox {
        &self.inbox
    }

    pub fn ledger(&self) -> &AssessmentLedger {
        &self.ledger
    }

    pub async fn permission_state(&self) -> PermissionState {
        self.permission.state().await
    }

    /// Permission as the platform reports it, without activating anything
    pub async fn stored_permission(&self) -> PermissionState {
        self.permission.platform_state().await
    }

    pub async fn channel_state(&self) -> DeliveryChannelState {
        self.channel.state().await
    }

    pub async fn scheduler_mode(&self) -> SchedulerMode {
        self.scheduler.mode().await
    }

    pub async fn upcoming(&self) -> Vec<ScheduledTimer> {
        self.scheduler.upcoming().await
    }

    /// Stop every timer and the worker relay
    pub async fn teardown(&self) {
        if let Some(relay) = self.relay.lock().await.take() {
            relay.abort();
        }
        self.scheduler.teardown().await;
    }

    async fn activate(&self, fresh_grant: bool) {
        let channel_state = self.channel.register_channel().await;
        let settings = self.notification_settings().await;
        self.scheduler.arm_for(channel_state, &settings).await;

        if fresh_grant && settings.test_notification_on_grant {
            self.scheduler.send_test_notification().await;
        }
    }

    async fn notification_settings(&self) -> NotificationSettings {
        match self.settings.get_notifications().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Could not load notification settings, using defaults: {}", e);
                NotificationSettings::default()
            }
        }
    }

    async fn start_relay(&self) {
        let mut relay = self.relay.lock().await;
        if relay.is_some() {
            return;
        }

        let Some(mut messages) = self.platform.take_worker_messages() else {
            return;
        };

        let service = self.clone();
        *relay = Some(tokio::spawn(async move {
            while let Some(message) = messages.recv().await {
                service.handle_worker_message(message).await;
            }
            tracing::debug!("Worker message relay stopped");
        }));
    }
}
