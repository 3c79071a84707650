//! Desktop notification platform
//!
//! Direct notifications go straight to the OS notification server. The
//! "background worker" is a tokio task that owns display requests and
//! reports clicks on its notifications back to the foreground as
//! [`WorkerMessage`]s. The consent decision lives in the settings file.
//!
//! Where the notification server supports replacement, a newer notification
//! replaces the one still on screen with the same tag.

use super::{NotificationPlatform, PlatformPermission};
use crate::config;
use crate::error::{AppError, DeliveryError, Result};
use crate::models::{NotificationRequest, WorkerMessage};
use crate::services::settings::SettingsService;
use async_trait::async_trait;
use notify_rust::Notification;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::{mpsc, oneshot};

struct ShowCommand {
    request: NotificationRequest,
    reply: oneshot::Sender<std::result::Result<(), DeliveryError>>,
}

/// Server-assigned id of the last notification shown per tag
#[derive(Debug, Clone, Default)]
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
struct TagIds(Arc<Mutex<HashMap<String, u32>>>);

#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
impl TagIds {
    fn previous(&self, tag: &str) -> Option<u32> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(tag)
            .copied()
    }

    fn remember(&self, tag: &str, id: u32) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(tag.to_string(), id);
    }
}

pub struct DesktopPlatform {
    settings: SettingsService,
    supported: OnceLock<bool>,
    tags: TagIds,
    worker: Mutex<Option<mpsc::UnboundedSender<ShowCommand>>>,
    messages_tx: mpsc::UnboundedSender<WorkerMessage>,
    messages_rx: Mutex<Option<mpsc::UnboundedReceiver<WorkerMessage>>>,
}

impl DesktopPlatform {
    pub fn new(settings: SettingsService) -> Self {
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            supported: OnceLock::new(),
            tags: TagIds::default(),
            worker: Mutex::new(None),
            messages_tx,
            messages_rx: Mutex::new(Some(messages_rx)),
        }
    }

    fn worker_sender(&self) -> Option<mpsc::UnboundedSender<ShowCommand>> {
        self.worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

fn build_notification(request: &NotificationRequest) -> Notification {
    let mut notification = Notification::new();
    notification.appname(config::APP_NAME);
    notification.summary(&request.title);
    notification.body(&request.body);
    notification
}

/// Capability check: the env switch turns notifications off, otherwise the
/// notification server has to answer
fn detect_capability<F>(disabled_by_env: bool, query_server: F) -> bool
where
    F: FnOnce() -> std::result::Result<String, String>,
{
    if disabled_by_env {
        tracing::info!(
            "Notifications disabled by {}",
            config::DISABLE_NOTIFICATIONS_ENV_VAR
        );
        return false;
    }

    match query_server() {
        Ok(server) => {
            tracing::debug!("Notification server: {}", server);
            true
        }
        Err(e) => {
            tracing::warn!("No notification server available: {}", e);
            false
        }
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn query_notification_server() -> std::result::Result<String, String> {
    notify_rust::get_server_information()
        .map(|info| format!("{} {} ({})", info.name, info.version, info.vendor))
        .map_err(|e| e.to_string())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn query_notification_server() -> std::result::Result<String, String> {
    Ok("system notification center".to_string())
}

/// Show `notification`, replacing the one still on screen with the same tag
#[cfg(all(unix, not(target_os = "macos")))]
fn show_tagged(
    mut notification: Notification,
    tag: &str,
    tags: &TagIds,
) -> std::result::Result<notify_rust::NotificationHandle, DeliveryError> {
    if let Some(id) = tags.previous(tag) {
        notification.id(id);
    }
    let handle = notification
        .show()
        .map_err(|e| DeliveryError::Failed(e.to_string()))?;
    tags.remember(tag, handle.id());
    Ok(handle)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show_direct(
    request: &NotificationRequest,
    tags: &TagIds,
) -> std::result::Result<(), DeliveryError> {
    show_tagged(build_notification(request), &request.tag, tags).map(|_| ())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_direct(
    request: &NotificationRequest,
    _tags: &TagIds,
) -> std::result::Result<(), DeliveryError> {
    build_notification(request)
        .show()
        .map(|_| ())
        .map_err(|e| DeliveryError::Failed(e.to_string()))
}

/// Background worker loop: display each request and watch for clicks
async fn run_worker(
    mut commands: mpsc::UnboundedReceiver<ShowCommand>,
    messages: mpsc::UnboundedSender<WorkerMessage>,
    tags: TagIds,
) {
    tracing::info!("Background delivery worker started");

    while let Some(ShowCommand { request, reply }) = commands.recv().await {
        let messages = messages.clone();
        let tags = tags.clone();
        let shown = tokio::task::spawn_blocking(move || show_from_worker(request, messages, tags))
            .await
            .unwrap_or_else(|e| Err(DeliveryError::Failed(format!("worker task failed: {}", e))));

        if reply.send(shown).is_err() {
            tracing::debug!("Delivery caller went away before the worker replied");
        }
    }

    tracing::info!("Background delivery worker stopped");
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show_from_worker(
    request: NotificationRequest,
    messages: mpsc::UnboundedSender<WorkerMessage>,
    tags: TagIds,
) -> std::result::Result<(), DeliveryError> {
    use crate::models::{ClickPayload, NotificationAction, NotificationPayload};

    let mut notification = build_notification(&request);
    notification.action("open", "Open Now");
    notification.action("later", "Later");

    let handle = show_tagged(notification, &request.tag, &tags)?;

    let payload = NotificationPayload::from(&request);
    std::thread::spawn(move || {
        handle.wait_for_action(|selected| {
            let action = match selected {
                "later" => NotificationAction::Later,
                "open" | "default" => NotificationAction::Open,
                _ => return,
            };
            let click = WorkerMessage::NotificationClick(ClickPayload {
                action,
                notification: payload,
            });
            if messages.send(click).is_err() {
                tracing::debug!("Click ignored: foreground no longer listening");
            }
        });
    });

    Ok(())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_from_worker(
    request: NotificationRequest,
    _messages: mpsc::UnboundedSender<WorkerMessage>,
    _tags: TagIds,
) -> std::result::Result<(), DeliveryError> {
    build_notification(&request)
        .show()
        .map(|_| ())
        .map_err(|e| DeliveryError::Failed(e.to_string()))
}

fn prompt_on_terminal() -> Result<PlatformPermission> {
    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "{} would like to send you notifications for mood check-ins,",
        config::APP_NAME
    )?;
    writeln!(stdout, "weekly PHQ-5 assessments, and inspirational quotes.")?;
    writeln!(stdout, "  - Daily mood check-ins (8 AM, 12 PM, 6 PM, 10 PM)")?;
    writeln!(stdout, "  - Weekly PHQ-5 assessment reminders")?;
    writeln!(stdout, "  - Inspirational quotes (7 AM, 12 PM, 7 PM, 12 AM)")?;
    write!(stdout, "Allow notifications? [y]es / [n]o / [l]ater: ")?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    Ok(match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "allow" => PlatformPermission::Granted,
        "n" | "no" | "deny" | "block" => PlatformPermission::Denied,
        _ => PlatformPermission::Default,
    })
}

#[async_trait]
impl NotificationPlatform for DesktopPlatform {
    fn is_supported(&self) -> bool {
        *self.supported.get_or_init(|| {
            let disabled = std::env::var(config::DISABLE_NOTIFICATIONS_ENV_VAR).is_ok();
            detect_capability(disabled, query_notification_server)
        })
    }

    async fn permission(&self) -> PlatformPermission {
        match self.settings.get_permission().await {
            Ok(permission) => permission,
            Err(e) => {
                tracing::warn!("Could not read stored permission, treating as unset: {}", e);
                PlatformPermission::Default
            }
        }
    }

    async fn request_permission(&self) -> Result<PlatformPermission> {
        let answer = tokio::task::spawn_blocking(prompt_on_terminal)
            .await
            .map_err(|e| AppError::Generic(format!("consent prompt task failed: {}", e)))??;

        if answer != PlatformPermission::Default {
            self.settings.set_permission(answer).await?;
        }
        Ok(answer)
    }

    async fn register_worker(&self) -> Result<()> {
        if std::env::var(config::DISABLE_WORKER_ENV_VAR).is_ok() {
            return Err(AppError::ChannelRegistrationFailed(format!(
                "background worker disabled by {}",
                config::DISABLE_WORKER_ENV_VAR
            )));
        }

        let mut worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if worker.as_ref().is_some_and(|sender| !sender.is_closed()) {
            return Ok(());
        }

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(
            commands_rx,
            self.messages_tx.clone(),
            self.tags.clone(),
        ));
        *worker = Some(commands_tx);
        Ok(())
    }

    async fn show_worker_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError> {
        let sender = self.worker_sender().ok_or(DeliveryError::Unavailable)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(ShowCommand {
                request: request.clone(),
                reply: reply_tx,
            })
            .map_err(|_| DeliveryError::Failed("background worker stopped".into()))?;

        reply_rx
            .await
            .map_err(|_| DeliveryError::Failed("background worker dropped the request".into()))?
    }

    fn show_direct_notification(
        &self,
        request: &NotificationRequest,
    ) -> std::result::Result<(), DeliveryError> {
        show_direct(request, &self.tags)
    }

    fn take_worker_messages(&self) -> Option<mpsc::UnboundedReceiver<WorkerMessage>> {
        self.messages_rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}
