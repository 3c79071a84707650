//! Notification models
//!
//! Plain data passed between the scheduler, the delivery channel and the
//! UI-facing event stream. All models use serde so they can cross the
//! boundary to a frontend or a background worker.

use crate::config;
use crate::error::DeliveryError;
use serde::{Deserialize, Serialize};

/// Category of a notification; also the default platform tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    #[default]
    MoodCheckIn,
    Assessment,
    Quote,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::MoodCheckIn => "mood-check-in",
            NotificationKind::Assessment => "assessment",
            NotificationKind::Quote => "quote",
        }
    }
}

/// A single notification, built at fire time and consumed immediately
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub target_url: String,
    pub kind: NotificationKind,
    pub tag: String,
}

impl NotificationRequest {
    /// Build a request tagged with its kind so repeats replace each other
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            target_url: target_url.into(),
            kind,
            tag: kind.as_str().to_string(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

/// User authorization for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Pending,
    Granted,
    Denied,
    Unsupported,
}

/// Registration status of the background delivery worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannelState {
    Pending,
    Registered,
    Failed,
}

/// Which surface presented a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Worker,
    Direct,
}

/// Events published to UI collaborators
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    Delivered {
        request: NotificationRequest,
        outcome: DeliveryOutcome,
    },
    Dropped {
        request: NotificationRequest,
        error: DeliveryError,
    },
    PermissionChanged {
        state: PermissionState,
    },
    ChannelStateChanged {
        state: DeliveryChannelState,
    },
    Navigate {
        url: String,
    },
}

/// Notification content as carried by worker messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(default = "default_payload_url")]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
}

fn default_payload_url() -> String {
    config::CHECK_IN_URL.to_string()
}

impl NotificationPayload {
    pub fn into_request(self) -> NotificationRequest {
        NotificationRequest::new(self.kind, self.title, self.body, self.url)
    }
}

impl From<&NotificationRequest> for NotificationPayload {
    fn from(request: &NotificationRequest) -> Self {
        Self {
            title: request.title.clone(),
            body: request.body.clone(),
            url: request.target_url.clone(),
            kind: request.kind,
        }
    }
}

/// Button picked on a delivered notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    Open,
    Later,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPayload {
    pub action: NotificationAction,
    pub notification: NotificationPayload,
}

/// Message posted by the background worker to the foreground
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    ScheduleNotification(NotificationPayload),
    NotificationClick(ClickPayload),
}

impl WorkerMessage {
    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tag_defaults_to_kind() {
        let request = NotificationRequest::new(NotificationKind::Quote, "t", "b", "/dashboard");
        assert_eq!(request.tag, "quote");
        assert_eq!(request.with_tag("custom").tag, "custom");
    }

    #[test]
    fn parses_schedule_notification_message() {
        let raw = r#"{
            "type": "SCHEDULE_NOTIFICATION",
            "payload": {
                "title": "MoodTrack",
                "body": "Time for your mood check-in!",
                "url": "/check-in",
                "type": "mood-check-in"
            }
        }"#;

        let message = WorkerMessage::from_json(raw).unwrap();
        match message {
            WorkerMessage::ScheduleNotification(payload) => {
                assert_eq!(payload.title, "MoodTrack");
                assert_eq!(payload.kind, NotificationKind::MoodCheckIn);
                let request = payload.into_request();
                assert_eq!(request.target_url, "/check-in");
                assert_eq!(request.tag, "mood-check-in");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn schedule_payload_defaults_url_and_type() {
        let raw = r#"{"type":"SCHEDULE_NOTIFICATION","payload":{"title":"Hi","body":"There"}}"#;
        let WorkerMessage::ScheduleNotification(payload) = WorkerMessage::from_json(raw).unwrap()
        else {
            panic!("expected schedule message");
        };
        assert_eq!(payload.url, "/check-in");
        assert_eq!(payload.kind, NotificationKind::MoodCheckIn);
    }

    #[test]
    fn parses_click_message() {
        let raw = r#"{
            "type": "NOTIFICATION_CLICK",
            "payload": {
                "action": "later",
                "notification": {
                    "title": "Goodnight",
                    "body": "Rest",
                    "url": "/check-in",
                    "type": "mood-check-in"
                }
            }
        }"#;
        let WorkerMessage::NotificationClick(click) = WorkerMessage::from_json(raw).unwrap() else {
            panic!("expected click message");
        };
        assert_eq!(click.action, NotificationAction::Later);
        assert_eq!(click.notification.title, "Goodnight");
    }

    #[test]
    fn rejects_unknown_message_type() {
        let raw = r#"{"type":"SKIP_WAITING","payload":{}}"#;
        assert!(WorkerMessage::from_json(raw).is_err());
    }
}
