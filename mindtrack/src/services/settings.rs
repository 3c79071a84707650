//! Settings service
//!
//! Manages notifier settings persistence using JSON file storage.

use crate::config::SETTINGS_FILE_NAME;
use crate::error::{AppError, Result};
use crate::platform::PlatformPermission;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Which recurring notification kinds are armed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Daily mood check-ins at 08:00, 12:00, 18:00 and 22:00
    #[serde(default = "default_true")]
    pub mood_check_ins: bool,
    /// Daily quotes at 07:00, 12:00, 19:00 and 00:00
    #[serde(default = "default_true")]
    pub quotes: bool,
    /// Weekly PHQ-5 reminder
    #[serde(default = "default_true")]
    pub weekly_assessment: bool,
    /// Confirmation notification right after permission is granted
    #[serde(default = "default_true")]
    pub test_notification_on_grant: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            mood_check_ins: true,
            quotes: true,
            weekly_assessment: true,
            test_notification_on_grant: true,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppSettings {
    #[serde(default)]
    pub notifications: NotificationSettings,
    /// Consent decision recorded by the desktop platform
    #[serde(default)]
    pub permission: PlatformPermission,
}

/// Service for managing application settings
#[derive(Debug, Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_notifications(&self) -> Result<NotificationSettings> {
        let settings = self.load().await?;
        Ok(settings.notifications)
    }

    pub async fn update_notifications(&self, notifications: NotificationSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.notifications = notifications;
        self.save(&settings).await
    }

    pub async fn get_permission(&self) -> Result<PlatformPermission> {
        let settings = self.load().await?;
        Ok(settings.permission)
    }

    /// Record the user's consent decision
    pub async fn set_permission(&self, permission: PlatformPermission) -> Result<()> {
        let mut settings = self.load().await?;
        settings.permission = permission;
        self.save(&settings).await
    }
}
