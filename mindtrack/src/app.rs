//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::clock::SystemClock;
use crate::config;
use crate::error::{AppError, Result};
use crate::platform::{DesktopPlatform, NotificationPlatform};
use crate::services::{NotificationService, QuoteBank, SettingsService};
use crate::storage::KeyValueStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: SettingsService,
    pub store: KeyValueStore,
    pub quotes: Arc<QuoteBank>,
    pub notifications: NotificationService,
}

impl AppState {
    /// Build every service against `platform`
    pub fn new(app_data_dir: PathBuf, platform: Arc<dyn NotificationPlatform>) -> Result<Self> {
        let settings = SettingsService::new(app_data_dir.clone());
        let store = KeyValueStore::open(app_data_dir.join(config::STORAGE_FILE_NAME));
        let quotes = Arc::new(QuoteBank::builtin()?);

        let notifications = NotificationService::new(
            platform,
            Arc::new(SystemClock),
            store.clone(),
            settings.clone(),
            quotes.clone(),
        );

        Ok(Self {
            app_data_dir,
            settings,
            store,
            quotes,
            notifications,
        })
    }
}

/// Data directory: `MINDTRACK_DATA_DIR`, else the per-user config location
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(config::DATA_DIR_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| AppError::Config("APPDATA is not set".into()))?;
        Ok(PathBuf::from(appdata).join(config::DATA_DIR_NAME))
    } else {
        let home =
            std::env::var("HOME").map_err(|_| AppError::Config("HOME is not set".into()))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(config::DATA_DIR_NAME))
    }
}

/// Application setup - called once on startup
pub fn setup() -> Result<AppState> {
    tracing::info!("Initializing application");

    let app_data_dir = resolve_data_dir()?;
    tracing::info!("App data directory: {:?}", app_data_dir);

    std::fs::create_dir_all(&app_data_dir)?;

    let settings = SettingsService::new(app_data_dir.clone());
    let platform = Arc::new(DesktopPlatform::new(settings));
    let state = AppState::new(app_data_dir, platform)?;

    tracing::info!("Application initialized successfully");

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FakePlatform;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_state_persists_under_data_dir() {
        let dir = TempDir::new().unwrap();
        let state =
            AppState::new(dir.path().to_path_buf(), Arc::new(FakePlatform::new())).unwrap();

        state.notifications.record_assessment_completion().await.unwrap();

        assert!(dir.path().join(config::STORAGE_FILE_NAME).exists());
        assert_eq!(state.quotes.len(), 20);
    }
}
