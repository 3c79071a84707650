//! Application configuration constants
//!
//! Central location for the delivery schedule, intervals, storage keys
//! and limits used throughout the notifier.

// ===== Storage =====

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV_VAR: &str = "MINDTRACK_DATA_DIR";

/// Directory name used under the platform data root
pub const DATA_DIR_NAME: &str = "mindtrack";

/// Key-value file standing in for browser local storage
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Key holding the ISO-8601 timestamp of the last completed PHQ-5 assessment
pub const LAST_ASSESSMENT_KEY: &str = "lastPhq5Assessment";

// ===== Platform switches =====

/// When set, the desktop platform reports no notification capability
pub const DISABLE_NOTIFICATIONS_ENV_VAR: &str = "MINDTRACK_DISABLE_NOTIFICATIONS";

/// When set, background worker registration fails and fallback mode is used
pub const DISABLE_WORKER_ENV_VAR: &str = "MINDTRACK_DISABLE_WORKER";

// ===== Delivery schedule =====

/// Mood check-in slots: (hour, minute, title, body)
pub const MOOD_CHECK_IN_SLOTS: &[(u32, u32, &str, &str)] = &[
    (8, 0, "Good morning!", "How are you feeling this morning?"),
    (12, 0, "Midday check-in", "Take a moment to reflect on your mood"),
    (18, 0, "Evening check-in", "How has your day been so far?"),
    (22, 0, "Goodnight", "Reflect on your day before you rest"),
];

/// Quote slot times (hour, minute); the bucket is derived from the slot
pub const QUOTE_SLOTS: &[(u32, u32)] = &[(7, 0), (12, 0), (19, 0), (0, 0)];

/// Hour of day the weekly assessment reminder falls back to
pub const ASSESSMENT_FALLBACK_HOUR: u32 = 10;

/// Days between PHQ-5 assessments
pub const ASSESSMENT_INTERVAL_DAYS: i64 = 7;

pub const ASSESSMENT_TITLE: &str = "Weekly PHQ-5 Assessment";
pub const ASSESSMENT_BODY: &str = "It's time for your weekly mental health check-in. \
    This helps us track your progress over time.";

pub const CHECK_IN_URL: &str = "/check-in";
pub const QUOTE_URL: &str = "/dashboard";
pub const ASSESSMENT_URL: &str = "/assessment";

/// Longest single sleep before the wall clock is checked again, so a timer
/// that passed while the host was suspended fires soon after resume
pub const WALL_CLOCK_RECHECK_SECS: u64 = 15 * 60;

// ===== Fallback mode =====

/// Interval of fallback check-ins and quotes (6 hours)
pub const FALLBACK_INTERVAL_SECS: u64 = 6 * 60 * 60;

/// Interval of the fallback assessment check (once a day)
pub const FALLBACK_ASSESSMENT_INTERVAL_SECS: u64 = 24 * 60 * 60;

pub const FALLBACK_FIRST_ASSESSMENT_TITLE: &str = "PHQ-5 Assessment Reminder";
pub const FALLBACK_FIRST_ASSESSMENT_BODY: &str =
    "You haven't completed your first PHQ-5 assessment yet.";
pub const FALLBACK_ASSESSMENT_BODY: &str = "It's time for your weekly mental health check-in.";

// ===== Ad-hoc notifications =====

/// Delay before the confirmation notification after permission is granted
pub const TEST_NOTIFICATION_DELAY_MS: u64 = 1_000;
pub const TEST_NOTIFICATION_TITLE: &str = "MoodTrack";
pub const TEST_NOTIFICATION_BODY: &str = "Notifications enabled successfully!";

/// Delay applied when the user picks "later" on a notification (30 minutes)
pub const SNOOZE_DELAY_SECS: u64 = 30 * 60;

// ===== Limits =====

/// Maximum entries kept in the in-app notification inbox
pub const MAX_INBOX_ENTRIES: usize = 100;

/// Capacity of the notification event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// App name shown by desktop notifications
pub const APP_NAME: &str = "MindTrack";
