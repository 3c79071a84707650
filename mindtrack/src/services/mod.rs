//! Services module
//!
//! Business logic services: permission, delivery, scheduling, and the
//! facade that coordinates them.

pub mod delivery;
pub mod inbox;
pub mod ledger;
pub mod notifications;
pub mod permission;
pub mod quotes;
pub mod scheduler;
pub mod settings;
pub mod slots;

pub use delivery::DeliveryChannel;
pub use inbox::{InboxEntry, NotificationInbox};
pub use ledger::AssessmentLedger;
pub use notifications::NotificationService;
pub use permission::PermissionManager;
pub use quotes::{Quote, QuoteBank, TimeOfDay};
pub use scheduler::{ScheduledTimer, SchedulerMode, SchedulerService, TimerKey};
pub use settings::{AppSettings, NotificationSettings, SettingsService};
