/// Scheduler Service
/// Arms one timer per delivery slot and re-arms it after every fire.
/// Falls back to coarse fixed-interval delivery when the background worker
/// could not be registered.
use crate::clock::Clock;
use crate::config;
use crate::models::{DeliveryChannelState, NotificationKind, NotificationRequest};
use crate::services::delivery::DeliveryChannel;
use crate::services::ledger::AssessmentLedger;
use crate::services::quotes::{QuoteBank, TimeOfDay};
use crate::services::settings::NotificationSettings;
use crate::services::slots::{self, CheckInSlot, QuoteSlot};
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Identifies one outstanding timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "timer", content = "slot", rename_all = "snake_case")]
pub enum TimerKey {
    /// Daily check-in, keyed by its hour
    MoodCheckIn(u32),
    Quote(TimeOfDay),
    WeeklyAssessment,
    TestNotification,
    Snooze(u64),
    FallbackCheckIn,
    FallbackQuote,
    FallbackAssessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerMode {
    Idle,
    Precise,
    Fallback,
}

/// Next fire time of an armed precise timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTimer {
    pub key: TimerKey,
    pub kind: NotificationKind,
    pub fire_at: NaiveDateTime,
}

/// A self-rearming delivery slot
#[derive(Debug, Clone, Copy)]
enum Recurrence {
    CheckIn(CheckInSlot),
    Quote(QuoteSlot),
    WeeklyAssessment,
}

impl Recurrence {
    fn key(&self) -> TimerKey {
        match self {
            Recurrence::CheckIn(slot) => TimerKey::MoodCheckIn(slot.hour),
            Recurrence::Quote(slot) => TimerKey::Quote(slot.time_of_day()),
            Recurrence::WeeklyAssessment => TimerKey::WeeklyAssessment,
        }
    }

    fn kind(&self) -> NotificationKind {
        match self {
            Recurrence::CheckIn(_) => NotificationKind::MoodCheckIn,
            Recurrence::Quote(_) => NotificationKind::Quote,
            Recurrence::WeeklyAssessment => NotificationKind::Assessment,
        }
    }

    async fn next_fire(&self, inner: &Inner, after: NaiveDateTime) -> NaiveDateTime {
        match self {
            Recurrence::CheckIn(slot) => slots::next_daily_fire(after, slot.hour, slot.minute),
            Recurrence::Quote(slot) => slots::next_daily_fire(after, slot.hour, slot.minute),
            Recurrence::WeeklyAssessment => {
                let last = inner.last_completion().await;
                slots::next_assessment_due(after, last)
            }
        }
    }

    fn request(&self, inner: &Inner) -> NotificationRequest {
        match self {
            Recurrence::CheckIn(slot) => slot.request(),
            Recurrence::Quote(slot) => {
                let time_of_day = slot.time_of_day();
                slots::quote_request(time_of_day, inner.quotes.pick_quote(time_of_day))
            }
            Recurrence::WeeklyAssessment => slots::assessment_request(),
        }
    }
}

struct Inner {
    clock: Arc<dyn Clock>,
    channel: DeliveryChannel,
    ledger: AssessmentLedger,
    quotes: Arc<QuoteBank>,
    timers: Mutex<HashMap<TimerKey, JoinHandle<()>>>,
    upcoming: Mutex<HashMap<TimerKey, ScheduledTimer>>,
    mode: Mutex<SchedulerMode>,
    settings: Mutex<NotificationSettings>,
    snooze_seq: AtomicU64,
}

impl Inner {
    /// Always re-read; the assessment flow may have written since last time
    async fn last_completion(&self) -> Option<NaiveDateTime> {
        match self.ledger.last_completion().await {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!("Could not read assessment ledger, assuming none: {}", e);
                None
            }
        }
    }

    /// Sleep until the wall clock reaches `fire_at`, re-checking periodically
    async fn sleep_until(&self, fire_at: NaiveDateTime) {
        let recheck = Duration::from_secs(config::WALL_CLOCK_RECHECK_SECS);
        loop {
            let remaining = match (fire_at - self.clock.now()).to_std() {
                Ok(remaining) if !remaining.is_zero() => remaining,
                _ => return,
            };
            tokio::time::sleep(remaining.min(recheck)).await;
        }
    }

    async fn note_upcoming(&self, job: Recurrence, fire_at: NaiveDateTime) {
        tracing::debug!("{:?} next fires at {}", job.key(), fire_at);
        self.upcoming.lock().await.insert(
            job.key(),
            ScheduledTimer {
                key: job.key(),
                kind: job.kind(),
                fire_at,
            },
        );
    }

    async fn run_recurring(self: Arc<Self>, job: Recurrence, first: NaiveDateTime) {
        let mut fire_at = first;
        loop {
            self.sleep_until(fire_at).await;

            let request = job.request(&self);
            self.channel.dispatch(request).await;

            // Compute the next slot strictly after this one
            let after = self.clock.now().max(fire_at);
            fire_at = job.next_fire(&self, after).await;
            self.note_upcoming(job, fire_at).await;
        }
    }

    async fn run_fallback(self: Arc<Self>, key: TimerKey, period: Duration) {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let now = self.clock.now();
            let request = match key {
                TimerKey::FallbackCheckIn => Some(slots::fallback_check_in(now.hour())),
                TimerKey::FallbackQuote => {
                    let time_of_day = TimeOfDay::from_time(now);
                    Some(slots::quote_request(
                        time_of_day,
                        self.quotes.pick_quote(time_of_day),
                    ))
                }
                TimerKey::FallbackAssessment => {
                    slots::fallback_assessment(now, self.last_completion().await)
                }
                _ => None,
            };

            if let Some(request) = request {
                self.channel.dispatch(request).await;
            }
        }
    }

    async fn run_once(
        self: Arc<Self>,
        key: TimerKey,
        delay: Duration,
        request: NotificationRequest,
    ) {
        tokio::time::sleep(delay).await;
        self.channel.dispatch(request).await;
        self.upcoming.lock().await.remove(&key);
    }
}

/// Scheduler service owning every armed timer
#[derive(Clone)]
pub struct SchedulerService {
    inner: Arc<Inner>,
}

impl SchedulerService {
    pub fn new(
        clock: Arc<dyn Clock>,
        channel: DeliveryChannel,
        ledger: AssessmentLedger,
        quotes: Arc<QuoteBank>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                channel,
                ledger,
                quotes,
                timers: Mutex::new(HashMap::new()),
                upcoming: Mutex::new(HashMap::new()),
                mode: Mutex::new(SchedulerMode::Idle),
                settings: Mutex::new(NotificationSettings::default()),
                snooze_seq: AtomicU64::new(0),
            }),
        }
    }

    pub async fn mode(&self) -> SchedulerMode {
        *self.inner.mode.lock().await
    }

    /// Arm the mode matching the channel: precise when the worker is
    /// registered, fallback otherwise
    pub async fn arm_for(
        &self,
        channel_state: DeliveryChannelState,
        settings: &NotificationSettings,
    ) {
        match channel_state {
            DeliveryChannelState::Registered => self.arm(settings).await,
            DeliveryChannelState::Failed | DeliveryChannelState::Pending => {
                self.arm_fallback(settings).await
            }
        }
    }

    /// Arm one self-rearming timer per enabled slot
    pub async fn arm(&self, settings: &NotificationSettings) {
        self.cancel_all().await;
        *self.inner.settings.lock().await = settings.clone();

        if settings.mood_check_ins {
            for slot in slots::check_in_slots() {
                self.spawn_recurring(Recurrence::CheckIn(slot)).await;
            }
        }
        if settings.quotes {
            for slot in slots::quote_slots() {
                self.spawn_recurring(Recurrence::Quote(slot)).await;
            }
        }
        if settings.weekly_assessment {
            self.spawn_recurring(Recurrence::WeeklyAssessment).await;
        }

        *self.inner.mode.lock().await = SchedulerMode::Precise;
        tracing::info!("Notification scheduler armed");
    }

    /// Coarse interval delivery used without a background worker
    pub async fn arm_fallback(&self, settings: &NotificationSettings) {
        self.cancel_all().await;
        *self.inner.settings.lock().await = settings.clone();

        let period = Duration::from_secs(config::FALLBACK_INTERVAL_SECS);
        if settings.mood_check_ins {
            self.spawn_fallback(TimerKey::FallbackCheckIn, period).await;
        }
        if settings.quotes {
            self.spawn_fallback(TimerKey::FallbackQuote, period).await;
        }
        if settings.weekly_assessment {
            let daily = Duration::from_secs(config::FALLBACK_ASSESSMENT_INTERVAL_SECS);
            self.spawn_fallback(TimerKey::FallbackAssessment, daily).await;
        }

        *self.inner.mode.lock().await = SchedulerMode::Fallback;
        tracing::info!("Notification scheduler armed in fallback mode");
    }

    /// Re-derive the weekly timer after the ledger changed
    pub async fn rearm_weekly(&self) {
        let precise = self.mode().await == SchedulerMode::Precise;
        let enabled = self.inner.settings.lock().await.weekly_assessment;
        if precise && enabled {
            self.spawn_recurring(Recurrence::WeeklyAssessment).await;
        }
    }

    /// Confirmation notification shortly after permission is granted
    pub async fn send_test_notification(&self) {
        let delay = Duration::from_millis(config::TEST_NOTIFICATION_DELAY_MS);
        self.spawn_once(TimerKey::TestNotification, delay, slots::test_request())
            .await;
    }

    /// Deliver again after the snooze delay
    pub async fn snooze(&self, request: NotificationRequest) {
        let id = self.inner.snooze_seq.fetch_add(1, Ordering::SeqCst);
        let delay = Duration::from_secs(config::SNOOZE_DELAY_SECS);
        tracing::info!("Snoozing '{}' for {:?}", request.title, delay);
        self.spawn_once(TimerKey::Snooze(id), delay, request).await;
    }

    /// Immediate delivery requested by the background worker
    pub async fn deliver_now(&self, request: NotificationRequest) {
        self.inner.channel.dispatch(request).await;
    }

    /// Armed timers with a known fire time, soonest first
    pub async fn upcoming(&self) -> Vec<ScheduledTimer> {
        let mut timers: Vec<ScheduledTimer> =
            self.inner.upcoming.lock().await.values().cloned().collect();
        timers.sort_by_key(|timer| timer.fire_at);
        timers
    }

    pub async fn is_armed(&self, key: TimerKey) -> bool {
        self.inner
            .timers
            .lock()
            .await
            .get(&key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel every outstanding timer in one step
    pub async fn teardown(&self) {
        self.cancel_all().await;
        *self.inner.mode.lock().await = SchedulerMode::Idle;
        tracing::info!("Notification scheduler torn down");
    }

    async fn cancel_all(&self) {
        let mut timers = self.inner.timers.lock().await;
        let cancelled = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        self.inner.upcoming.lock().await.clear();
        if cancelled > 0 {
            tracing::debug!("Cancelled {} timers", cancelled);
        }
    }

    async fn insert_timer(&self, key: TimerKey, handle: JoinHandle<()>) {
        let mut timers = self.inner.timers.lock().await;
        timers.retain(|_, existing| !existing.is_finished());
        if let Some(previous) = timers.insert(key, handle) {
            previous.abort();
        }
    }

    async fn spawn_recurring(&self, job: Recurrence) {
        let first = job.next_fire(&self.inner, self.inner.clock.now()).await;
        let handle = tokio::spawn(Arc::clone(&self.inner).run_recurring(job, first));
        self.insert_timer(job.key(), handle).await;
        self.inner.note_upcoming(job, first).await;
    }

    async fn spawn_fallback(&self, key: TimerKey, period: Duration) {
        let handle = tokio::spawn(Arc::clone(&self.inner).run_fallback(key, period));
        self.insert_timer(key, handle).await;
    }

    async fn spawn_once(&self, key: TimerKey, delay: Duration, request: NotificationRequest) {
        let fire_at = self.inner.clock.now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        self.inner.upcoming.lock().await.insert(
            key,
            ScheduledTimer {
                key,
                kind: request.kind,
                fire_at,
            },
        );
        let handle = tokio::spawn(Arc::clone(&self.inner).run_once(key, delay, request));
        self.insert_timer(key, handle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::models::NotificationEvent;
    use crate::platform::{FakePlatform, PlatformPermission};
    use crate::services::inbox::NotificationInbox;
    use crate::services::permission::PermissionManager;
    use crate::storage::KeyValueStore;
    use chrono::NaiveDate;
    use tokio::sync::broadcast;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    struct Harness {
        scheduler: SchedulerService,
        platform: Arc<FakePlatform>,
        ledger: AssessmentLedger,
        channel: DeliveryChannel,
    }

    async fn harness(start: NaiveDateTime, platform: FakePlatform) -> Harness {
        let platform = Arc::new(platform.with_permission(PlatformPermission::Granted));
        let (events, _) = broadcast::channel::<NotificationEvent>(64);
        let permission = PermissionManager::new(platform.clone(), events.clone());
        permission.init().await;
        let channel = DeliveryChannel::new(
            platform.clone(),
            permission,
            NotificationInbox::new(),
            events,
        );
        let ledger = AssessmentLedger::new(KeyValueStore::in_memory());
        let scheduler = SchedulerService::new(
            Arc::new(MockClock::new(start)),
            channel.clone(),
            ledger.clone(),
            Arc::new(QuoteBank::builtin().unwrap()),
        );
        Harness {
            scheduler,
            platform,
            ledger,
            channel,
        }
    }

    fn only(kind: &str) -> NotificationSettings {
        NotificationSettings {
            mood_check_ins: kind == "check-in",
            quotes: kind == "quote",
            weekly_assessment: kind == "assessment",
            test_notification_on_grant: false,
        }
    }

    /// Let freshly spawned timers reach their first sleep
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn sleep_minutes(minutes: u64) {
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_in_fires_today_when_ahead() {
        let h = harness(at(2, 7, 30), FakePlatform::new()).await;
        h.channel.register_channel().await;
        h.scheduler.arm(&only("check-in")).await;

        sleep_minutes(29).await;
        assert!(h.platform.delivered().is_empty());

        sleep_minutes(2).await;
        assert_eq!(h.platform.delivered_titles(), vec!["Good morning!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_in_rearms_for_next_day() {
        let h = harness(at(2, 8, 1), FakePlatform::new()).await;
        h.channel.register_channel().await;
        h.scheduler.arm(&only("check-in")).await;
        settle().await;

        let upcoming = h.scheduler.upcoming().await;
        let morning = upcoming
            .iter()
            .find(|t| t.key == TimerKey::MoodCheckIn(8))
            .unwrap();
        assert_eq!(morning.fire_at, at(3, 8, 0));

        // 08:01 day 2 -> 08:01 day 4 passes 12, 18, 22 on day 2, all four on day 3, 08:00 on day 4
        sleep_minutes(2 * 24 * 60).await;
        assert_eq!(h.platform.delivered().len(), 3 + 4 + 1);
        assert!(h.scheduler.is_armed(TimerKey::MoodCheckIn(8)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_slots_use_their_bucket() {
        let h = harness(at(2, 6, 0), FakePlatform::new()).await;
        h.channel.register_channel().await;
        h.scheduler.arm(&only("quote")).await;

        sleep_minutes(61).await;
        let delivered = h.platform.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].1.title, "Morning Inspiration");
        assert_eq!(delivered[0].1.kind, NotificationKind::Quote);
        assert_eq!(delivered[0].1.target_url, "/dashboard");

        // 12:00, 19:00 and midnight
        sleep_minutes(18 * 60).await;
        assert_eq!(
            h.platform.delivered_titles(),
            vec![
                "Morning Inspiration",
                "Midday Inspiration",
                "Evening Inspiration",
                "Night Inspiration"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_weekly_due_follows_ledger() {
        let h = harness(at(5, 12, 0), FakePlatform::new()).await;
        h.ledger.record_completion(at(2, 9, 15)).await.unwrap();
        h.scheduler.arm(&only("assessment")).await;
        settle().await;

        let upcoming = h.scheduler.upcoming().await;
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].fire_at, at(9, 9, 15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overdue_weekly_waits_for_tomorrow_morning() {
        let h = harness(at(20, 8, 0), FakePlatform::new()).await;
        h.ledger.record_completion(at(2, 9, 0)).await.unwrap();
        h.scheduler.arm(&only("assessment")).await;
        settle().await;

        assert_eq!(h.scheduler.upcoming().await[0].fire_at, at(21, 10, 0));
        sleep_minutes(60).await;
        assert!(h.platform.delivered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_rearms_weekly() {
        let h = harness(at(5, 12, 0), FakePlatform::new()).await;
        h.scheduler.arm(&only("assessment")).await;
        settle().await;
        assert_eq!(h.scheduler.upcoming().await[0].fire_at, at(6, 10, 0));

        h.ledger.record_completion(at(5, 12, 0)).await.unwrap();
        h.scheduler.rearm_weekly().await;
        settle().await;

        assert_eq!(h.scheduler.upcoming().await[0].fire_at, at(12, 12, 0));
        sleep_minutes(24 * 60).await;
        assert!(h.platform.delivered().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_uses_hour_bucket() {
        let h = harness(at(2, 8, 0), FakePlatform::new().without_worker()).await;
        assert_eq!(
            h.channel.register_channel().await,
            DeliveryChannelState::Failed
        );
        h.scheduler
            .arm_for(DeliveryChannelState::Failed, &only("check-in"))
            .await;
        assert_eq!(h.scheduler.mode().await, SchedulerMode::Fallback);

        // First tick at 14:00, second at 20:00
        sleep_minutes(6 * 60 + 1).await;
        sleep_minutes(6 * 60).await;
        assert_eq!(
            h.platform.delivered_titles(),
            vec!["Afternoon Check-in", "Evening Check-in"]
        );
        assert!(h
            .platform
            .delivered()
            .iter()
            .all(|(outcome, _)| *outcome == crate::models::DeliveryOutcome::Direct));
        assert!(h.scheduler.upcoming().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_assessment_nags_until_first_completion() {
        let h = harness(at(2, 8, 0), FakePlatform::new().without_worker()).await;
        h.channel.register_channel().await;
        h.scheduler.arm_fallback(&only("assessment")).await;

        sleep_minutes(24 * 60 + 1).await;
        assert_eq!(h.platform.delivered_titles(), vec!["PHQ-5 Assessment Reminder"]);

        h.ledger.record_completion(at(3, 8, 5)).await.unwrap();
        sleep_minutes(24 * 60).await;
        assert_eq!(h.platform.delivered().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_test_notification_after_one_second() {
        let h = harness(at(2, 9, 0), FakePlatform::new()).await;
        h.scheduler.send_test_notification().await;

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(h.platform.delivered_titles(), vec!["MoodTrack"]);
        assert!(h.scheduler.upcoming().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_redelivers_after_thirty_minutes() {
        let h = harness(at(2, 9, 0), FakePlatform::new()).await;
        h.scheduler.snooze(slots::fallback_check_in(9)).await;

        sleep_minutes(29).await;
        assert!(h.platform.delivered().is_empty());
        sleep_minutes(2).await;
        assert_eq!(h.platform.delivered_titles(), vec!["Morning Check-in"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_silences_every_timer() {
        let h = harness(at(2, 7, 30), FakePlatform::new()).await;
        h.channel.register_channel().await;
        h.scheduler.arm(&NotificationSettings::default()).await;
        h.scheduler.send_test_notification().await;
        h.scheduler.snooze(slots::test_request()).await;
        settle().await;

        h.scheduler.teardown().await;
        assert_eq!(h.scheduler.mode().await, SchedulerMode::Idle);

        sleep_minutes(9 * 24 * 60).await;
        assert!(h.platform.delivered().is_empty());
        assert!(h.scheduler.upcoming().await.is_empty());
    }

    /// Wall clock that can jump ahead of tokio time, as after host suspend
    struct JumpClock {
        base: MockClock,
        offset: std::sync::Mutex<chrono::Duration>,
    }

    impl JumpClock {
        fn new(start: NaiveDateTime) -> Self {
            Self {
                base: MockClock::new(start),
                offset: std::sync::Mutex::new(chrono::Duration::zero()),
            }
        }

        fn jump(&self, by: chrono::Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for JumpClock {
        fn now(&self) -> NaiveDateTime {
            self.base.now() + *self.offset.lock().unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_fires_missed_slots_once() {
        let platform = Arc::new(FakePlatform::new().with_permission(PlatformPermission::Granted));
        let (events, _) = broadcast::channel::<NotificationEvent>(64);
        let permission = PermissionManager::new(platform.clone(), events.clone());
        permission.init().await;
        let channel = DeliveryChannel::new(
            platform.clone(),
            permission,
            NotificationInbox::new(),
            events,
        );
        let clock = Arc::new(JumpClock::new(at(2, 7, 0)));
        let scheduler = SchedulerService::new(
            clock.clone(),
            channel,
            AssessmentLedger::new(KeyValueStore::in_memory()),
            Arc::new(QuoteBank::builtin().unwrap()),
        );
        scheduler.arm(&only("check-in")).await;
        settle().await;

        // Host sleeps for three days; wall time moves, tokio time does not
        clock.jump(chrono::Duration::days(3));
        sleep_minutes(16).await;

        let mut titles = platform.delivered_titles();
        titles.sort();
        assert_eq!(
            titles,
            vec!["Evening check-in", "Good morning!", "Goodnight", "Midday check-in"]
        );

        let fire_times: Vec<NaiveDateTime> = scheduler
            .upcoming()
            .await
            .iter()
            .map(|timer| timer.fire_at)
            .collect();
        assert_eq!(
            fire_times,
            vec![at(5, 8, 0), at(5, 12, 0), at(5, 18, 0), at(5, 22, 0)]
        );

        // No second catch-up before the next real slot
        sleep_minutes(30).await;
        assert_eq!(platform.delivered().len(), 4);

        scheduler.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_replaces_previous_timers() {
        let h = harness(at(2, 7, 30), FakePlatform::new()).await;
        h.channel.register_channel().await;
        h.scheduler.arm(&only("check-in")).await;
        h.scheduler.arm(&only("check-in")).await;

        sleep_minutes(31).await;
        assert_eq!(h.platform.delivered_titles(), vec!["Good morning!"]);
    }
}
