//! Delivery slots and due-time arithmetic
//!
//! Pure functions: given the current wall time (and the ledger value for the
//! weekly kind) they compute when a slot fires next and what it says.

use crate::config;
use crate::models::{NotificationKind, NotificationRequest};
use crate::services::quotes::{Quote, TimeOfDay};
use crate::services::settings::NotificationSettings;
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// A fixed daily mood check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInSlot {
    pub hour: u32,
    pub minute: u32,
    pub title: &'static str,
    pub body: &'static str,
}

impl CheckInSlot {
    pub fn request(&self) -> NotificationRequest {
        NotificationRequest::new(
            NotificationKind::MoodCheckIn,
            self.title,
            self.body,
            config::CHECK_IN_URL,
        )
    }
}

/// A fixed daily quote; the bucket follows from the slot's hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteSlot {
    pub hour: u32,
    pub minute: u32,
}

impl QuoteSlot {
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.hour)
    }
}

pub fn check_in_slots() -> Vec<CheckInSlot> {
    config::MOOD_CHECK_IN_SLOTS
        .iter()
        .map(|&(hour, minute, title, body)| CheckInSlot {
            hour,
            minute,
            title,
            body,
        })
        .collect()
}

pub fn quote_slots() -> Vec<QuoteSlot> {
    config::QUOTE_SLOTS
        .iter()
        .map(|&(hour, minute)| QuoteSlot { hour, minute })
        .collect()
}

fn on_day_at(day: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    // Slot times come from the constant tables; midnight guards a bad entry
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    day.date().and_time(time)
}

/// One day after `time`; saturates at the end of the representable range
fn next_day(time: NaiveDateTime) -> NaiveDateTime {
    time.checked_add_signed(Duration::days(1)).unwrap_or(NaiveDateTime::MAX)
}

/// Today at `hour:minute` if that is still ahead, otherwise tomorrow
pub fn next_daily_fire(now: NaiveDateTime, hour: u32, minute: u32) -> NaiveDateTime {
    let today = on_day_at(now, hour, minute);
    if today <= now {
        next_day(today)
    } else {
        today
    }
}

pub fn tomorrow_at(now: NaiveDateTime, hour: u32) -> NaiveDateTime {
    match now.checked_add_signed(Duration::days(1)) {
        Some(tomorrow) => on_day_at(tomorrow, hour, 0),
        None => NaiveDateTime::MAX,
    }
}

/// Seven days after the last completion; tomorrow 10:00 when there is none,
/// when that date has already passed, or when it is out of range
pub fn next_assessment_due(now: NaiveDateTime, last: Option<NaiveDateTime>) -> NaiveDateTime {
    let fallback = tomorrow_at(now, config::ASSESSMENT_FALLBACK_HOUR);
    let Some(last) = last else {
        return fallback;
    };

    match last.checked_add_signed(Duration::days(config::ASSESSMENT_INTERVAL_DAYS)) {
        Some(due) if due > now => due,
        Some(_) => fallback,
        None => {
            tracing::warn!("Last assessment {} is out of range, ignoring it", last);
            fallback
        }
    }
}

/// Next fire of every slot the settings enable, earliest first.
///
/// Matches what the precise scheduler would arm at `now`, without arming it.
pub fn planned_fires(
    now: NaiveDateTime,
    last_assessment: Option<NaiveDateTime>,
    settings: &NotificationSettings,
) -> Vec<(NaiveDateTime, NotificationKind)> {
    let mut fires = Vec::new();
    if settings.mood_check_ins {
        for slot in check_in_slots() {
            let fire_at = next_daily_fire(now, slot.hour, slot.minute);
            fires.push((fire_at, NotificationKind::MoodCheckIn));
        }
    }
    if settings.quotes {
        for slot in quote_slots() {
            let fire_at = next_daily_fire(now, slot.hour, slot.minute);
            fires.push((fire_at, NotificationKind::Quote));
        }
    }
    if settings.weekly_assessment {
        let due = next_assessment_due(now, last_assessment);
        fires.push((due, NotificationKind::Assessment));
    }
    fires.sort_by_key(|(fire_at, _)| *fire_at);
    fires
}

pub fn quote_request(time_of_day: TimeOfDay, quote: &Quote) -> NotificationRequest {
    NotificationRequest::new(
        NotificationKind::Quote,
        time_of_day.inspiration_title(),
        quote.as_body(),
        config::QUOTE_URL,
    )
}

pub fn assessment_request() -> NotificationRequest {
    NotificationRequest::new(
        NotificationKind::Assessment,
        config::ASSESSMENT_TITLE,
        config::ASSESSMENT_BODY,
        config::ASSESSMENT_URL,
    )
}

pub fn test_request() -> NotificationRequest {
    NotificationRequest::new(
        NotificationKind::MoodCheckIn,
        config::TEST_NOTIFICATION_TITLE,
        config::TEST_NOTIFICATION_BODY,
        config::CHECK_IN_URL,
    )
    .with_tag("moodtrack-test")
}

/// Coarse check-in used in fallback mode, chosen by the current hour bucket
pub fn fallback_check_in(hour: u32) -> NotificationRequest {
    let (title, body) = match TimeOfDay::from_hour(hour) {
        TimeOfDay::Morning => ("Morning Check-in", "How are you feeling this morning?"),
        TimeOfDay::Noon => ("Afternoon Check-in", "How's your day going so far?"),
        TimeOfDay::Evening => ("Evening Check-in", "Reflect on your day before it ends."),
        TimeOfDay::Night => ("Night Check-in", "How are you feeling before bed?"),
    };
    NotificationRequest::new(NotificationKind::MoodCheckIn, title, body, config::CHECK_IN_URL)
}

/// Fallback-mode assessment nudge: only when never done or a week overdue
pub fn fallback_assessment(
    now: NaiveDateTime,
    last: Option<NaiveDateTime>,
) -> Option<NotificationRequest> {
    match last {
        None => Some(NotificationRequest::new(
            NotificationKind::Assessment,
            config::FALLBACK_FIRST_ASSESSMENT_TITLE,
            config::FALLBACK_FIRST_ASSESSMENT_BODY,
            config::ASSESSMENT_URL,
        )),
        Some(last) if (now - last).num_days() >= config::ASSESSMENT_INTERVAL_DAYS => {
            Some(NotificationRequest::new(
                NotificationKind::Assessment,
                config::ASSESSMENT_TITLE,
                config::FALLBACK_ASSESSMENT_BODY,
                config::ASSESSMENT_URL,
            ))
        }
        Some(_) => None,
    }
}
