//! Assessment ledger
//!
//! Holds the single "last PHQ-5 assessment completed" timestamp. Each
//! completion overwrites the previous value; no history is kept.

use crate::config::LAST_ASSESSMENT_KEY;
use crate::error::Result;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone)]
pub struct AssessmentLedger {
    store: KeyValueStore,
}

impl AssessmentLedger {
    pub fn new(store: KeyValueStore) -> Self {
        Self { store }
    }

    /// Overwrite the stored completion time
    pub async fn record_completion(&self, now: NaiveDateTime) -> Result<()> {
        let value = now.format(TIMESTAMP_FORMAT).to_string();
        self.store.set(LAST_ASSESSMENT_KEY, &value).await?;
        tracing::info!("Recorded PHQ-5 completion at {}", value);
        Ok(())
    }

    /// Last completion in local time, or `None` if never completed
    pub async fn last_completion(&self) -> Result<Option<NaiveDateTime>> {
        let Some(raw) = self.store.get(LAST_ASSESSMENT_KEY).await? else {
            return Ok(None);
        };

        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            tracing::warn!("Ignoring unreadable assessment timestamp: {:?}", raw);
        }
        Ok(parsed)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(LAST_ASSESSMENT_KEY).await
    }
}

/// Accepts local ISO-8601 values and RFC 3339 values carrying an offset
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Local).naive_local());
    }
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_absent_entry_means_never() {
        let ledger = AssessmentLedger::new(KeyValueStore::in_memory());
        assert_eq!(ledger.last_completion().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_completion_replaces_first() {
        let store = KeyValueStore::in_memory();
        let ledger = AssessmentLedger::new(store.clone());

        ledger.record_completion(at(2, 9, 0)).await.unwrap();
        ledger.record_completion(at(3, 18, 30)).await.unwrap();

        assert_eq!(ledger.last_completion().await.unwrap(), Some(at(3, 18, 30)));
        assert_eq!(
            store.get(LAST_ASSESSMENT_KEY).await.unwrap().as_deref(),
            Some("2026-03-03T18:30:00.000")
        );
    }

    #[tokio::test]
    async fn test_reads_rfc3339_written_by_browser() {
        let store = KeyValueStore::in_memory();
        store
            .set(LAST_ASSESSMENT_KEY, "2026-03-02T09:00:00.000Z")
            .await
            .unwrap();
        let ledger = AssessmentLedger::new(store);

        let expected = DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(ledger.last_completion().await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_garbage_value_is_treated_as_absent() {
        let store = KeyValueStore::in_memory();
        store.set(LAST_ASSESSMENT_KEY, "last tuesday").await.unwrap();
        let ledger = AssessmentLedger::new(store);

        assert_eq!(ledger.last_completion().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_entry() {
        let ledger = AssessmentLedger::new(KeyValueStore::in_memory());
        ledger.record_completion(at(2, 9, 0)).await.unwrap();
        ledger.clear().await.unwrap();
        assert_eq!(ledger.last_completion().await.unwrap(), None);
    }
}
