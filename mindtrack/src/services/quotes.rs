//! Quote bank
//!
//! Inspirational quotes grouped by time of day. The bank is validated once
//! when it is built; picking a quote never fails afterwards.

use crate::error::{AppError, Result};
use chrono::Timelike;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hour bucket a quote belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 05:00 to 11:59
    Morning,
    /// 12:00 to 16:59
    Noon,
    /// 17:00 to 21:59
    Evening,
    /// 22:00 to 04:59
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Noon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Noon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn from_time(time: impl Timelike) -> Self {
        Self::from_hour(time.hour())
    }

    /// Prefix used in "{label} Inspiration" titles
    pub fn inspiration_label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Noon => "Midday",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    pub fn inspiration_title(self) -> String {
        format!("{} Inspiration", self.inspiration_label())
    }

    fn index(self) -> usize {
        match self {
            TimeOfDay::Morning => 0,
            TimeOfDay::Noon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Noon => "noon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" => Ok(TimeOfDay::Morning),
            "noon" | "midday" | "afternoon" => Ok(TimeOfDay::Noon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            other => Err(format!(
                "Invalid time of day '{}'. Use morning, noon, evening or night",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
    pub category: TimeOfDay,
}

impl Quote {
    pub fn new(text: &str, author: &str, category: TimeOfDay) -> Self {
        Self {
            text: text.to_string(),
            author: author.to_string(),
            category,
        }
    }

    /// Notification body: quoted text followed by the author
    pub fn as_body(&self) -> String {
        format!("\"{}\" - {}", self.text, self.author)
    }
}

const BUILTIN_QUOTES: &[(TimeOfDay, &str, &str)] = &[
    (
        TimeOfDay::Morning,
        "Today is a new beginning, a chance to turn your dreams into reality.",
        "Unknown",
    ),
    (
        TimeOfDay::Morning,
        "The morning sun has secrets to tell you. Don't go back to sleep.",
        "Rumi",
    ),
    (
        TimeOfDay::Morning,
        "Every morning brings new potential, but if you keep doing the same things you won't see different results.",
        "Unknown",
    ),
    (TimeOfDay::Morning, "Wake up with determination, go to bed with satisfaction.", "Unknown"),
    (
        TimeOfDay::Morning,
        "Your future is created by what you do today, not tomorrow.",
        "Robert Kiyosaki",
    ),
    (TimeOfDay::Noon, "Take a breath. You're halfway through your day and doing great.", "Unknown"),
    (
        TimeOfDay::Noon,
        "The present moment is filled with joy and happiness. If you are attentive, you will see it.",
        "Thich Nhat Hanh",
    ),
    (TimeOfDay::Noon, "Your attitude determines your direction.", "Unknown"),
    (TimeOfDay::Noon, "The only way to do great work is to love what you do.", "Steve Jobs"),
    (
        TimeOfDay::Noon,
        "Success is not final, failure is not fatal: it is the courage to continue that counts.",
        "Winston Churchill",
    ),
    (TimeOfDay::Evening, "Reflect on your day with gratitude, not judgment.", "Unknown"),
    (
        TimeOfDay::Evening,
        "The day is over, the night is here, tomorrow is a new opportunity.",
        "Unknown",
    ),
    (TimeOfDay::Evening, "Your day was important because you were in it.", "Unknown"),
    (
        TimeOfDay::Evening,
        "Rest and self-care are so important. When you take time to replenish your spirit, it allows you to serve others from the overflow.",
        "Eleanor Brown",
    ),
    (TimeOfDay::Evening, "Each day provides its own gifts.", "Marcus Aurelius"),
    (TimeOfDay::Night, "Sleep is the best meditation.", "Dalai Lama"),
    (
        TimeOfDay::Night,
        "The night is more alive and more richly colored than the day.",
        "Vincent van Gogh",
    ),
    (TimeOfDay::Night, "Stars can't shine without darkness.", "Unknown"),
    (
        TimeOfDay::Night,
        "Never let the darkness or negativity outside affect your inner self.",
        "Unknown",
    ),
    (TimeOfDay::Night, "The darkest nights produce the brightest stars.", "John Green"),
];

/// Quotes grouped into four non-empty buckets
#[derive(Debug, Clone)]
pub struct QuoteBank {
    buckets: [Vec<Quote>; 4],
}

impl QuoteBank {
    /// Build a bank, rejecting any configuration that leaves a bucket empty
    pub fn new(quotes: Vec<Quote>) -> Result<Self> {
        let mut buckets: [Vec<Quote>; 4] = Default::default();
        for quote in quotes {
            buckets[quote.category.index()].push(quote);
        }

        for time_of_day in TimeOfDay::ALL {
            if buckets[time_of_day.index()].is_empty() {
                return Err(AppError::Config(format!(
                    "quote bucket '{}' is empty",
                    time_of_day
                )));
            }
        }

        Ok(Self { buckets })
    }

    /// The bundled quote collection
    pub fn builtin() -> Result<Self> {
        Self::new(
            BUILTIN_QUOTES
                .iter()
                .map(|(category, text, author)| Quote::new(text, author, *category))
                .collect(),
        )
    }

    pub fn quotes(&self, time_of_day: TimeOfDay) -> &[Quote] {
        &self.buckets[time_of_day.index()]
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uniform pick from the matching bucket
    pub fn pick_quote(&self, time_of_day: TimeOfDay) -> &Quote {
        self.pick_quote_with(time_of_day, &mut rand::thread_rng())
    }

    pub fn pick_quote_with<R: Rng + ?Sized>(&self, time_of_day: TimeOfDay, rng: &mut R) -> &Quote {
        let bucket = self.quotes(time_of_day);
        &bucket[rng.gen_range(0..bucket.len())]
    }

    /// Uniform pick across every bucket
    pub fn pick_any_quote(&self) -> &Quote {
        self.pick_any_quote_with(&mut rand::thread_rng())
    }

    pub fn pick_any_quote_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &Quote {
        let mut index = rng.gen_range(0..self.len());
        for bucket in &self.buckets {
            if index < bucket.len() {
                return &bucket[index];
            }
            index -= bucket.len();
        }
        // len() > 0 is guaranteed by construction, so the loop always returns
        &self.buckets[0][0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn hour_buckets_match_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Noon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn builtin_bank_fills_every_bucket() {
        let bank = QuoteBank::builtin().unwrap();
        assert_eq!(bank.len(), 20);
        for time_of_day in TimeOfDay::ALL {
            assert_eq!(bank.quotes(time_of_day).len(), 5);
        }
    }

    #[test]
    fn empty_bucket_is_rejected_at_construction() {
        let quotes = vec![
            Quote::new("a", "x", TimeOfDay::Morning),
            Quote::new("b", "x", TimeOfDay::Noon),
            Quote::new("c", "x", TimeOfDay::Evening),
        ];
        let err = QuoteBank::new(quotes).unwrap_err();
        assert!(err.to_string().contains("night"));
    }

    #[test]
    fn pick_quote_stays_in_bucket() {
        let bank = QuoteBank::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let quote = bank.pick_quote_with(TimeOfDay::Evening, &mut rng);
            assert_eq!(quote.category, TimeOfDay::Evening);
        }
    }

    #[test]
    fn pick_any_quote_reaches_every_bucket() {
        let bank = QuoteBank::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(bank.pick_any_quote_with(&mut rng).category);
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn parses_time_of_day_names() {
        assert_eq!("Morning".parse::<TimeOfDay>(), Ok(TimeOfDay::Morning));
        assert_eq!("midday".parse::<TimeOfDay>(), Ok(TimeOfDay::Noon));
        assert!("dawn".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn quote_body_includes_author() {
        let quote = Quote::new(
            "Each day provides its own gifts.",
            "Marcus Aurelius",
            TimeOfDay::Evening,
        );
        assert_eq!(quote.as_body(), "\"Each day provides its own gifts.\" - Marcus Aurelius");
        assert_eq!(TimeOfDay::Noon.inspiration_title(), "Midday Inspiration");
    }
}
