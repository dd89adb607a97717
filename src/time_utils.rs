// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling and the injectable clock.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Calendar dates are exchanged as fixed-width ISO strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Times of day are exchanged as 24-hour `HH:MM`.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Parse a strict `YYYY-MM-DD` date.
///
/// `%Y` alone tolerates signs and short fields, so the date must also
/// format back to exactly `raw`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == raw)
}

/// Parse a strict `HH:MM` time of day.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    if raw.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(raw, TIME_OF_DAY_FORMAT).ok()
}

/// The calendar date of `now` as seen at `offset`, formatted `YYYY-MM-DD`.
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> String {
    offset
        .from_utc_datetime(&now.naive_utc())
        .date_naive()
        .format(DATE_FORMAT)
        .to_string()
}

/// Source of "now". Injected wherever the calendar day matters.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    /// Clock fixed at noon UTC on `date` (`YYYY-MM-DD`), or the epoch if unparseable.
    pub fn at_noon(date: &str) -> Self {
        let at = parse_iso_date(date)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_default();
        Self::new(at)
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.millis
            .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
