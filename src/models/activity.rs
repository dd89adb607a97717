// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily activity record and its partial update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::time_utils::parse_time_of_day;

/// Advisory ceiling for japa rounds; not enforced.
pub const JAPA_ROUNDS_CEILING: u32 = 108;

/// Advisory ceiling for lecture minutes; not enforced.
pub const LECTURE_MINUTES_CEILING: u32 = 180;

/// One user's practice record for one calendar day.
///
/// Stored in the `activities` collection, keyed by `id`. At most one record
/// exists per (`user_id`, `date`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Opaque unique identifier (also used as document ID)
    pub id: String,
    /// Owning user (lookup only)
    pub user_id: String,
    /// Calendar date (`YYYY-MM-DD`)
    pub date: String,
    /// Attended the dawn ceremony
    pub mangala_aarti: bool,
    /// Completed prayer-bead rounds
    pub japa_rounds: u32,
    /// Lecture heard, in minutes
    pub lecture_duration: u32,
    /// Wake-up time (`HH:MM`)
    #[serde(default)]
    pub wake_up_time: Option<String>,
    /// Bed time (`HH:MM`)
    #[serde(default)]
    pub sleep_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// A fresh record with every metric at its default.
    pub fn new(user_id: &str, date: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: date.to_string(),
            mangala_aarti: false,
            japa_rounds: 0,
            lecture_duration: 0,
            wake_up_time: None,
            sleep_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether either numeric field exceeds its advisory ceiling.
    pub fn exceeds_practical_ceiling(&self) -> bool {
        self.japa_rounds > JAPA_ROUNDS_CEILING || self.lecture_duration > LECTURE_MINUTES_CEILING
    }
}

/// Partial update: each field is independently present or absent.
///
/// Absent fields keep their prior value. For the two times, an empty string
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityUpdate {
    #[serde(default)]
    pub mangala_aarti: Option<bool>,
    #[serde(default)]
    pub japa_rounds: Option<i64>,
    #[serde(default)]
    pub lecture_duration: Option<i64>,
    #[serde(default)]
    pub wake_up_time: Option<String>,
    #[serde(default)]
    pub sleep_time: Option<String>,
}

impl ActivityUpdate {
    /// Check every supplied field without touching any record.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(v) = self.japa_rounds {
            count_field("japa_rounds", v)?;
        }
        if let Some(v) = self.lecture_duration {
            count_field("lecture_duration", v)?;
        }
        if let Some(t) = &self.wake_up_time {
            time_field("wake_up_time", t)?;
        }
        if let Some(t) = &self.sleep_time {
            time_field("sleep_time", t)?;
        }
        Ok(())
    }

    /// Merge into `activity`. Validates first; on error `activity` is untouched.
    pub fn apply(&self, activity: &mut Activity) -> Result<(), AppError> {
        self.validate()?;

        if let Some(v) = self.mangala_aarti {
            activity.mangala_aarti = v;
        }
        if let Some(v) = self.japa_rounds {
            activity.japa_rounds = count_field("japa_rounds", v)?;
        }
        if let Some(v) = self.lecture_duration {
            activity.lecture_duration = count_field("lecture_duration", v)?;
        }
        if let Some(t) = &self.wake_up_time {
            activity.wake_up_time = time_field("wake_up_time", t)?;
        }
        if let Some(t) = &self.sleep_time {
            activity.sleep_time = time_field("sleep_time", t)?;
        }
        Ok(())
    }
}

fn count_field(field: &'static str, value: i64) -> Result<u32, AppError> {
    if value < 0 {
        return Err(AppError::invalid_field(field, "must not be negative"));
    }
    u32::try_from(value).map_err(|_| AppError::invalid_field(field, "value too large"))
}

fn time_field(field: &'static str, value: &str) -> Result<Option<String>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_time_of_day(value)
        .map(|_| Some(value.to_string()))
        .ok_or_else(|| AppError::invalid_field(field, "expected HH:MM"))
}
