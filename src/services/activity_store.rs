// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity store: the single source of truth for activity records.
//!
//! Enforces two rules:
//! 1. At most one activity per (user, date); writes are upserts by date.
//! 2. The edit window: a record may only be created or changed while its
//!    date is "today" for the store's clock and offset.
//!
//! Mutations are serialized and persisted as a whole collection through the
//! [`PersistencePort`]. The in-memory copy is replaced only after the save
//! succeeds, so a persistence failure leaves the store unchanged.

use chrono::FixedOffset;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::PersistencePort;
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityAggregate, ActivityUpdate, User};
use crate::time_utils::{local_date, Clock};

pub struct ActivityStore {
    port: Arc<dyn PersistencePort>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    activities: Mutex<Vec<Activity>>,
}

impl ActivityStore {
    /// Load the activity collection through `port`.
    pub async fn load(
        port: Arc<dyn PersistencePort>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Result<Self> {
        let activities = port.load_activities().await?;
        tracing::info!(count = activities.len(), "Activity store loaded");

        Ok(Self {
            port,
            clock,
            offset,
            activities: Mutex::new(activities),
        })
    }

    /// Today's date (`YYYY-MM-DD`), evaluated now.
    pub fn today(&self) -> String {
        local_date(self.clock.now(), self.offset)
    }

    /// Whether a record dated `date` may be created or modified right now.
    ///
    /// Independent of role: the rule applies to admins acting as users too.
    pub fn can_edit(&self, date: &str) -> bool {
        date == self.today()
    }

    /// All activities of `user_id`, most recent date first.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Activity> {
        let activities = self.activities.lock().await;
        let mut result: Vec<Activity> = activities
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        tracing::debug!(user_id, count = result.len(), "Listed activities");
        result
    }

    /// Every activity, unordered.
    pub async fn list_all(&self) -> Vec<Activity> {
        self.activities.lock().await.clone()
    }

    /// The activity of `user_id` on `date`, if recorded.
    pub async fn get_by_date(&self, user_id: &str, date: &str) -> Option<Activity> {
        self.activities
            .lock()
            .await
            .iter()
            .find(|a| a.user_id == user_id && a.date == date)
            .cloned()
    }

    /// Number of activities recorded on `date` across all users.
    pub async fn count_for_date(&self, date: &str) -> usize {
        self.activities
            .lock()
            .await
            .iter()
            .filter(|a| a.date == date)
            .count()
    }

    /// Create or update the activity of `user_id` on `date`.
    ///
    /// Fails with `EditWindowClosed` unless `date` is today, and with
    /// `InvalidField` for a rejected value. Either way nothing is written.
    pub async fn upsert(
        &self,
        user_id: &str,
        date: &str,
        fields: &ActivityUpdate,
    ) -> Result<Activity> {
        if !self.can_edit(date) {
            tracing::warn!(user_id, date, "Rejected edit outside the edit window");
            return Err(AppError::EditWindowClosed {
                date: date.to_string(),
            });
        }
        fields.validate()?;

        // Held across the save so writes never interleave
        let mut activities = self.activities.lock().await;
        let now = self.clock.now();

        let mut next = activities.clone();
        let existing = next
            .iter()
            .position(|a| a.user_id == user_id && a.date == date);

        let (index, created) = match existing {
            Some(index) => (index, false),
            None => {
                next.push(Activity::new(user_id, date, now));
                (next.len() - 1, true)
            }
        };

        let activity = &mut next[index];
        fields.apply(activity)?;
        activity.updated_at = now;
        let result = activity.clone();

        self.port.save_activity(&next, &result).await?;
        *activities = next;

        if created {
            tracing::info!(user_id, date, activity_id = %result.id, "Activity created");
        } else {
            tracing::info!(user_id, date, activity_id = %result.id, "Activity updated");
        }
        if result.exceeds_practical_ceiling() {
            tracing::debug!(
                user_id,
                japa_rounds = result.japa_rounds,
                lecture_duration = result.lecture_duration,
                "Activity above practical ceiling"
            );
        }

        Ok(result)
    }
}

/// Totals over the activities of `user_id` within `activities`.
pub fn aggregate_for_user(user_id: &str, activities: &[Activity]) -> ActivityAggregate {
    ActivityAggregate::from_activities(activities.iter().filter(|a| a.user_id == user_id))
}

/// Activities with `start <= date <= end`.
///
/// Dates are fixed-width ISO strings, so string order is calendar order.
/// When either bound is absent or empty nothing is filtered.
pub fn filter_by_date_range(
    activities: &[Activity],
    start: Option<&str>,
    end: Option<&str>,
) -> Vec<Activity> {
    match (non_empty(start), non_empty(end)) {
        (Some(start), Some(end)) => activities
            .iter()
            .filter(|a| a.date.as_str() >= start && a.date.as_str() <= end)
            .cloned()
            .collect(),
        _ => activities.to_vec(),
    }
}

/// Users whose name or email contains `term`, ignoring case.
///
/// An absent or empty term matches everyone.
pub fn filter_by_user_search(users: &[User], term: Option<&str>) -> Vec<User> {
    let Some(term) = non_empty(term) else {
        return users.to_vec();
    };
    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|u| {
            u.name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
