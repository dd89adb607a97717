// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregates and admin report shapes.
//!
//! Aggregates are computed on demand by iterating the (already filtered)
//! activity set; nothing here is stored.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, User};

/// Totals over a set of activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityAggregate {
    /// Number of activities
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_activities: u64,
    /// Activities with mangala aarti attended
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub mangala_aarti_count: u64,
    /// Sum of japa rounds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_japa_rounds: u64,
    /// Sum of lecture minutes
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_lecture_duration: u64,
}

impl ActivityAggregate {
    /// Aggregate every activity yielded by `activities`.
    pub fn from_activities<'a, I>(activities: I) -> Self
    where
        I: IntoIterator<Item = &'a Activity>,
    {
        let mut stats = Self::default();
        for activity in activities {
            stats.add_activity(activity);
        }
        stats
    }

    /// Fold one activity into the totals.
    pub fn add_activity(&mut self, activity: &Activity) {
        self.total_activities += 1;
        if activity.mangala_aarti {
            self.mangala_aarti_count += 1;
        }
        self.total_japa_rounds += u64::from(activity.japa_rounds);
        self.total_lecture_duration += u64::from(activity.lecture_duration);
    }
}

impl Add for ActivityAggregate {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ActivityAggregate {
    fn add_assign(&mut self, rhs: Self) {
        self.total_activities += rhs.total_activities;
        self.mangala_aarti_count += rhs.mangala_aarti_count;
        self.total_japa_rounds += rhs.total_japa_rounds;
        self.total_lecture_duration += rhs.total_lecture_duration;
    }
}

/// One row of the all-users report.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserReport {
    pub user: User,
    pub stats: ActivityAggregate,
}

/// An activity annotated with its owner's display name.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecentActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub user_name: String,
}

/// Admin report across all regular users.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AdminReport {
    pub users: Vec<UserReport>,
    /// Most recent matching activities, date descending
    pub recent_activities: Vec<RecentActivity>,
    /// Whether any search or date filter was applied
    pub filtered: bool,
}

/// Headline counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Overview {
    /// Registered non-admin users
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_users: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_activities: u64,
    /// Activities recorded for today's date
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub todays_activities: u64,
}
