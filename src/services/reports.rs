// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin dashboard reports over all regular users.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::models::{Activity, AdminReport, Overview, RecentActivity, Role, User, UserReport};
use crate::services::activity_store::{
    aggregate_for_user, filter_by_date_range, filter_by_user_search,
};

/// Maximum number of entries in [`AdminReport::recent_activities`].
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Name shown for activities whose owner is not in the directory.
const UNKNOWN_USER: &str = "Unknown";

/// Search term and date range for the admin report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl ReportFilter {
    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether any part of the filter is set.
    pub fn is_active(&self) -> bool {
        [&self.search, &self.start, &self.end]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// Per-user totals and recent activity for the admin dashboard.
pub fn build_admin_report(
    users: &[User],
    activities: &[Activity],
    filter: &ReportFilter,
) -> AdminReport {
    let regular: Vec<User> = users
        .iter()
        .filter(|u| u.role != Role::Admin)
        .cloned()
        .collect();
    let matching = filter_by_user_search(&regular, filter.search_term());

    let mut selected =
        filter_by_date_range(activities, filter.start.as_deref(), filter.end.as_deref());
    if filter.search_term().is_some() {
        let ids: HashSet<&str> = matching.iter().map(|u| u.id.as_str()).collect();
        selected.retain(|a| ids.contains(a.user_id.as_str()));
    }

    let names: HashMap<&str, &str> = users
        .iter()
        .map(|u| (u.id.as_str(), u.name.as_str()))
        .collect();

    let mut recent: Vec<&Activity> = selected.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_activities = recent
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|a| RecentActivity {
            activity: a.clone(),
            user_name: names
                .get(a.user_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_USER)
                .to_string(),
        })
        .collect();

    let users = matching
        .into_iter()
        .map(|user| {
            let stats = aggregate_for_user(&user.id, &selected);
            UserReport { user, stats }
        })
        .collect();

    let report = AdminReport {
        users,
        recent_activities,
        filtered: filter.is_active(),
    };
    tracing::debug!(
        users = report.users.len(),
        activities = selected.len(),
        filtered = report.filtered,
        "Built admin report"
    );
    report
}

/// Headline counts for the admin dashboard. Admins are not counted as users.
pub fn overview(users: &[User], activities: &[Activity], todays_activities: usize) -> Overview {
    Overview {
        total_users: users.iter().filter(|u| u.role != Role::Admin).count() as u64,
        total_activities: activities.len() as u64,
        todays_activities: todays_activities as u64,
    }
}
