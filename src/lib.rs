// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sadhna-Tracker: daily spiritual practice tracking
//!
//! This crate provides the backend API for recording one activity per user
//! per day (editable only on that day) and for the admin dashboard that
//! aggregates everyone's practice.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::{CredentialPort, PersistencePort};
use error::AppError;
use services::{ActivityStore, AuthService, UserDirectory};
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: ActivityStore,
    pub users: Arc<UserDirectory>,
    pub auth: AuthService,
}

impl AppState {
    /// Load both collections and make sure the seed admin exists.
    pub async fn initialize(
        config: Config,
        persistence: Arc<dyn PersistencePort>,
        credentials: Arc<dyn CredentialPort>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let users = Arc::new(UserDirectory::load(persistence.clone()).await?);
        let store = ActivityStore::load(persistence, clock.clone(), config.today_offset).await?;

        let auth = AuthService::new(
            users.clone(),
            credentials,
            clock,
            config.jwt_signing_key.clone(),
            config.session_ttl_days,
            config.default_user_password.clone(),
        );
        auth.ensure_seed_admin(&config.admin_email, &config.admin_password)
            .await?;

        Ok(Self {
            config,
            store,
            users,
            auth,
        })
    }
}
