// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer.
//!
//! Services talk to storage only through [`PersistencePort`] and
//! [`CredentialPort`]. Two backends implement both: [`MemoryDb`] (JSON blobs
//! under fixed keys, like browser local storage) and [`FirestoreDb`].
//! Neither port promises atomicity across collections.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Activity, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ACTIVITIES: &str = "activities";
    /// Password hashes (keyed by user id)
    pub const CREDENTIALS: &str = "credentials";
}

/// Whole-collection load/save of users and activities.
#[async_trait]
pub trait PersistencePort: Send + Sync {
    async fn load_activities(&self) -> Result<Vec<Activity>, AppError>;
    async fn save_activities(&self, activities: &[Activity]) -> Result<(), AppError>;

    /// Persist `changed`, one element of the full `activities` collection.
    ///
    /// Whole-collection backends save `activities`; document stores may
    /// write only `changed`.
    async fn save_activity(
        &self,
        activities: &[Activity],
        _changed: &Activity,
    ) -> Result<(), AppError> {
        self.save_activities(activities).await
    }
    async fn load_users(&self) -> Result<Vec<User>, AppError>;
    async fn save_users(&self, users: &[User]) -> Result<(), AppError>;
}

/// Password-hash storage used by the auth service.
#[async_trait]
pub trait CredentialPort: Send + Sync {
    async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>, AppError>;
    async fn set_password_hash(&self, user_id: &str, hash: &str) -> Result<(), AppError>;
}
