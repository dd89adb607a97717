// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process storage keeping each collection as a JSON blob under a fixed key.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{CredentialPort, PersistencePort};
use crate::error::AppError;
use crate::models::{Activity, User};

pub const ACTIVITIES_KEY: &str = "sadhna_activities";
pub const USERS_KEY: &str = "sadhna_users";
pub const CREDENTIALS_KEY: &str = "sadhna_credentials";

/// Key/value blob store. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryDb {
    blobs: Arc<DashMap<&'static str, String>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw blob stored under `key`, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.blobs.get(key).map(|v| v.value().clone())
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &'static str) -> Result<T, AppError> {
        match self.blobs.get(key) {
            Some(blob) => serde_json::from_str(blob.value())
                .map_err(|e| AppError::Persistence(format!("Corrupt blob {}: {}", key, e))),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), AppError> {
        let blob = serde_json::to_string(value)
            .map_err(|e| AppError::Persistence(format!("Failed to encode {}: {}", key, e)))?;
        self.blobs.insert(key, blob);
        Ok(())
    }
}

#[async_trait]
impl PersistencePort for MemoryDb {
    async fn load_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.read(ACTIVITIES_KEY)
    }

    async fn save_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        self.write(ACTIVITIES_KEY, activities)
    }

    async fn load_users(&self) -> Result<Vec<User>, AppError> {
        self.read(USERS_KEY)
    }

    async fn save_users(&self, users: &[User]) -> Result<(), AppError> {
        self.write(USERS_KEY, users)
    }
}

#[async_trait]
impl CredentialPort for MemoryDb {
    async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let mut hashes: HashMap<String, String> = self.read(CREDENTIALS_KEY)?;
        Ok(hashes.remove(user_id))
    }

    async fn set_password_hash(&self, user_id: &str, hash: &str) -> Result<(), AppError> {
        // Read-modify-write on one entry of a shared blob
        let mut entry = self
            .blobs
            .entry(CREDENTIALS_KEY)
            .or_insert_with(|| "{}".to_string());
        let mut hashes: HashMap<String, String> =
            serde_json::from_str(entry.value()).map_err(|e| {
                AppError::Persistence(format!("Corrupt blob {}: {}", CREDENTIALS_KEY, e))
            })?;
        hashes.insert(user_id.to_string(), hash.to_string());
        *entry.value_mut() = serde_json::to_string(&hashes).map_err(|e| {
            AppError::Persistence(format!("Failed to encode {}: {}", CREDENTIALS_KEY, e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user(id: &str) -> User {
        User {
            id: id.to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            created_at: chrono::DateTime::from_timestamp(1_704_456_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_empty_collections() {
        let db = MemoryDb::new();
        assert!(db.load_activities().await.unwrap().is_empty());
        assert!(db.load_users().await.unwrap().is_empty());
        assert_eq!(db.get_password_hash("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_users_saved_under_fixed_key() {
        let db = MemoryDb::new();
        db.save_users(&[sample_user("u1")]).await.unwrap();

        let raw = db.raw(USERS_KEY).expect("blob written");
        assert!(raw.contains("\"created_at\""));
        assert_eq!(db.load_users().await.unwrap(), vec![sample_user("u1")]);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let db = MemoryDb::new();
        let other = db.clone();
        db.set_password_hash("u1", "hash-1").await.unwrap();
        db.set_password_hash("u2", "hash-2").await.unwrap();

        assert_eq!(
            other.get_password_hash("u1").await.unwrap().as_deref(),
            Some("hash-1")
        );
        assert_eq!(
            other.get_password_hash("u2").await.unwrap().as_deref(),
            Some("hash-2")
        );
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_persistence_error() {
        let db = MemoryDb::new();
        db.blobs.insert(ACTIVITIES_KEY, "not json".to_string());
        assert!(matches!(
            db.load_activities().await,
            Err(AppError::Persistence(_))
        ));
    }
}
