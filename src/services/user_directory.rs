// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registered users, loaded once and persisted as a whole collection.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::PersistencePort;
use crate::error::{AppError, Result};
use crate::models::{NewUser, Role, User};

pub struct UserDirectory {
    port: Arc<dyn PersistencePort>,
    users: RwLock<Vec<User>>,
}

impl UserDirectory {
    pub async fn load(port: Arc<dyn PersistencePort>) -> Result<Self> {
        let users = port.load_users().await?;
        tracing::info!(count = users.len(), "User directory loaded");

        Ok(Self {
            port,
            users: RwLock::new(users),
        })
    }

    pub async fn list_all(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Everyone except administrators.
    pub async fn regular_users(&self) -> Vec<User> {
        self.users
            .read()
            .await
            .iter()
            .filter(|u| u.role != Role::Admin)
            .cloned()
            .collect()
    }

    pub async fn get(&self, user_id: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    /// Lookup by login email, ignoring case and surrounding whitespace.
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Add a new account. Fails with `Conflict` if the email is taken.
    pub async fn register(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<User> {
        let name = new_user.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::invalid_field("name", "must not be empty"));
        }
        let email = normalize_email(&new_user.email);
        if email.is_empty() {
            return Err(AppError::invalid_field("email", "must not be empty"));
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(format!("User {} already exists", email)));
        }

        let user = User {
            id: new_user.id,
            name,
            email,
            role: new_user.role,
            created_at: now,
        };

        let mut next = users.clone();
        next.push(user.clone());
        self.port.save_users(&next).await?;
        *users = next;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn new_user(name: &str, email: &str, role: Role) -> NewUser {
        NewUser {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }

    async fn directory() -> (UserDirectory, MemoryDb) {
        let db = MemoryDb::new();
        let dir = UserDirectory::load(Arc::new(db.clone())).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let (dir, db) = directory().await;

        let alice = dir
            .register(new_user(" Alice ", "Alice@Example.com", Role::User), Utc::now())
            .await
            .unwrap();

        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.email, "alice@example.com");
        assert_eq!(dir.get(&alice.id).await, Some(alice.clone()));
        assert_eq!(dir.find_by_email("ALICE@example.COM").await, Some(alice));
        assert_eq!(db.load_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let (dir, _) = directory().await;
        dir.register(new_user("Alice", "alice@example.com", Role::User), Utc::now())
            .await
            .unwrap();

        let err = dir
            .register(new_user("Other", "ALICE@example.com", Role::User), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(dir.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (dir, _) = directory().await;
        let err = dir
            .register(new_user("   ", "x@example.com", Role::User), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidField { field: "name", .. }));
    }

    #[tokio::test]
    async fn test_regular_users_excludes_admins() {
        let (dir, _) = directory().await;
        dir.register(new_user("Admin", "admin@sadhna.com", Role::Admin), Utc::now())
            .await
            .unwrap();
        dir.register(new_user("Bob", "bob@example.com", Role::User), Utc::now())
            .await
            .unwrap();

        let regular = dir.regular_users().await;
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].name, "Bob");
    }

    #[tokio::test]
    async fn test_reload_sees_persisted_users() {
        let (dir, db) = directory().await;
        dir.register(new_user("Bob", "bob@example.com", Role::User), Utc::now())
            .await
            .unwrap();

        let reloaded = UserDirectory::load(Arc::new(db)).await.unwrap();
        assert!(reloaded.find_by_email("bob@example.com").await.is_some());
    }
}
