// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account authentication and session issuing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::db::CredentialPort;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{NewUser, Role, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::UserDirectory;
use crate::time_utils::Clock;

/// Display name of the bootstrap administrator.
const SEED_ADMIN_NAME: &str = "Admin";

/// Who is signed in, and signing in and out.
#[async_trait]
pub trait AuthPort: Send + Sync {
    /// The account behind an authenticated session, if it still exists.
    async fn current_user(&self, user_id: &str) -> Option<User>;
    async fn login(&self, email: &str, password: &str) -> Result<User>;
    async fn logout(&self, user_id: &str);
}

pub struct AuthService {
    users: Arc<UserDirectory>,
    credentials: Arc<dyn CredentialPort>,
    clock: Arc<dyn Clock>,
    signing_key: Vec<u8>,
    session_ttl_days: i64,
    default_password: Option<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserDirectory>,
        credentials: Arc<dyn CredentialPort>,
        clock: Arc<dyn Clock>,
        signing_key: Vec<u8>,
        session_ttl_days: i64,
        default_password: Option<String>,
    ) -> Self {
        Self {
            users,
            credentials,
            clock,
            signing_key,
            session_ttl_days,
            default_password,
        }
    }

    /// Signed session token for `user`.
    pub fn issue_session(&self, user: &User) -> Result<String> {
        Ok(create_jwt(user, &self.signing_key, self.session_ttl_days)?)
    }

    /// Create the administrator account unless a user with `email` exists.
    pub async fn ensure_seed_admin(&self, email: &str, password: &str) -> Result<User> {
        if let Some(existing) = self.users.find_by_email(email).await {
            if self.credentials.get_password_hash(&existing.id).await?.is_none() {
                tracing::warn!(user_id = %existing.id, "Seed admin had no password; resetting");
                self.store_password(&existing.id, password).await?;
            }
            return Ok(existing);
        }

        let admin = self
            .create_account(
                NewUser {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: SEED_ADMIN_NAME.to_string(),
                    email: email.to_string(),
                    role: Role::Admin,
                },
                password,
            )
            .await?;
        tracing::info!(user_id = %admin.id, "Seed admin created");
        Ok(admin)
    }

    /// Register a regular user. Without `password` the configured default is used.
    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<User> {
        let password = password
            .or(self.default_password.as_deref())
            .ok_or_else(|| {
                AppError::BadRequest(
                    "A password is required (no default user password configured)".to_string(),
                )
            })?;

        self.create_account(
            NewUser {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role: Role::User,
            },
            password,
        )
        .await
    }

    /// Stores the credential first: a failed write leaves at most an
    /// unreferenced hash, never an account nobody can log in to.
    async fn create_account(&self, new_user: NewUser, password: &str) -> Result<User> {
        if self.users.find_by_email(&new_user.email).await.is_some() {
            return Err(AppError::Conflict(format!(
                "User {} already exists",
                new_user.email.trim().to_lowercase()
            )));
        }

        let hash = hash_password(password)?;
        self.credentials
            .set_password_hash(&new_user.id, &hash)
            .await?;
        self.users.register(new_user, self.clock.now()).await
    }

    async fn store_password(&self, user_id: &str, password: &str) -> Result<()> {
        let hash = hash_password(password)?;
        self.credentials.set_password_hash(user_id, &hash).await
    }
}

#[async_trait]
impl AuthPort for AuthService {
    async fn current_user(&self, user_id: &str) -> Option<User> {
        self.users.get(user_id).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.users.find_by_email(email).await else {
            tracing::warn!("Login failed: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let Some(hash) = self.credentials.get_password_hash(&user.id).await? else {
            tracing::warn!(user_id = %user.id, "Login failed: no stored password");
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &hash)? {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
        Ok(user)
    }

    async fn logout(&self, user_id: &str) {
        // Sessions are stateless; the route clears the cookie
        tracing::info!(user_id, "User logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::middleware::auth::decode_jwt;
    use crate::time_utils::FixedClock;
    use std::sync::atomic::{AtomicBool, Ordering};

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    async fn service(default_password: Option<&str>) -> AuthService {
        let db = MemoryDb::new();
        let users = Arc::new(UserDirectory::load(Arc::new(db.clone())).await.unwrap());
        AuthService::new(
            users,
            Arc::new(db),
            Arc::new(FixedClock::at_noon("2024-01-05")),
            KEY.to_vec(),
            7,
            default_password.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_seed_admin_login() {
        let auth = service(None).await;
        let admin = auth
            .ensure_seed_admin("admin@sadhna.com", "admin-password")
            .await
            .unwrap();
        assert_eq!(admin.role, Role::Admin);

        let user = auth
            .login("Admin@Sadhna.com", "admin-password")
            .await
            .unwrap();
        assert_eq!(user.id, admin.id);

        let claims = decode_jwt(&auth.issue_session(&user).unwrap(), KEY).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let auth = service(None).await;
        let first = auth.ensure_seed_admin("admin@sadhna.com", "pw-1234").await.unwrap();
        let second = auth.ensure_seed_admin("admin@sadhna.com", "pw-1234").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(auth.users.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let auth = service(Some("password")).await;
        auth.register_user("Alice", "alice@example.com", None)
            .await
            .unwrap();

        assert!(matches!(
            auth.login("alice@example.com", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "password").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(auth.login("alice@example.com", "password").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_without_password_or_default() {
        let auth = service(None).await;
        let err = auth
            .register_user("Alice", "alice@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(auth.users.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_with_explicit_password() {
        let auth = service(Some("password")).await;
        let bob = auth
            .register_user("Bob", "bob@example.com", Some("bob-secret"))
            .await
            .unwrap();
        assert_eq!(bob.role, Role::User);
        assert!(auth.login("bob@example.com", "bob-secret").await.is_ok());
        assert!(auth.login("bob@example.com", "password").await.is_err());
        assert_eq!(auth.current_user(&bob.id).await, Some(bob));
    }

    /// Credential store whose writes can be switched off.
    struct FlakyCredentials {
        inner: MemoryDb,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl CredentialPort for FlakyCredentials {
        async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>> {
            self.inner.get_password_hash(user_id).await
        }

        async fn set_password_hash(&self, user_id: &str, hash: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Persistence("down".to_string()));
            }
            self.inner.set_password_hash(user_id, hash).await
        }
    }

    #[tokio::test]
    async fn test_failed_credential_write_registers_nobody() {
        let db = MemoryDb::new();
        let users = Arc::new(UserDirectory::load(Arc::new(db.clone())).await.unwrap());
        let credentials = Arc::new(FlakyCredentials {
            inner: db,
            fail_writes: AtomicBool::new(true),
        });
        let auth = AuthService::new(
            users.clone(),
            credentials.clone(),
            Arc::new(FixedClock::at_noon("2024-01-05")),
            KEY.to_vec(),
            7,
            Some("password".to_string()),
        );

        let err = auth
            .register_user("Alice", "alice@example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(users.list_all().await.is_empty());

        // Retrying once storage recovers succeeds and the account can log in
        credentials.fail_writes.store(false, Ordering::SeqCst);
        let alice = auth
            .register_user("Alice", "alice@example.com", None)
            .await
            .unwrap();
        let logged_in = auth.login("alice@example.com", "password").await.unwrap();
        assert_eq!(logged_in.id, alice.id);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let auth = service(Some("password")).await;
        auth.register_user("Alice", "alice@example.com", None)
            .await
            .unwrap();

        let err = auth
            .register_user("Alice Again", " ALICE@example.com", Some("other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // The original password still works
        assert!(auth.login("alice@example.com", "password").await.is_ok());
    }
}
