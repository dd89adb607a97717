// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing the persistence ports.
//!
//! Collections:
//! - `users` (one document per user, keyed by user id)
//! - `activities` (one document per activity, keyed by activity id)
//! - `credentials` (password hash per user id)
//!
//! Documents use the snake_case field names of the models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::{collections, CredentialPort, PersistencePort};
use crate::error::AppError;
use crate::models::{Activity, User};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Stored password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Credential {
    password_hash: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Persistence(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::Persistence("Database not connected (offline mode)".to_string())
        })
    }

    /// Read every document of a collection.
    async fn load_all<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))
    }

    /// Upsert every item as its own document, committing in transaction-sized chunks.
    async fn batch_upsert<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        T: Serialize + for<'de> Deserialize<'de> + Sync + Send,
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client.begin_transaction().await.map_err(|e| {
                AppError::Persistence(format!("Failed to begin transaction: {}", e))
            })?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&doc_id)
                    .object(item)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Persistence(format!(
                            "Failed to add write to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Persistence(format!("Failed to commit batch write: {}", e))
            })?;
        }

        tracing::debug!(collection, count = items.len(), "Batch upsert committed");
        Ok(())
    }
}

#[async_trait]
impl PersistencePort for FirestoreDb {
    async fn load_activities(&self) -> Result<Vec<Activity>, AppError> {
        self.load_all(collections::ACTIVITIES).await
    }

    /// Activities are never deleted, so saving the collection upserts every document.
    ///
    /// Chunks commit independently: a failure part way through leaves the
    /// earlier chunks written.
    async fn save_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        self.batch_upsert(activities, collections::ACTIVITIES, |a: &Activity| {
            a.id.clone()
        })
        .await
    }

    /// One document per activity, so only the changed one is written.
    async fn save_activity(
        &self,
        _activities: &[Activity],
        changed: &Activity,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ACTIVITIES)
            .document_id(&changed.id)
            .object(changed)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        tracing::debug!(activity_id = %changed.id, "Activity document written");
        Ok(())
    }

    async fn load_users(&self) -> Result<Vec<User>, AppError> {
        self.load_all(collections::USERS).await
    }

    async fn save_users(&self, users: &[User]) -> Result<(), AppError> {
        self.batch_upsert(users, collections::USERS, |u: &User| u.id.clone())
            .await
    }
}

#[async_trait]
impl CredentialPort for FirestoreDb {
    async fn get_password_hash(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let credential: Option<Credential> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CREDENTIALS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(credential.map(|c| c.password_hash))
    }

    async fn set_password_hash(&self, user_id: &str, hash: &str) -> Result<(), AppError> {
        let credential = Credential {
            password_hash: hash.to_string(),
        };
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .document_id(user_id)
            .object(&credential)
            .execute()
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        Ok(())
    }
}
