//! Session holder: who is logged in, per client.
//!
//! There is one hardcoded admin account. Each successful login issues an
//! opaque token that the client presents as `Authorization: Bearer <token>`.
//! Live tokens are kept under `instastore_user` so they survive restarts;
//! logout forgets the presented token only.

pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AdminCredentials;
use crate::error::{AuthError, StorageError};
use crate::store::{KeyValueStore, keys};

pub use routes::{AuthRouteState, auth_routes, bearer_token};

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub is_admin: bool,
}

/// A successful login: the token to present plus who it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub token: String,
    #[serde(flatten)]
    pub identity: Identity,
}

pub struct SessionHolder {
    store: Arc<dyn KeyValueStore>,
    admin: AdminCredentials,
    tokens: RwLock<HashMap<String, Identity>>,
}

impl SessionHolder {
    /// Restore the stored logins, if any. An unreadable entry is dropped.
    pub async fn restore(
        store: Arc<dyn KeyValueStore>,
        admin: AdminCredentials,
    ) -> Result<Self, AuthError> {
        let tokens = match store.get(keys::USER_SESSIONS).await? {
            Some(raw) => match serde_json::from_str::<HashMap<String, Identity>>(&raw) {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!(error = %e, "Failed to parse stored logins, discarding");
                    store.remove(keys::USER_SESSIONS).await?;
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        Ok(Self {
            store,
            admin,
            tokens: RwLock::new(tokens),
        })
    }

    /// The identity a token was issued to.
    pub async fn identity(&self, token: &str) -> Option<Identity> {
        self.tokens.read().await.get(token).cloned()
    }

    pub async fn is_admin(&self, token: &str) -> bool {
        self.tokens
            .read()
            .await
            .get(token)
            .is_some_and(|identity| identity.is_admin)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Login, AuthError> {
        let matches = email == self.admin.email && password == self.admin.password.expose_secret();
        if !matches {
            warn!(email = %email, "Rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let login = Login {
            token: Uuid::new_v4().to_string(),
            identity: Identity {
                email: email.to_string(),
                is_admin: true,
            },
        };

        let mut tokens = self.tokens.write().await;
        let mut updated = tokens.clone();
        updated.insert(login.token.clone(), login.identity.clone());
        self.persist(&updated).await?;
        *tokens = updated;

        info!(email = %email, "Admin logged in");
        Ok(login)
    }

    /// Forget a token. Returns whether it was live.
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        let mut tokens = self.tokens.write().await;
        let Some(identity) = tokens.get(token).cloned() else {
            return Ok(false);
        };

        let mut updated = tokens.clone();
        updated.remove(token);
        self.persist(&updated).await?;
        *tokens = updated;

        info!(email = %identity.email, "Logged out");
        Ok(true)
    }

    async fn persist(&self, tokens: &HashMap<String, Identity>) -> Result<(), StorageError> {
        if tokens.is_empty() {
            self.store.remove(keys::USER_SESSIONS).await?;
            return Ok(());
        }
        let json = serde_json::to_string(tokens)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(keys::USER_SESSIONS, &json).await
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::store::MemoryStore;

    fn admin() -> AdminCredentials {
        AdminCredentials {
            email: "owner@example.com".to_string(),
            password: SecretString::from("s3cret"),
        }
    }

    async fn holder_over(store: Arc<dyn KeyValueStore>) -> SessionHolder {
        SessionHolder::restore(store, admin()).await.unwrap()
    }

    #[tokio::test]
    async fn unknown_token_is_anonymous() {
        let holder = holder_over(Arc::new(MemoryStore::new())).await;
        assert!(holder.identity("nope").await.is_none());
        assert!(!holder.is_admin("nope").await);
        assert!(!holder.is_admin("").await);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let holder = holder_over(Arc::clone(&store)).await;
        let err = holder.login("owner@example.com", "guess").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(store.get(keys::USER_SESSIONS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_rights_belong_to_the_token_only() {
        let holder = holder_over(Arc::new(MemoryStore::new())).await;
        let login = holder.login("owner@example.com", "s3cret").await.unwrap();

        assert!(holder.is_admin(&login.token).await);
        assert!(!holder.is_admin("someone-else").await);
        assert!(holder.identity("someone-else").await.is_none());
    }

    #[tokio::test]
    async fn each_login_gets_its_own_token() {
        let holder = holder_over(Arc::new(MemoryStore::new())).await;
        let first = holder.login("owner@example.com", "s3cret").await.unwrap();
        let second = holder.login("owner@example.com", "s3cret").await.unwrap();
        assert_ne!(first.token, second.token);
        assert_eq!(first.identity, second.identity);
    }

    #[tokio::test]
    async fn login_survives_a_new_holder() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let holder = holder_over(Arc::clone(&store)).await;
        let login = holder.login("owner@example.com", "s3cret").await.unwrap();
        assert!(login.identity.is_admin);

        let restored = holder_over(store).await;
        assert_eq!(restored.identity(&login.token).await, Some(login.identity));
        assert!(restored.is_admin(&login.token).await);
    }

    #[tokio::test]
    async fn logout_forgets_only_that_token() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let holder = holder_over(Arc::clone(&store)).await;
        let kept = holder.login("owner@example.com", "s3cret").await.unwrap();
        let dropped = holder.login("owner@example.com", "s3cret").await.unwrap();

        assert!(holder.logout(&dropped.token).await.unwrap());
        assert!(!holder.logout(&dropped.token).await.unwrap());
        assert!(!holder.is_admin(&dropped.token).await);
        assert!(holder.is_admin(&kept.token).await);

        let restored = holder_over(Arc::clone(&store)).await;
        assert!(restored.is_admin(&kept.token).await);
        assert!(!restored.is_admin(&dropped.token).await);

        assert!(holder.logout(&kept.token).await.unwrap());
        assert!(store.get(keys::USER_SESSIONS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_logins_are_discarded() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(keys::USER_SESSIONS, "{broken").await.unwrap();

        let holder = holder_over(Arc::clone(&store)).await;
        assert!(holder.identity("anything").await.is_none());
        assert!(store.get(keys::USER_SESSIONS).await.unwrap().is_none());
    }
}
