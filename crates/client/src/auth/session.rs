//! Session store
//!
//! Holds the current user identity and bearer token, persists them through a
//! [`CredentialStore`], and drives the login / logout / refresh lifecycle.
//! Exactly one session is active at a time.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use td_core::auth::{LoginData, LoginPayload, RegisterData, User};

use crate::auth::api::AuthApi;
use crate::error::ClientError;
use crate::storage::{CredentialStore, StoredCredentials};
use crate::Result;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, before the persisted session has been restored
    Loading,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    user: Option<User>,
    access_token: Option<String>,
}

/// Authentication state container
pub struct SessionStore {
    api: AuthApi,
    storage: Arc<dyn CredentialStore>,
    inner: RwLock<SessionInner>,
}

impl SessionStore {
    pub fn new(api: AuthApi, storage: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            storage,
            inner: RwLock::new(SessionInner {
                state: SessionState::Loading,
                user: None,
                access_token: None,
            }),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    /// Current bearer token; the task store reads this on every call
    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    /// Restore a persisted session on startup
    ///
    /// Both the access token and the user profile must be present to
    /// transition to `Authenticated`; the token is not re-validated against
    /// the backend, so a stale token surfaces on the next API call.
    pub async fn restore(&self) -> SessionState {
        let stored = match self.storage.load().await {
            Ok(stored) => stored,
            Err(err) => {
                warn!("Failed to load stored session: {}", err);
                StoredCredentials::default()
            }
        };

        let mut inner = self.inner.write().await;
        match (stored.access_token, stored.user) {
            (Some(token), Some(user)) => {
                info!("Restored session for {}", user.email);
                inner.state = SessionState::Authenticated;
                inner.access_token = Some(token);
                inner.user = Some(user);
            }
            _ => {
                inner.state = SessionState::Unauthenticated;
                inner.access_token = None;
                inner.user = None;
            }
        }
        inner.state
    }

    /// `login`: authenticate and persist the session
    ///
    /// On failure the state stays `Unauthenticated` and nothing is persisted.
    pub async fn login(&self, data: &LoginData) -> Result<User> {
        let payload = self.api.login(data).await?;
        self.establish(payload).await
    }

    /// `register`: same contract as login via the registration endpoint
    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        let payload = self.api.register(data).await?;
        self.establish(payload).await
    }

    async fn establish(&self, payload: LoginPayload) -> Result<User> {
        let credentials = StoredCredentials {
            access_token: Some(payload.access_token.clone()),
            refresh_token: Some(payload.refresh_token.clone()),
            device_id: Some(payload.device_id.clone().unwrap_or_default()),
            user: Some(payload.user.clone()),
        };
        self.storage.save(&credentials).await?;

        let mut inner = self.inner.write().await;
        inner.state = SessionState::Authenticated;
        inner.access_token = Some(payload.access_token);
        inner.user = Some(payload.user.clone());
        info!("Session established for {}", payload.user.email);
        Ok(payload.user)
    }

    /// End the session
    ///
    /// The backend invalidation call is best-effort; local state and durable
    /// storage are always cleared.
    pub async fn logout(&self) {
        let token = self.access_token().await;
        if let Some(token) = token {
            if let Err(err) = self.api.logout(&token).await {
                warn!("Logout request failed: {}", err);
            }
        }

        if let Err(err) = self.storage.clear().await {
            warn!("Failed to clear stored session: {}", err);
        }

        let mut inner = self.inner.write().await;
        inner.state = SessionState::Unauthenticated;
        inner.access_token = None;
        inner.user = None;
        info!("Session cleared");
    }

    /// Rotate the token pair using the stored refresh token
    ///
    /// Refresh failure is session-ending: any error forces a logout and is
    /// then re-thrown.
    pub async fn refresh_token(&self) -> Result<()> {
        let result = self.try_refresh().await;
        if let Err(err) = &result {
            warn!("Token refresh failed: {}", err);
            self.logout().await;
        }
        result
    }

    async fn try_refresh(&self) -> Result<()> {
        let stored = self.storage.load().await?;
        let refresh_token = stored
            .refresh_token
            .clone()
            .ok_or(ClientError::MissingRefreshToken)?;
        let device_id = stored.device_id.clone().unwrap_or_default();

        let payload = self.api.refresh(&refresh_token, &device_id).await?;

        let credentials = StoredCredentials {
            access_token: Some(payload.access_token.clone()),
            refresh_token: Some(payload.refresh_token),
            ..stored
        };
        self.storage.save(&credentials).await?;

        self.inner.write().await.access_token = Some(payload.access_token);
        info!("Access token refreshed");
        Ok(())
    }

    /// Re-fetch the user profile from the backend
    pub async fn fetch_profile(&self) -> Result<User> {
        let token = self
            .access_token()
            .await
            .ok_or(ClientError::MissingAccessToken)?;
        let user = self.api.profile(&token).await?;

        let mut stored = self.storage.load().await?;
        stored.user = Some(user.clone());
        self.storage.save(&stored).await?;

        self.inner.write().await.user = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClient;
    use crate::storage::MemoryCredentialStore;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_response() -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "accessToken": "at-1",
                "refreshToken": "rt-1",
                "deviceId": "dev-1",
                "user": {
                    "id": "u-1",
                    "email": "a@b.c",
                    "first_name": "Ada",
                    "last_name": null
                }
            }
        })
    }

    fn store_with(server: &MockServer) -> (SessionStore, Arc<MemoryCredentialStore>) {
        let storage = Arc::new(MemoryCredentialStore::default());
        let api = AuthApi::new(ApiClient::new(server.uri()));
        (SessionStore::new(api, storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let server = MockServer::start().await;
        let (session, _) = store_with(&server);
        assert_eq!(session.state().await, SessionState::Loading);
    }

    #[tokio::test]
    async fn test_login_persists_and_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        let user = session
            .login(&LoginData::new("a@b.c", "pw"))
            .await
            .unwrap();

        assert_eq!(user.id, "u-1");
        assert_eq!(session.state().await, SessionState::Authenticated);
        assert_eq!(session.access_token().await.as_deref(), Some("at-1"));

        let stored = storage.load().await.unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("at-1"));
        assert_eq!(stored.refresh_token.as_deref(), Some("rt-1"));
        assert_eq!(stored.device_id.as_deref(), Some("dev-1"));
        assert_eq!(stored.user.unwrap().email, "a@b.c");
    }

    #[tokio::test]
    async fn test_failed_login_persists_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        session.restore().await;

        let err = session
            .login(&LoginData::new("a@b.c", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_persisted_session() {
        let server = MockServer::start().await;
        let (session, storage) = store_with(&server);

        storage
            .save(&StoredCredentials {
                access_token: Some("at-old".into()),
                refresh_token: Some("rt-old".into()),
                device_id: Some("dev-1".into()),
                user: Some(User {
                    id: "u-1".into(),
                    email: "a@b.c".into(),
                    first_name: None,
                    last_name: None,
                    is_active: None,
                    created_at: None,
                    updated_at: None,
                }),
            })
            .await
            .unwrap();

        // No backend call is made; a stale token is accepted until it fails
        assert_eq!(session.restore().await, SessionState::Authenticated);
        assert_eq!(session.access_token().await.as_deref(), Some("at-old"));
    }

    #[tokio::test]
    async fn test_restore_without_user_is_unauthenticated() {
        let server = MockServer::start().await;
        let (session, storage) = store_with(&server);

        storage
            .save(&StoredCredentials {
                access_token: Some("at-old".into()),
                ..StoredCredentials::default()
            })
            .await
            .unwrap();

        assert_eq!(session.restore().await, SessionState::Unauthenticated);
        assert!(session.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        session.login(&LoginData::new("a@b.c", "pw")).await.unwrap();

        session.logout().await;
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert!(session.access_token().await.is_none());
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rotates_token_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(header("X-Device-ID", "dev-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "at-2",
                "refreshToken": "rt-2"
            })))
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        session.login(&LoginData::new("a@b.c", "pw")).await.unwrap();

        session.refresh_token().await.unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("at-2"));

        let stored = storage.load().await.unwrap();
        assert_eq!(stored.access_token.as_deref(), Some("at-2"));
        assert_eq!(stored.refresh_token.as_deref(), Some("rt-2"));
        // The user profile survives the rotation
        assert!(stored.user.is_some());
    }

    #[tokio::test]
    async fn test_refresh_without_stored_token_forces_logout() {
        let server = MockServer::start().await;
        let (session, storage) = store_with(&server);
        session.restore().await;

        let err = session.refresh_token().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingRefreshToken));
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejection_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Refresh expired" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        session.login(&LoginData::new("a@b.c", "pw")).await.unwrap();

        let err = session.refresh_token().await.unwrap_err();
        assert_eq!(err.to_string(), "Refresh expired");
        assert_eq!(session.state().await, SessionState::Unauthenticated);
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_profile_updates_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_response()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "user": {
                        "id": "u-1",
                        "email": "a@b.c",
                        "first_name": "Ada",
                        "last_name": "Lovelace"
                    }
                }
            })))
            .mount(&server)
            .await;

        let (session, storage) = store_with(&server);
        session.login(&LoginData::new("a@b.c", "pw")).await.unwrap();

        let user = session.fetch_profile().await.unwrap();
        assert_eq!(user.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(
            session.user().await.unwrap().last_name.as_deref(),
            Some("Lovelace")
        );
        assert_eq!(
            storage
                .load()
                .await
                .unwrap()
                .user
                .unwrap()
                .last_name
                .as_deref(),
            Some("Lovelace")
        );
    }

    #[tokio::test]
    async fn test_fetch_profile_requires_token() {
        let server = MockServer::start().await;
        let (session, _) = store_with(&server);
        session.restore().await;

        let err = session.fetch_profile().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingAccessToken));
    }
}
