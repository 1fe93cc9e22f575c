//! Credentials and sign-in state.

use std::sync::Arc;

use tracing::{info, instrument};

use unipal_core::{AuthState, AuthStateBus};
use unipal_providers::{HubApiClient, IdTokenProvider, PortalSession};
use unipal_store::SecureCredentialStore;

use crate::error::SyncError;

/// Owns the stored credential pair and the observable sign-in state.
pub struct AuthRepository {
    secure_store: SecureCredentialStore,
    tokens: Arc<dyn IdTokenProvider>,
    hub_api: Arc<HubApiClient>,
    manabo_session: Arc<PortalSession>,
    auth_bus: AuthStateBus,
}

impl AuthRepository {
    /// Creates the repository. The LMS session is used to verify
    /// credentials before they are persisted.
    pub fn new(
        secure_store: SecureCredentialStore,
        tokens: Arc<dyn IdTokenProvider>,
        hub_api: Arc<HubApiClient>,
        manabo_session: Arc<PortalSession>,
        auth_bus: AuthStateBus,
    ) -> Self {
        Self {
            secure_store,
            tokens,
            hub_api,
            manabo_session,
            auth_bus,
        }
    }

    /// The sign-in state bus.
    pub fn auth_bus(&self) -> &AuthStateBus {
        &self.auth_bus
    }

    /// True when both halves of the credential pair are stored.
    pub async fn is_signed_in(&self) -> Result<bool, SyncError> {
        Ok(self.secure_store.student_id().await?.is_some()
            && self.secure_store.password().await?.is_some())
    }

    /// The stored credential pair, or [`SyncError::ShouldReSignIn`].
    pub async fn credentials(&self) -> Result<(String, String), SyncError> {
        match (
            self.secure_store.student_id().await?,
            self.secure_store.password().await?,
        ) {
            (Some(student_id), Some(password)) => Ok((student_id, password)),
            _ => Err(SyncError::ShouldReSignIn),
        }
    }

    /// A fresh backend bearer token.
    pub async fn id_token(&self) -> Result<String, SyncError> {
        // An unusable federated identity means the whole sign-in is gone.
        self.tokens
            .id_token()
            .await
            .map_err(|_| SyncError::ShouldReSignIn)
    }

    /// Verifies the pair against the SSO, persists it, registers the
    /// backend session, and announces the sign-in.
    #[instrument(skip_all)]
    pub async fn save_credentials(&self, student_id: &str, password: &str) -> Result<(), SyncError> {
        self.manabo_session.auth_test(student_id, password).await?;
        self.secure_store.save(student_id, password).await?;

        let token = self.id_token().await?;
        self.hub_api.login(&token).await?;

        info!("Signed in");
        self.auth_bus.notify(AuthState::SignedIn);
        Ok(())
    }

    /// Removes the stored pair and announces the sign-out.
    pub async fn clear_credentials(&self) -> Result<(), SyncError> {
        self.secure_store.clear().await?;
        self.auth_bus.notify(AuthState::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use unipal_fetch::{
        AuthController, BrowsingSurface, CookieSet, FetchError, HttpRequest, HttpResponse,
        SurfaceError, SurfaceMessage, SurfaceRequest, Transport,
    };
    use unipal_providers::PortalEndpoints;
    use unipal_store::MemoryCredentialStorage;

    struct OkSurface {
        drives: AtomicU32,
    }

    #[async_trait]
    impl BrowsingSurface for OkSurface {
        async fn drive(&self, _request: SurfaceRequest) -> Result<SurfaceMessage, SurfaceError> {
            self.drives.fetch_add(1, Ordering::SeqCst);
            Ok(SurfaceMessage::Success)
        }

        async fn cookies_for(&self, _url: &str) -> Result<CookieSet, SurfaceError> {
            let mut set = CookieSet::new();
            set.insert("sid", "s");
            Ok(set)
        }

        async fn clear_cookies(&self) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    struct OkTransport;

    #[async_trait]
    impl Transport for OkTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
            Ok(HttpResponse {
                final_url: request.url,
                status: 200,
                body: "{}".into(),
            })
        }
    }

    struct StaticTokens;

    #[async_trait]
    impl IdTokenProvider for StaticTokens {
        async fn id_token(&self) -> Result<String, FetchError> {
            Ok("tok".into())
        }
    }

    fn repository() -> (AuthRepository, Arc<OkSurface>) {
        let surface = Arc::new(OkSurface {
            drives: AtomicU32::new(0),
        });
        let auth = Arc::new(AuthController::new(
            surface.clone(),
            "https://idp.example.test/login",
        ));
        let session = Arc::new(PortalSession::new(
            PortalEndpoints {
                base_url: "https://lms.example.test".into(),
                auth_enter_path: "/auth/sso/".into(),
                auth_goal_path: "/auth/sso/".into(),
            },
            chrono::Duration::minutes(25),
            auth,
            Arc::new(OkTransport),
        ));
        let repo = AuthRepository::new(
            SecureCredentialStore::new(Arc::new(MemoryCredentialStorage::default())),
            Arc::new(StaticTokens),
            Arc::new(HubApiClient::new(
                "https://api.example.test",
                Arc::new(OkTransport),
            )),
            session,
            AuthStateBus::new(),
        );
        (repo, surface)
    }

    #[tokio::test]
    async fn test_missing_credentials_require_sign_in() {
        let (repo, _) = repository();
        assert!(!repo.is_signed_in().await.unwrap());
        assert!(matches!(
            repo.credentials().await,
            Err(SyncError::ShouldReSignIn)
        ));
    }

    #[tokio::test]
    async fn test_save_verifies_persists_and_notifies() {
        let (repo, surface) = repository();
        let mut state = repo.auth_bus().subscribe();

        repo.save_credentials("t123456", "pw").await.unwrap();

        assert_eq!(surface.drives.load(Ordering::SeqCst), 1);
        assert!(repo.is_signed_in().await.unwrap());
        assert_eq!(
            repo.credentials().await.unwrap(),
            ("t123456".to_string(), "pw".to_string())
        );
        state.changed().await.unwrap();
        assert_eq!(*state.borrow(), AuthState::SignedIn);

        repo.clear_credentials().await.unwrap();
        assert!(!repo.is_signed_in().await.unwrap());
        assert_eq!(*repo.auth_bus().subscribe().borrow(), AuthState::SignedOut);
    }
}
