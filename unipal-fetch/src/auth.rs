//! Interactive SSO auth controller.
//!
//! The browsing surface is a single shared resource, so login requests
//! are serialized: callers enqueue a credential and await their own
//! result while a single worker drains the queue in FIFO order. One
//! failed or timed-out login never takes the queue down; the next
//! request proceeds with a freshly wiped surface.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::cookie::CookieSet;
use crate::credential::Credential;
use crate::error::FetchError;
use crate::surface::{login_script, BrowsingSurface, SurfaceMessage, SurfaceRequest};

/// Deadline for one interactive login, entry to verdict.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

type AuthResult = Result<CookieSet, FetchError>;

struct QueueItem {
    credential: Credential,
    responder: oneshot::Sender<AuthResult>,
}

/// Serializes interactive SSO logins over one [`BrowsingSurface`].
pub struct AuthController {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl AuthController {
    /// Spawns the queue worker. The worker exits when the controller is
    /// dropped and the queue drains.
    pub fn new(surface: Arc<dyn BrowsingSurface>, login_form_url: impl Into<String>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueueItem>();
        let login_form_url = login_form_url.into();
        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                let result = run_login(surface.as_ref(), &login_form_url, item.credential).await;
                // Receiver may have given up; nothing to do then.
                let _ = item.responder.send(result);
            }
        });
        Self { tx }
    }

    /// Enqueues one login and awaits its outcome. Requests are processed
    /// strictly in arrival order, one at a time.
    pub async fn authenticate(&self, credential: Credential) -> AuthResult {
        let (responder, rx) = oneshot::channel();
        self.tx
            .send(QueueItem {
                credential,
                responder,
            })
            .map_err(|_| FetchError::AuthProcess)?;
        rx.await.map_err(|_| FetchError::AuthProcess)?
    }
}

/// Drives one login attempt. The surface's cookie stores are wiped after
/// every attempt, exactly once, regardless of outcome.
#[instrument(skip_all, fields(user_id = %credential.user_id, entry_url = %credential.entry_url))]
async fn run_login(
    surface: &dyn BrowsingSurface,
    login_form_url: &str,
    credential: Credential,
) -> AuthResult {
    let request = SurfaceRequest {
        entry_url: credential.entry_url.clone(),
        injected_script: login_script(&credential, login_form_url),
    };

    let outcome = match timeout(AUTH_TIMEOUT, surface.drive(request)).await {
        Err(_) => {
            warn!("Interactive login timed out");
            Err(FetchError::Timeout)
        }
        Ok(Err(e)) => Err(FetchError::Surface(e)),
        Ok(Ok(SurfaceMessage::Unauthorized)) => Err(FetchError::Unauthorized),
        Ok(Ok(SurfaceMessage::Success)) => {
            match surface.cookies_for(&credential.goal_url).await {
                Ok(cookies) if cookies.is_empty() => {
                    warn!("Login succeeded but no cookies were collected");
                    Err(FetchError::AuthProcess)
                }
                Ok(cookies) => {
                    debug!(count = cookies.len(), "Collected session cookies");
                    Ok(cookies)
                }
                Err(e) => Err(FetchError::Surface(e)),
            }
        }
    };

    if let Err(e) = surface.clear_cookies().await {
        warn!(error = %e, "Failed to wipe surface cookies");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted surface: the verdict is keyed by user ID, and overlapping
    /// `drive` calls are detected.
    struct MockSurface {
        drives: AtomicU32,
        teardowns: AtomicU32,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
        order: Mutex<Vec<String>>,
        hang: bool,
    }

    impl MockSurface {
        fn new() -> Self {
            Self {
                drives: AtomicU32::new(0),
                teardowns: AtomicU32::new(0),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
                order: Mutex::new(Vec::new()),
                hang: false,
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl BrowsingSurface for MockSurface {
        async fn drive(&self, request: SurfaceRequest) -> Result<SurfaceMessage, SurfaceError> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            self.drives.fetch_add(1, Ordering::SeqCst);

            if self.hang {
                self.in_flight.store(false, Ordering::SeqCst);
                futures::future::pending::<()>().await;
            }

            // Yield so an overlapping call would be observable.
            tokio::time::sleep(Duration::from_millis(5)).await;

            let user = request
                .injected_script
                .split('\'')
                .find(|s| s.starts_with("user-"))
                .unwrap_or("")
                .to_string();
            self.order.lock().unwrap().push(user.clone());
            self.in_flight.store(false, Ordering::SeqCst);

            if user == "user-bad" {
                Ok(SurfaceMessage::Unauthorized)
            } else {
                Ok(SurfaceMessage::Success)
            }
        }

        async fn cookies_for(&self, _url: &str) -> Result<CookieSet, SurfaceError> {
            let mut set = CookieSet::new();
            set.insert("sid", "ok");
            Ok(set)
        }

        async fn clear_cookies(&self) -> Result<(), SurfaceError> {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn credential(user_id: &str) -> Credential {
        Credential {
            entry_url: "https://portal.example.test/api/saml/login".into(),
            goal_url: "https://portal.example.test/dashboard".into(),
            user_id: user_id.into(),
            password: "pw".into(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_logins_run_sequentially_with_independent_outcomes() {
        let surface = Arc::new(MockSurface::new());
        let controller = Arc::new(AuthController::new(
            surface.clone(),
            "https://idp.example.test/login",
        ));

        let mut handles = Vec::new();
        for user in ["user-a", "user-bad", "user-c"] {
            let controller = controller.clone();
            let cred = credential(user);
            handles.push(tokio::spawn(
                async move { controller.authenticate(cred).await },
            ));
        }
        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }

        assert_eq!(surface.drives.load(Ordering::SeqCst), 3);
        assert!(!surface.overlapped.load(Ordering::SeqCst));
        // One teardown per attempt, failures included.
        assert_eq!(surface.teardowns.load(Ordering::SeqCst), 3);

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(FetchError::Unauthorized)));
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_requests_are_processed_in_arrival_order() {
        let surface = Arc::new(MockSurface::new());
        let controller = Arc::new(AuthController::new(
            surface.clone(),
            "https://idp.example.test/login",
        ));

        // Enqueue sequentially so arrival order is deterministic, then
        // await out of order.
        let mut handles = Vec::new();
        for user in ["user-1", "user-2", "user-3"] {
            let controller = controller.clone();
            let cred = credential(user);
            handles.push(tokio::spawn(
                async move { controller.authenticate(cred).await },
            ));
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        for h in handles.into_iter().rev() {
            h.await.unwrap().unwrap();
        }

        let order = surface.order.lock().unwrap().clone();
        assert_eq!(order, vec!["user-1", "user-2", "user-3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_login_times_out_and_queue_continues() {
        let surface = Arc::new(MockSurface::hanging());
        let controller = AuthController::new(surface.clone(), "https://idp.example.test/login");

        let result = controller.authenticate(credential("user-a")).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
        // Teardown still ran for the timed-out attempt.
        assert_eq!(surface.teardowns.load(Ordering::SeqCst), 1);

        let result = controller.authenticate(credential("user-b")).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
        assert_eq!(surface.teardowns.load(Ordering::SeqCst), 2);
    }
}
