//! Observable sign-in state.
//!
//! The login flow and the UI both need to know whether the user is signed in,
//! but they live at opposite ends of the dependency graph. `AuthStateBus` is
//! an explicit subscribe/notify object passed by reference to both sides —
//! no hidden global callback registry.

use tokio::sync::watch;

/// Current sign-in state of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No stored credentials.
    SignedOut,
    /// Credentials stored and verified.
    SignedIn,
    /// Stored credentials exist but were rejected; a full re-login is needed.
    NeedsReSignIn,
}

/// Broadcast bus for [`AuthState`] changes.
///
/// Cloning the bus shares the underlying channel; every receiver obtained via
/// [`subscribe`](AuthStateBus::subscribe) observes the latest state.
#[derive(Debug, Clone)]
pub struct AuthStateBus {
    tx: watch::Sender<AuthState>,
}

impl AuthStateBus {
    /// Creates a bus starting in [`AuthState::SignedOut`].
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::SignedOut);
        Self { tx }
    }

    /// Publishes a new state to all subscribers.
    pub fn notify(&self, state: AuthState) {
        // send_replace stores the state even when no receiver exists yet.
        let _ = self.tx.send_replace(state);
    }

    /// Returns a receiver that observes state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    /// Returns the current state.
    pub fn current(&self) -> AuthState {
        *self.tx.borrow()
    }
}

impl Default for AuthStateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let bus = AuthStateBus::new();
        let mut rx = bus.subscribe();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);

        bus.notify(AuthState::SignedIn);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedIn);
    }

    #[test]
    fn test_current_without_subscribers() {
        let bus = AuthStateBus::new();
        bus.notify(AuthState::NeedsReSignIn);
        assert_eq!(bus.current(), AuthState::NeedsReSignIn);
    }
}
