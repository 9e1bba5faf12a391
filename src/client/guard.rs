use crate::auth::store::IdentitySummary;
use crate::client::session::{SessionStore, StoredSession};
use tracing::debug;

/// Outcome of asking the guard whether a protected view may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// No check has run yet.
    Unknown,
    /// A verification round-trip is in flight.
    Checking,
    /// The stored token was confirmed by the server.
    Authenticated(IdentitySummary),
    /// No usable session; the caller should send the user to the login view.
    Unauthenticated,
}

/// Server-side confirmation that a token is still good.
pub trait VerifyEndpoint {
    /// Ask the server who the token belongs to.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = anyhow::Result<IdentitySummary>> + Send;
}

/// Decides access to protected views from the stored session, confirming the
/// token with the server rather than trusting the store alone.
pub struct SessionGuard<S, V> {
    store: S,
    verifier: V,
    state: GuardState,
}

impl<S: SessionStore, V: VerifyEndpoint> SessionGuard<S, V> {
    pub fn new(store: S, verifier: V) -> Self {
        Self {
            store,
            verifier,
            state: GuardState::Unknown,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Record a fresh login.
    pub fn establish(&mut self, session: StoredSession) {
        let identity = session.identity.clone();
        self.store.write(session);
        self.state = GuardState::Authenticated(identity);
    }

    /// Run on entry to a protected view. A missing session short-circuits to
    /// [`GuardState::Unauthenticated`]; a stored token is confirmed with the
    /// server and the session is dropped if the server rejects it.
    pub async fn enter(&mut self) -> &GuardState {
        let Some(session) = self.store.read() else {
            self.state = GuardState::Unauthenticated;
            return &self.state;
        };

        self.state = GuardState::Checking;

        match self.verifier.verify(&session.token).await {
            Ok(identity) => {
                self.state = GuardState::Authenticated(identity);
            }
            Err(err) => {
                debug!("session rejected: {}", err);
                self.store.clear();
                self.state = GuardState::Unauthenticated;
            }
        }

        &self.state
    }

    /// Drop the session and fall back to the unauthenticated state.
    pub fn logout(&mut self) {
        self.store.clear();
        self.state = GuardState::Unauthenticated;
    }
}
