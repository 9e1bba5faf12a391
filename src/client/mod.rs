//! Client-side building blocks: a persisted session, a guard that decides
//! whether a protected view may render, and an HTTP client for the API.

pub mod guard;
pub mod http;
pub mod session;

pub use guard::{GuardState, SessionGuard, VerifyEndpoint};
pub use http::{ApiClient, AuthOutcome};
pub use session::{MemorySessionStore, SessionStore, StoredSession};
