//! Public holiday catalog with token-authenticated administration.
//!
//! The server exposes a small JSON API: signup and login against a Postgres
//! credential store, HS256 bearer tokens with a 24 hour lifetime, a token
//! verification endpoint and CRUD for the holiday catalog. Mutating holiday
//! routes sit behind a bearer-presence gate.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
