use crate::api;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{bail, Result};
use secrecy::ExposeSecret;

/// Handle the server action
///
/// # Errors
///
/// Returns an error if the signing secret is empty or the server fails to
/// start
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    // An unusable secret must stop the process here, before any request can
    // observe it as a per-request failure.
    if globals.secret.expose_secret().is_empty() {
        bail!("Token signing secret must not be empty");
    }

    match action {
        Action::Server { port, dsn } => {
            api::new(port, dsn, globals).await?;
        }
    }

    Ok(())
}
