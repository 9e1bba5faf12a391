use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

/// Turn parsed matches into the action to run plus the process globals.
///
/// # Errors
///
/// Returns an error if a required argument is missing from the matches.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
    };

    let secret = matches
        .get_one("secret")
        .map(|s: &String| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --secret"))?;

    let frontend_url = matches
        .get_one("frontend-url")
        .map_or_else(|| "http://localhost:3000".to_string(), |s: &String| s.to_string());

    Ok((action, GlobalArgs::new(secret, frontend_url)))
}
