use secrecy::SecretString;

/// Process-wide settings that are not part of a single action.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    /// Token signing secret; absence or emptiness is a fatal startup error.
    pub secret: SecretString,
    /// Origin allowed by CORS.
    pub frontend_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret: SecretString, frontend_url: String) -> Self {
        Self {
            secret,
            frontend_url,
        }
    }
}
