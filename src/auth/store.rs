//! Credential store backed by PostgreSQL.
//!
//! Email uniqueness is enforced by the database's unique index alone:
//! [`create`] never pre-checks existence, so two concurrent signups with the
//! same email produce exactly one `Created` and one `Duplicate`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity row including the password hash.
///
/// Intentionally not serializable; anything leaving the service goes through
/// [`IdentitySummary`].
#[derive(Debug)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl IdentityRecord {
    #[must_use]
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity fields safe to put in a response payload.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentitySummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Outcome when attempting to create a new identity.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(IdentityRecord),
    Duplicate,
}

/// Look up an identity by email, exactly as stored (no normalization).
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<IdentityRecord>> {
    let query = "SELECT id, name, email, password_hash FROM identities WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup identity by email")?;

    Ok(row.map(|row| IdentityRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }))
}

/// Look up the identity summary for a token subject.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<IdentitySummary>> {
    // The hash is not selected at all; this summary feeds responses directly.
    let query = "SELECT id, name, email FROM identities WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup identity by id")?;

    Ok(row.map(|row| IdentitySummary {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }))
}

/// Insert a new identity.
///
/// # Errors
///
/// Returns an error if the insert fails for any reason other than the email
/// unique constraint; that case is the `Duplicate` outcome.
pub async fn create(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<CreateOutcome> {
    let query = r"
        INSERT INTO identities
            (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(CreateOutcome::Created(IdentityRecord {
            id: row.get("id"),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })),
        Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Duplicate),
        Err(err) => Err(err).context("failed to insert identity"),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn summary_carries_no_hash() -> Result<()> {
        let record = IdentityRecord {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
        };

        let value = serde_json::to_value(record.summary())?;
        let keys: Vec<&String> = value
            .as_object()
            .map(|map| map.keys().collect())
            .unwrap_or_default();

        assert_eq!(value.get("email").and_then(serde_json::Value::as_str), Some("alice@example.com"));
        assert!(!keys.iter().any(|key| key.contains("password")));
        assert!(value.get("password_hash").is_none());
        Ok(())
    }

    #[derive(Debug)]
    struct StubDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "stub database error")
        }
    }

    impl StdError for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &'static str {
            "stub database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(StubDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(StubDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
