//! Holiday resource: the protected collaborator behind the access gate.
//!
//! Reads are public; mutations reach these handlers only after the gate has
//! seen a bearer header.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;
use tracing::{error, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::store::is_unique_violation;

const MAX_DESCRIPTION_CHARS: usize = 200;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayKind {
    National,
    Festival,
    Optional,
    Religious,
    Regional,
}

impl HolidayKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::National => "National",
            Self::Festival => "Festival",
            Self::Optional => "Optional",
            Self::Religious => "Religious",
            Self::Regional => "Regional",
        }
    }
}

impl FromStr for HolidayKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "National" => Ok(Self::National),
            "Festival" => Ok(Self::Festival),
            "Optional" => Ok(Self::Optional),
            "Religious" => Ok(Self::Religious),
            "Regional" => Ok(Self::Regional),
            other => Err(format!("{other} is not a valid holiday type.")),
        }
    }
}

#[derive(ToSchema, Serialize, Debug)]
pub struct Holiday {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub region: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct HolidayPayload {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
}

/// Fields for a full insert.
#[derive(Debug, PartialEq, Eq)]
struct NewHoliday {
    title: String,
    date: NaiveDate,
    kind: HolidayKind,
    region: String,
    description: Option<String>,
}

/// Fields for a partial update; absent fields keep their stored value.
#[derive(Debug, Default, PartialEq, Eq)]
struct HolidayPatch {
    title: Option<String>,
    date: Option<NaiveDate>,
    kind: Option<HolidayKind>,
    region: Option<String>,
    description: Option<String>,
}

fn validate_title(title: &str) -> Result<String, String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Holiday title is required.".to_string());
    }
    Ok(trimmed.to_string())
}

fn validate_description(description: Option<String>) -> Result<Option<String>, String> {
    match description {
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
                return Err("Description must not exceed 200 characters.".to_string());
            }
            Ok(Some(trimmed.to_string()).filter(|text| !text.is_empty()))
        }
        None => Ok(None),
    }
}

fn validate_create(payload: HolidayPayload) -> Result<NewHoliday, String> {
    let title = match payload.title {
        Some(title) => validate_title(&title)?,
        None => return Err("Holiday title is required.".to_string()),
    };
    let date = payload.date.ok_or_else(|| "Holiday date is required.".to_string())?;
    let kind = match payload.kind {
        Some(kind) => HolidayKind::from_str(&kind)?,
        None => return Err("Holiday type is required.".to_string()),
    };
    let region = payload
        .region
        .map(|region| region.trim().to_string())
        .filter(|region| !region.is_empty())
        .unwrap_or_else(|| "All".to_string());
    let description = validate_description(payload.description)?;

    Ok(NewHoliday {
        title,
        date,
        kind,
        region,
        description,
    })
}

fn validate_patch(payload: HolidayPayload) -> Result<HolidayPatch, String> {
    let title = payload.title.map(|title| validate_title(&title)).transpose()?;
    let kind = payload
        .kind
        .map(|kind| HolidayKind::from_str(&kind))
        .transpose()?;
    let region = payload
        .region
        .map(|region| region.trim().to_string())
        .filter(|region| !region.is_empty());
    let description = validate_description(payload.description)?;

    Ok(HolidayPatch {
        title,
        date: payload.date,
        kind,
        region,
        description,
    })
}

fn row_to_holiday(row: &PgRow) -> Result<Holiday, String> {
    let kind: String = row.get("kind");
    // The CHECK constraint keeps this parse from failing on real rows.
    let kind = HolidayKind::from_str(&kind)?;
    Ok(Holiday {
        id: row.get("id"),
        title: row.get("title"),
        date: row.get("date"),
        kind,
        region: row.get("region"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const HOLIDAY_COLUMNS: &str = "id, title, date, kind, region, description, created_at, updated_at";

#[utoipa::path(
    get,
    path = "/api/holiday",
    responses(
        (status = 200, description = "All holidays ordered by date", body = [Holiday], content_type = "application/json"),
        (status = 500, description = "Storage failure"),
    ),
    tag = "holiday"
)]
#[instrument(skip_all)]
pub async fn list(Extension(pool): Extension<PgPool>) -> Response {
    let query = format!("SELECT {HOLIDAY_COLUMNS} FROM holidays ORDER BY date ASC");
    match sqlx::query(&query).fetch_all(&pool).await {
        Ok(rows) => {
            let holidays: Result<Vec<Holiday>, String> = rows.iter().map(row_to_holiday).collect();
            match holidays {
                Ok(holidays) => (StatusCode::OK, Json(holidays)).into_response(),
                Err(err) => {
                    error!("Failed to decode holiday row: {err}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to fetch holidays".to_string(),
                    )
                        .into_response()
                }
            }
        }
        Err(err) => {
            error!("Failed to fetch holidays: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch holidays".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/holiday",
    request_body = HolidayPayload,
    responses(
        (status = 201, description = "Holiday created", body = Holiday, content_type = "application/json"),
        (status = 400, description = "Validation failure or duplicate (title, date)"),
        (status = 401, description = "Missing bearer header (rejected by the gate)"),
    ),
    security(("bearer" = [])),
    tag = "holiday"
)]
#[instrument(skip(pool, payload))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    payload: Option<Json<HolidayPayload>>,
) -> Response {
    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            "Failed to create holiday".to_string(),
        )
            .into_response();
    };

    let holiday = match validate_create(payload) {
        Ok(holiday) => holiday,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let query = format!(
        r"
        INSERT INTO holidays
            (title, date, kind, region, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {HOLIDAY_COLUMNS}
    "
    );
    let row = sqlx::query(&query)
        .bind(&holiday.title)
        .bind(holiday.date)
        .bind(holiday.kind.as_str())
        .bind(&holiday.region)
        .bind(&holiday.description)
        .fetch_one(&pool)
        .await;

    match row {
        Ok(row) => match row_to_holiday(&row) {
            Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
            Err(err) => {
                error!("Failed to decode created holiday: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create holiday".to_string(),
                )
                    .into_response()
            }
        },
        Err(err) if is_unique_violation(&err) => (
            StatusCode::BAD_REQUEST,
            "Holiday already exists for that date.".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create holiday: {err}");
            (
                StatusCode::BAD_REQUEST,
                "Failed to create holiday".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/holiday/{id}",
    request_body = HolidayPayload,
    responses(
        (status = 200, description = "Holiday updated", body = Holiday, content_type = "application/json"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Missing bearer header (rejected by the gate)"),
        (status = 404, description = "No holiday with that id"),
    ),
    security(("bearer" = [])),
    tag = "holiday"
)]
#[instrument(skip(pool, payload))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Path(id): Path<Uuid>,
    payload: Option<Json<HolidayPayload>>,
) -> Response {
    let patch = match validate_patch(payload.map_or_else(HolidayPayload::default, |Json(p)| p)) {
        Ok(patch) => patch,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let query = format!(
        r"
        UPDATE holidays SET
            title = COALESCE($2, title),
            date = COALESCE($3, date),
            kind = COALESCE($4, kind),
            region = COALESCE($5, region),
            description = COALESCE($6, description),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {HOLIDAY_COLUMNS}
    "
    );
    let row = sqlx::query(&query)
        .bind(id)
        .bind(&patch.title)
        .bind(patch.date)
        .bind(patch.kind.map(HolidayKind::as_str))
        .bind(&patch.region)
        .bind(&patch.description)
        .fetch_optional(&pool)
        .await;

    match row {
        Ok(Some(row)) => match row_to_holiday(&row) {
            Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
            Err(err) => {
                error!("Failed to decode updated holiday: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to update holiday".to_string(),
                )
                    .into_response()
            }
        },
        Ok(None) => (StatusCode::NOT_FOUND, "Holiday not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update holiday: {err}");
            (
                StatusCode::BAD_REQUEST,
                "Failed to update holiday".to_string(),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/holiday/{id}",
    responses(
        (status = 200, description = "Holiday deleted"),
        (status = 401, description = "Missing bearer header (rejected by the gate)"),
        (status = 404, description = "No holiday with that id"),
    ),
    security(("bearer" = [])),
    tag = "holiday"
)]
#[instrument(skip(pool))]
pub async fn remove(Extension(pool): Extension<PgPool>, Path(id): Path<Uuid>) -> Response {
    let result = sqlx::query("DELETE FROM holidays WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(&pool)
        .await;

    match result {
        Ok(Some(_)) => (
            StatusCode::OK,
            "Holiday deleted successfully".to_string(),
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Holiday not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete holiday: {err}");
            (
                StatusCode::BAD_REQUEST,
                "Failed to delete holiday".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(
        title: Option<&str>,
        date: Option<&str>,
        kind: Option<&str>,
    ) -> HolidayPayload {
        HolidayPayload {
            title: title.map(str::to_string),
            date: date.and_then(|d| d.parse().ok()),
            kind: kind.map(str::to_string),
            region: None,
            description: None,
        }
    }

    #[test]
    fn create_requires_title_date_and_type() {
        assert_eq!(
            validate_create(payload(None, Some("2026-01-01"), Some("National"))),
            Err("Holiday title is required.".to_string())
        );
        assert_eq!(
            validate_create(payload(Some("New Year"), None, Some("National"))),
            Err("Holiday date is required.".to_string())
        );
        assert_eq!(
            validate_create(payload(Some("New Year"), Some("2026-01-01"), None)),
            Err("Holiday type is required.".to_string())
        );
    }

    #[test]
    fn create_trims_title_and_defaults_region() -> Result<(), String> {
        let holiday =
            validate_create(payload(Some("  New Year  "), Some("2026-01-01"), Some("National")))?;
        assert_eq!(holiday.title, "New Year");
        assert_eq!(holiday.region, "All");
        assert_eq!(holiday.kind, HolidayKind::National);
        Ok(())
    }

    #[test]
    fn whitespace_title_counts_as_missing() {
        assert_eq!(
            validate_create(payload(Some("   "), Some("2026-01-01"), Some("National"))),
            Err("Holiday title is required.".to_string())
        );
    }

    #[test]
    fn unknown_type_echoes_the_value() {
        assert_eq!(
            validate_create(payload(Some("New Year"), Some("2026-01-01"), Some("Bank"))),
            Err("Bank is not a valid holiday type.".to_string())
        );
    }

    #[test]
    fn description_over_limit_is_rejected() {
        let mut request = payload(Some("New Year"), Some("2026-01-01"), Some("National"));
        request.description = Some("x".repeat(MAX_DESCRIPTION_CHARS + 1));
        assert_eq!(
            validate_create(request),
            Err("Description must not exceed 200 characters.".to_string())
        );
    }

    #[test]
    fn patch_accepts_partial_payloads() -> Result<(), String> {
        let patch = validate_patch(payload(None, None, Some("Festival")))?;
        assert_eq!(patch.kind, Some(HolidayKind::Festival));
        assert_eq!(patch.title, None);
        assert_eq!(patch.date, None);

        let empty = validate_patch(HolidayPayload::default())?;
        assert_eq!(empty, HolidayPatch::default());
        Ok(())
    }

    #[test]
    fn patch_still_validates_present_fields() {
        assert_eq!(
            validate_patch(payload(Some(" "), None, None)),
            Err("Holiday title is required.".to_string())
        );
        assert_eq!(
            validate_patch(payload(None, None, Some("Bank"))),
            Err("Bank is not a valid holiday type.".to_string())
        );
    }

    #[test]
    fn kind_round_trips_through_strings() -> Result<(), String> {
        for kind in [
            HolidayKind::National,
            HolidayKind::Festival,
            HolidayKind::Optional,
            HolidayKind::Religious,
            HolidayKind::Regional,
        ] {
            assert_eq!(HolidayKind::from_str(kind.as_str())?, kind);
        }
        Ok(())
    }

    #[test]
    fn holiday_serializes_type_key() -> anyhow::Result<()> {
        let holiday = Holiday {
            id: Uuid::new_v4(),
            title: "New Year".to_string(),
            date: "2026-01-01".parse()?,
            kind: HolidayKind::National,
            region: "All".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&holiday)?;
        assert_eq!(
            value.get("type").and_then(serde_json::Value::as_str),
            Some("National")
        );
        assert!(value.get("kind").is_none());
        Ok(())
    }
}
