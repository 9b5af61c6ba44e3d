//! Query-parameter filtering for alert listings.

use crate::entity::alert::{self, AlertStatus, ClosureCode};
use crate::error::ApiError;
use sea_orm::{ColumnTrait, QueryFilter, Select};
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use utoipa::IntoParams;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

/// Parse an RFC 3339 / ISO-8601 timestamp query value, reporting failures
/// as a field-level 400.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|_| ApiError::field(field, "Invalid datetime format."))
}

/// Optional filters shared by the analyst and customer alert listings.
/// Timestamp bounds are inclusive on the alert creation time.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AlertFilterParams {
    /// Filter by alert status: open, validated, resolved.
    pub status: Option<String>,
    /// Filter by closure code: NA, TP, FP, TPNM.
    pub closure_code: Option<String>,
    /// Filter by source id.
    pub source: Option<i32>,
    /// Alerts created at or after this RFC 3339 timestamp.
    pub timestamp_after: Option<String>,
    /// Alerts created at or before this RFC 3339 timestamp.
    pub timestamp_before: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size (default 50, capped at 200).
    pub page_size: Option<u64>,
}

impl AlertFilterParams {
    /// Apply the filters onto an alert select. Unknown enum spellings and
    /// malformed timestamps reject before any query executes.
    pub fn apply(&self, mut query: Select<alert::Entity>) -> Result<Select<alert::Entity>, ApiError> {
        if let Some(value) = &self.status {
            let status: AlertStatus = value
                .parse()
                .map_err(|message: String| ApiError::field("status", message))?;
            query = query.filter(alert::Column::Status.eq(status));
        }
        if let Some(value) = &self.closure_code {
            let code: ClosureCode = value
                .parse()
                .map_err(|message: String| ApiError::field("closure_code", message))?;
            query = query.filter(alert::Column::ClosureCode.eq(code));
        }
        if let Some(source_id) = self.source {
            query = query.filter(alert::Column::SourceId.eq(source_id));
        }
        if let Some(value) = &self.timestamp_after {
            let after = parse_timestamp("timestamp_after", value)?;
            query = query.filter(alert::Column::CreatedAt.gte(after));
        }
        if let Some(value) = &self.timestamp_before {
            let before = parse_timestamp("timestamp_before", value)?;
            query = query.filter(alert::Column::CreatedAt.lte(before));
        }
        Ok(query)
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let ts = parse_timestamp("after", "2024-12-01T00:00:00Z").unwrap();
        assert_eq!(ts.year(), 2024);
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("after", "yesterday").is_err());
        assert!(parse_timestamp("after", "2024-12-01").is_err());
    }

    #[test]
    fn apply_rejects_unknown_status() {
        let params = AlertFilterParams {
            status: Some("closed".into()),
            ..Default::default()
        };
        assert!(params.apply(alert::Entity::find()).is_err());
    }

    #[test]
    fn apply_rejects_unknown_closure_code() {
        let params = AlertFilterParams {
            closure_code: Some("XX".into()),
            ..Default::default()
        };
        assert!(params.apply(alert::Entity::find()).is_err());
    }

    #[test]
    fn apply_accepts_valid_combination() {
        let params = AlertFilterParams {
            status: Some("open".into()),
            closure_code: Some("TPNM".into()),
            source: Some(3),
            timestamp_after: Some("2024-12-01T00:00:00Z".into()),
            timestamp_before: Some("2024-12-10T23:59:59Z".into()),
            ..Default::default()
        };
        assert!(params.apply(alert::Entity::find()).is_ok());
    }

    #[test]
    fn page_defaults_are_sane() {
        let params = AlertFilterParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 50);

        let params = AlertFilterParams {
            page: Some(0),
            page_size: Some(10_000),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 200);
    }
}
