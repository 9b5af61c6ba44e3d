//! Descriptive statistics over a customer's alerts and endpoints.
//!
//! The four alert groupings (severity, calendar day, source name, status)
//! are pure functions over the fetched alert set; keys come out in
//! lexicographic order (days chronologically) and empty groups are simply
//! absent, with no zero-fill.

use crate::entity::alert;
use crate::entity::{endpoint, source};
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::BTreeMap;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use utoipa::ToSchema;

const DAY_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SeverityCount {
    pub severity: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayCount {
    /// Calendar day of alert creation, `YYYY-MM-DD`.
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SourceCount {
    pub source: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

/// The four independent alert groupings for one customer and time window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertStats {
    pub severity_stats: Vec<SeverityCount>,
    pub event_counts: Vec<DayCount>,
    pub source_stats: Vec<SourceCount>,
    pub status_stats: Vec<StatusCount>,
}

/// Endpoint counts for one customer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EndpointStats {
    pub total_endpoints: u64,
    pub active_endpoints: u64,
    pub inactive_endpoints: u64,
}

/// Fetch a customer's alerts created within the inclusive window
/// [after, before], paired with their sources.
pub async fn alerts_in_window(
    db: &sea_orm::DatabaseConnection,
    customer_id: i32,
    after: OffsetDateTime,
    before: OffsetDateTime,
) -> Result<Vec<(alert::Model, Option<source::Model>)>, DbErr> {
    alert::Entity::find()
        .filter(alert::Column::CustomerId.eq(customer_id))
        .filter(alert::Column::CreatedAt.gte(after))
        .filter(alert::Column::CreatedAt.lte(before))
        .find_also_related(source::Entity)
        .all(db)
        .await
}

pub fn count_by_severity<'a>(
    alerts: impl IntoIterator<Item = &'a alert::Model>,
) -> Vec<SeverityCount> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for alert in alerts {
        *counts.entry(alert.severity.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(severity, count)| SeverityCount {
            severity: severity.to_string(),
            count,
        })
        .collect()
}

pub fn count_by_day<'a>(alerts: impl IntoIterator<Item = &'a alert::Model>) -> Vec<DayCount> {
    let mut counts: BTreeMap<time::Date, u64> = BTreeMap::new();
    for alert in alerts {
        *counts.entry(alert.created_at.date()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(day, count)| DayCount {
            // The format description only uses infallible components.
            date: day.format(DAY_FORMAT).unwrap_or_default(),
            count,
        })
        .collect()
}

pub fn count_by_source(pairs: &[(alert::Model, Option<source::Model>)]) -> Vec<SourceCount> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for (_, source) in pairs {
        let name = source
            .as_ref()
            .map_or_else(|| "unknown".to_string(), |s| s.name.clone());
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(source, count)| SourceCount { source, count })
        .collect()
}

pub fn count_by_status<'a>(alerts: impl IntoIterator<Item = &'a alert::Model>) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for alert in alerts {
        *counts.entry(alert.status.as_str()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect()
}

/// Compute all four groupings for a fetched alert set.
pub fn alert_stats(pairs: &[(alert::Model, Option<source::Model>)]) -> AlertStats {
    AlertStats {
        severity_stats: count_by_severity(pairs.iter().map(|(a, _)| a)),
        event_counts: count_by_day(pairs.iter().map(|(a, _)| a)),
        source_stats: count_by_source(pairs),
        status_stats: count_by_status(pairs.iter().map(|(a, _)| a)),
    }
}

pub fn endpoint_stats(endpoints: &[endpoint::Model]) -> EndpointStats {
    let active = endpoints.iter().filter(|e| e.is_active).count() as u64;
    let total = endpoints.len() as u64;
    EndpointStats {
        total_endpoints: total,
        active_endpoints: active,
        inactive_endpoints: total - active,
    }
}
