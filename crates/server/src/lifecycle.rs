//! Alert lifecycle state machine.
//!
//! Ingestion creates alerts as open/NA/NA; the analyst triage transition
//! validates them with a closure code; customers may self-remediate
//! findings classified as TPNM and mark them resolved. Status only moves
//! forward (open -> validated -> resolved); re-running a transition
//! overwrites the prior stamp rather than rejecting (last write wins).
//!
//! Every mutating operation runs as one database transaction: read
//! current state, validate, write new state, return.

use crate::entity::alert::{self, AlertStatus, ClosureCode, Mitigation, Severity};
use crate::entity::{alert_rule, customer, endpoint, mitigation_strategy, rule, source};
use crate::error::ApiError;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use time::OffsetDateTime;

/// A validated alert submission from an external monitoring source.
#[derive(Debug, Clone)]
pub struct IngestSubmission {
    pub title: String,
    pub description: String,
    pub endpoint_id: i32,
    pub source_name: String,
    pub customer_id: i32,
    pub rules: Vec<String>,
}

/// Create a new alert from a monitoring-source submission.
///
/// Rejects when the endpoint, source or customer is unknown, when the
/// endpoint is inactive, or when any named rule does not resolve (rule
/// resolution is all-or-nothing). On success the alert is persisted with
/// status=open, closure_code=NA, mitigation=NA, severity=low and all rule
/// links, in a single transaction.
#[tracing::instrument(skip(db, submission), fields(endpoint_id = submission.endpoint_id, customer_id = submission.customer_id))]
pub async fn ingest_alert(
    db: &DatabaseConnection,
    submission: IngestSubmission,
) -> Result<alert::Model, ApiError> {
    let txn = db.begin().await?;

    let endpoint = endpoint::Entity::find_by_id(submission.endpoint_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Endpoint"))?;
    if !endpoint.is_active {
        return Err(ApiError::field("endpoint_id", "Endpoint is not active."));
    }

    let source = source::Entity::find()
        .filter(source::Column::Name.eq(submission.source_name.clone()))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Source"))?;

    let customer = customer::Entity::find_by_id(submission.customer_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    let rules = rule::Entity::find()
        .filter(rule::Column::Name.is_in(submission.rules.clone()))
        .all(&txn)
        .await?;
    if rules.len() != submission.rules.len() {
        return Err(ApiError::field("rules", "One or more rules not found."));
    }

    let new_alert = alert::ActiveModel {
        title: Set(submission.title),
        description: Set(submission.description),
        created_at: Set(OffsetDateTime::now_utc()),
        endpoint_id: Set(endpoint.id),
        source_id: Set(source.id),
        customer_id: Set(customer.id),
        status: Set(AlertStatus::Open),
        closure_code: Set(ClosureCode::Na),
        mitigation: Set(Mitigation::Na),
        severity: Set(Severity::Low),
        ..Default::default()
    };
    let alert = new_alert.insert(&txn).await?;

    if !rules.is_empty() {
        alert_rule::Entity::insert_many(rules.iter().map(|r| alert_rule::ActiveModel {
            alert_id: Set(alert.id),
            rule_id: Set(r.id),
        }))
        .exec(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(alert)
}

/// Analyst triage: set the closure code and force the alert into the
/// validated state, stamping the acting analyst and the validation time.
/// Repeated calls overwrite the code and re-stamp validator/time.
#[tracing::instrument(skip(db))]
pub async fn set_closure_code(
    db: &DatabaseConnection,
    alert_id: i32,
    code: ClosureCode,
    validator_id: i32,
) -> Result<alert::Model, ApiError> {
    let txn = db.begin().await?;

    let alert = alert::Entity::find_by_id(alert_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Alert"))?;

    let mut active: alert::ActiveModel = alert.into();
    active.closure_code = Set(code);
    active.status = Set(AlertStatus::Validated);
    active.validator_id = Set(Some(validator_id));
    active.validated_at = Set(Some(OffsetDateTime::now_utc()));
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Attach a mitigation strategy to an alert, reusing an existing strategy
/// row when one with byte-identical description text exists (exact-match
/// dedup, case-sensitive, no normalization).
#[tracing::instrument(skip(db, description))]
pub async fn attach_mitigation_strategy(
    db: &DatabaseConnection,
    alert_id: i32,
    description: &str,
) -> Result<mitigation_strategy::Model, ApiError> {
    if description.is_empty() {
        return Err(ApiError::validation(
            "Mitigation strategy description is required.",
        ));
    }

    let txn = db.begin().await?;

    let alert = alert::Entity::find_by_id(alert_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Alert"))?;

    let strategy = match mitigation_strategy::Entity::find()
        .filter(mitigation_strategy::Column::Description.eq(description))
        .one(&txn)
        .await?
    {
        Some(existing) => existing,
        None => {
            mitigation_strategy::ActiveModel {
                description: Set(description.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let mut active: alert::ActiveModel = alert.into();
    active.mitigation_strategy_id = Set(Some(strategy.id));
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(strategy)
}

/// Fetch an alert through the customer self-remediation scope: it must
/// belong to the caller's customer AND carry closure_code=TPNM. Anything
/// outside that set is reported as not found, never mutated.
pub async fn find_non_malicious<C: ConnectionTrait>(
    db: &C,
    customer_id: i32,
    alert_id: i32,
) -> Result<alert::Model, ApiError> {
    alert::Entity::find_by_id(alert_id)
        .filter(alert::Column::CustomerId.eq(customer_id))
        .filter(alert::Column::ClosureCode.eq(ClosureCode::Tpnm))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Alert"))
}

/// Customer transition: select which party owns remediation of a
/// non-malicious finding. Does not change the alert status.
#[tracing::instrument(skip(db))]
pub async fn select_mitigation(
    db: &DatabaseConnection,
    customer_id: i32,
    alert_id: i32,
    mitigation: Mitigation,
) -> Result<alert::Model, ApiError> {
    let txn = db.begin().await?;

    let alert = find_non_malicious(&txn, customer_id, alert_id).await?;
    let mut active: alert::ActiveModel = alert.into();
    active.mitigation = Set(mitigation);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Customer transition: mark a non-malicious alert resolved, stamping the
/// acting user and the resolution time. There is no precondition that a
/// mitigation owner was selected first; calling twice re-stamps the later
/// time.
#[tracing::instrument(skip(db))]
pub async fn resolve_alert(
    db: &DatabaseConnection,
    customer_id: i32,
    alert_id: i32,
    resolver_id: i32,
) -> Result<alert::Model, ApiError> {
    let txn = db.begin().await?;

    let alert = find_non_malicious(&txn, customer_id, alert_id).await?;
    let mut active: alert::ActiveModel = alert.into();
    active.status = Set(AlertStatus::Resolved);
    active.resolver_id = Set(Some(resolver_id));
    active.resolved_at = Set(Some(OffsetDateTime::now_utc()));
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deactivate an endpoint. This is the only exposed mutation on an
/// endpoint and it is one-way: nothing in the contract reactivates.
#[tracing::instrument(skip(db))]
pub async fn deactivate_endpoint(
    db: &DatabaseConnection,
    endpoint_id: i32,
) -> Result<endpoint::Model, ApiError> {
    let txn = db.begin().await?;

    let endpoint = endpoint::Entity::find_by_id(endpoint_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Endpoint"))?;

    let mut active: endpoint::ActiveModel = endpoint.into();
    active.is_active = Set(false);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}
