//! Wire representations returned by the API.

use crate::entity::alert::{self, AlertStatus, ClosureCode, Mitigation, Severity};
use crate::entity::{customer, endpoint, mitigation_strategy, rule, source};
use crate::error::ApiError;
use sea_orm::{ConnectionTrait, EntityTrait, ModelTrait};
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Fully materialized alert representation: nested source, rules and
/// mitigation strategy; customer and endpoint flattened to display names.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertBody {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub endpoint: String,
    pub source: source::Model,
    pub customer: String,
    pub validator: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub validated_at: Option<OffsetDateTime>,
    pub status: AlertStatus,
    pub closure_code: ClosureCode,
    pub mitigation_strategy: Option<mitigation_strategy::Model>,
    pub mitigation: Mitigation,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    pub resolver: Option<i32>,
    pub rules: Vec<rule::Model>,
    pub severity: Severity,
}

impl AlertBody {
    /// Materialize one alert with its relations.
    pub async fn load<C: ConnectionTrait>(db: &C, alert: alert::Model) -> Result<Self, ApiError> {
        let source = source::Entity::find_by_id(alert.source_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Source"))?;
        let customer = customer::Entity::find_by_id(alert.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer"))?;
        let endpoint = endpoint::Entity::find_by_id(alert.endpoint_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Endpoint"))?;
        let mitigation_strategy = match alert.mitigation_strategy_id {
            Some(id) => mitigation_strategy::Entity::find_by_id(id).one(db).await?,
            None => None,
        };
        let rules = alert.find_related(rule::Entity).all(db).await?;

        Ok(AlertBody {
            id: alert.id,
            title: alert.title,
            description: alert.description,
            timestamp: alert.created_at,
            endpoint: endpoint.name,
            source,
            customer: customer.company_name,
            validator: alert.validator_id,
            validated_at: alert.validated_at,
            status: alert.status,
            closure_code: alert.closure_code,
            mitigation_strategy,
            mitigation: alert.mitigation,
            resolved_at: alert.resolved_at,
            resolver: alert.resolver_id,
            rules,
            severity: alert.severity,
        })
    }

    pub async fn load_many<C: ConnectionTrait>(
        db: &C,
        alerts: Vec<alert::Model>,
    ) -> Result<Vec<Self>, ApiError> {
        let mut bodies = Vec::with_capacity(alerts.len());
        for alert in alerts {
            bodies.push(AlertBody::load(db, alert).await?);
        }
        Ok(bodies)
    }
}

/// Endpoint representation for customer-facing listings; the owning
/// customer is implied by the caller and omitted from the body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerEndpointBody {
    pub id: i32,
    pub host: String,
    pub ip: String,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
}

impl From<endpoint::Model> for CustomerEndpointBody {
    fn from(model: endpoint::Model) -> Self {
        CustomerEndpointBody {
            id: model.id,
            host: model.host,
            ip: model.ip,
            name: model.name,
            kind: model.kind,
            is_active: model.is_active,
        }
    }
}

/// Pagination envelope for alert listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T: ToSchema> {
    /// Total number of matching rows across all pages.
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}
