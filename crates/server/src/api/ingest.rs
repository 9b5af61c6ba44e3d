//! Alert ingestion endpoint for external monitoring sources.

use crate::auth::Caller;
use crate::error::{ApiError, ApiJson};
use crate::lifecycle::{self, IngestSubmission};
use crate::response::AlertBody;
use crate::AppResources;
use axum::{Extension, Json};
use hyper::StatusCode;
use serde::Deserialize;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const INGEST_TAG: &str = "Ingestion";

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiveAlert {
    pub title: String,
    pub description: String,
    /// Id of the endpoint the alert fired on. Must be active.
    pub endpoint_id: i32,
    /// Name of the registered monitoring source submitting the alert.
    pub source_name: String,
    pub customer_id: i32,
    /// Names of the detection rules that fired. All must resolve or the
    /// submission is rejected as a whole.
    #[serde(default)]
    pub rules: Vec<String>,
}

#[tracing::instrument(skip(resources, payload), fields(endpoint_id = payload.endpoint_id, customer_id = payload.customer_id))]
#[utoipa::path(
    post,
    path = "/receive",
    operation_id = "Receive Alert",
    tag = INGEST_TAG,
    summary = "Submit a new alert from a monitoring source",
    description = "Creates a new alert in the open state.\n\n\
                   The referenced endpoint, source (by name) and customer must already be \
                   registered, the endpoint must be active, and every named rule must \
                   resolve; otherwise nothing is persisted. New alerts always start as \
                   open / closure code NA / mitigation NA / severity low.",
    request_body(content = ReceiveAlert, description = "Alert submission"),
    responses(
        (status = 201, description = "Alert created", body = AlertBody),
        (status = 400, description = "Inactive endpoint or unresolved rules", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "MFA not verified", content_type = "application/json"),
        (status = 404, description = "Unknown endpoint, source or customer", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
pub async fn receive_alert(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    ApiJson(payload): ApiJson<ReceiveAlert>,
) -> Result<(StatusCode, Json<AlertBody>), ApiError> {
    caller.require_mfa()?;

    let alert = lifecycle::ingest_alert(
        resources.db.as_ref(),
        IngestSubmission {
            title: payload.title,
            description: payload.description,
            endpoint_id: payload.endpoint_id,
            source_name: payload.source_name,
            customer_id: payload.customer_id,
            rules: payload.rules,
        },
    )
    .await?;

    let body = AlertBody::load(resources.db.as_ref(), alert).await?;
    Ok((StatusCode::CREATED, Json(body)))
}
