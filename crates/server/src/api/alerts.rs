//! Alert listing and analyst triage endpoints.
//!
//! - `/` - Customer-scoped alert listing
//! - `/all` - Analyst listing across all customers
//! - `/all/{id}` - Analyst detail, closure-code triage and mitigation
//!   strategy attachment
//! - `/mitigation_strategies` - The shared mitigation strategy catalog

use crate::auth::Caller;
use crate::entity::alert::{self, ClosureCode};
use crate::entity::mitigation_strategy;
use crate::error::{ApiError, ApiJson};
use crate::filters::AlertFilterParams;
use crate::lifecycle;
use crate::response::{AlertBody, Paginated};
use crate::AppResources;
use axum::extract::{Path, Query};
use axum::{Extension, Json};
use hyper::StatusCode;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ALERTS_TAG: &str = "Alerts";

/// Creates the alerts API router.
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_customer_alerts))
        .routes(routes!(list_all_alerts))
        .routes(routes!(
            get_alert,
            set_alert_closure_code,
            add_mitigation_strategy
        ))
        .routes(routes!(list_mitigation_strategies))
}

/// Run a filtered alert query through one page and materialize the bodies.
async fn paginate_alerts(
    resources: &AppResources,
    query: sea_orm::Select<alert::Entity>,
    params: &AlertFilterParams,
) -> Result<Paginated<AlertBody>, ApiError> {
    let query = params.apply(query)?.order_by_asc(alert::Column::Id);
    let page = params.page();
    let page_size = params.page_size();

    let paginator = query.paginate(resources.db.as_ref(), page_size);
    let count = paginator.num_items().await?;
    let models = paginator.fetch_page(page - 1).await?;
    let results = AlertBody::load_many(resources.db.as_ref(), models).await?;

    Ok(Paginated {
        count,
        page,
        page_size,
        results,
    })
}

#[tracing::instrument(skip(resources, caller, params))]
#[utoipa::path(
    get,
    path = "/",
    operation_id = "List Customer Alerts",
    tag = ALERTS_TAG,
    summary = "List the caller's own alerts",
    description = "Paginated listing of alerts belonging to the caller's customer, with \
                   optional filters on status, closure code, source and creation time.",
    params(AlertFilterParams),
    responses(
        (status = 200, description = "One page of alerts", body = Paginated<AlertBody>),
        (status = 400, description = "Invalid filter value", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller has no customer affiliation", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_customer_alerts(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Query(params): Query<AlertFilterParams>,
) -> Result<Json<Paginated<AlertBody>>, ApiError> {
    let customer_id = caller.require_customer()?;
    let query = alert::Entity::find().filter(alert::Column::CustomerId.eq(customer_id));
    Ok(Json(paginate_alerts(&resources, query, &params).await?))
}

#[tracing::instrument(skip(resources, caller, params))]
#[utoipa::path(
    get,
    path = "/all",
    operation_id = "List All Alerts",
    tag = ALERTS_TAG,
    summary = "List alerts across all customers",
    description = "Analyst-only paginated listing over the full alert table with the \
                   same filters as the customer listing.",
    params(AlertFilterParams),
    responses(
        (status = 200, description = "One page of alerts", body = Paginated<AlertBody>),
        (status = 400, description = "Invalid filter value", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_all_alerts(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Query(params): Query<AlertFilterParams>,
) -> Result<Json<Paginated<AlertBody>>, ApiError> {
    caller.require_analyst()?;
    Ok(Json(paginate_alerts(&resources, alert::Entity::find(), &params).await?))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/all/{id}",
    operation_id = "Get Alert",
    tag = ALERTS_TAG,
    summary = "Fetch one alert with its relations",
    params(("id" = i32, Path, description = "Alert id")),
    responses(
        (status = 200, description = "The alert", body = AlertBody),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json"),
        (status = 404, description = "Unknown alert", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn get_alert(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<AlertBody>, ApiError> {
    caller.require_analyst()?;
    let alert = alert::Entity::find_by_id(id)
        .one(resources.db.as_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Alert"))?;
    Ok(Json(AlertBody::load(resources.db.as_ref(), alert).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetClosureCode {
    /// One of NA, TP, FP, TPNM.
    pub closure_code: String,
}

#[tracing::instrument(skip(resources, caller, payload))]
#[utoipa::path(
    patch,
    path = "/all/{id}",
    operation_id = "Set Closure Code",
    tag = ALERTS_TAG,
    summary = "Triage an alert with a closure code",
    description = "Sets the closure code and moves the alert into the validated state, \
                   stamping the acting analyst and the validation time. Repeating the \
                   call overwrites the previous triage.",
    params(("id" = i32, Path, description = "Alert id")),
    request_body(content = SetClosureCode),
    responses(
        (status = 200, description = "Closure code updated", content_type = "application/json", example = json!({"detail": "Closure code updated successfully."})),
        (status = 400, description = "Unknown closure code", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json"),
        (status = 404, description = "Unknown alert", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn set_alert_closure_code(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<SetClosureCode>,
) -> Result<Json<Value>, ApiError> {
    caller.require_analyst()?;
    let code: ClosureCode = payload
        .closure_code
        .parse()
        .map_err(|message: String| ApiError::field("closure_code", message))?;

    lifecycle::set_closure_code(resources.db.as_ref(), id, code, caller.user_id).await?;
    Ok(Json(json!({ "detail": "Closure code updated successfully." })))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMitigationStrategy {
    /// Free-text remediation guidance. Byte-identical text reuses the
    /// existing catalog entry.
    pub description: String,
}

#[tracing::instrument(skip(resources, caller, payload))]
#[utoipa::path(
    post,
    path = "/all/{id}",
    operation_id = "Add Mitigation Strategy",
    tag = ALERTS_TAG,
    summary = "Attach a mitigation strategy to an alert",
    params(("id" = i32, Path, description = "Alert id")),
    request_body(content = AddMitigationStrategy),
    responses(
        (status = 201, description = "Strategy linked", content_type = "application/json", example = json!({"detail": "Mitigation strategy created and linked to alert."})),
        (status = 400, description = "Empty description", content_type = "application/json"),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json"),
        (status = 404, description = "Unknown alert", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn add_mitigation_strategy(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<AddMitigationStrategy>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    caller.require_analyst()?;
    lifecycle::attach_mitigation_strategy(resources.db.as_ref(), id, &payload.description).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "detail": "Mitigation strategy created and linked to alert." })),
    ))
}

#[tracing::instrument(skip(resources, caller))]
#[utoipa::path(
    get,
    path = "/mitigation_strategies",
    operation_id = "List Mitigation Strategies",
    tag = ALERTS_TAG,
    summary = "List the mitigation strategy catalog",
    responses(
        (status = 200, description = "All strategies", body = Vec<mitigation_strategy::Model>),
        (status = 401, description = "Missing or invalid credentials", content_type = "application/json"),
        (status = 403, description = "Caller is not an MFA-verified analyst", content_type = "application/json")
    ),
    security(("Authorization" = []))
)]
async fn list_mitigation_strategies(
    Extension(resources): Extension<AppResources>,
    caller: Caller,
) -> Result<Json<Vec<mitigation_strategy::Model>>, ApiError> {
    caller.require_analyst()?;
    let strategies = mitigation_strategy::Entity::find()
        .all(resources.db.as_ref())
        .await?;
    Ok(Json(strategies))
}
