//! End-to-end tests for the HTTP surface: authentication, ingestion,
//! analyst triage and the customer self-remediation flow.

mod common;

use alert_tracker::entity::alert::{self, AlertStatus, ClosureCode, Mitigation, Severity};
use alert_tracker::entity::{alert_rule, mitigation_strategy};
use alert_tracker::lifecycle::{self, IngestSubmission};
use alert_tracker::AppResources;
use axum_test::TestServer;
use common::*;
use hyper::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

struct Fixture {
    resources: AppResources,
    server: TestServer,
    customer_id: i32,
    endpoint_id: i32,
}

/// One customer ("Acme") with an active endpoint, an "edr" source and two
/// rules, plus a second customer ("Globex") for scoping tests.
async fn setup() -> Fixture {
    let resources = test_resources().await;
    let db = resources.db.as_ref();

    seed_user(db, "analyst", None, true).await;
    let acme = seed_customer(db, "Acme").await;
    let endpoint = seed_endpoint(db, acme.id, "web-01", true).await;
    seed_source(db, "edr").await;
    seed_rule(db, "lateral-movement").await;
    seed_rule(db, "persistence").await;
    seed_customer(db, "Globex").await;

    let server = test_server(resources.clone());
    Fixture {
        resources,
        server,
        customer_id: acme.id,
        endpoint_id: endpoint.id,
    }
}

async fn ingest_fixture_alert(fixture: &Fixture) -> alert::Model {
    lifecycle::ingest_alert(
        fixture.resources.db.as_ref(),
        IngestSubmission {
            title: "Suspicious login".into(),
            description: "Login from unusual location".into(),
            endpoint_id: fixture.endpoint_id,
            source_name: "edr".into(),
            customer_id: fixture.customer_id,
            rules: vec!["lateral-movement".into()],
        },
    )
    .await
    .expect("ingest fixture alert")
}

#[tokio::test]
async fn health_check_is_open() {
    let fixture = setup().await;
    let response = fixture.server.get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn missing_token_is_401() {
    let fixture = setup().await;
    let response = fixture.server.get("/alerts/all").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(
        body["detail"],
        "Authentication credentials were not provided."
    );
}

#[tokio::test]
async fn customer_token_cannot_reach_analyst_routes() {
    let fixture = setup().await;
    let response = fixture
        .server
        .get("/alerts/all")
        .authorization_bearer(token(false, Some(fixture.customer_id), true))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Analyst role required.");
}

#[tokio::test]
async fn ingest_requires_mfa() {
    let fixture = setup().await;
    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, false))
        .json(&json!({
            "title": "t",
            "description": "d",
            "endpoint_id": fixture.endpoint_id,
            "source_name": "edr",
            "customer_id": fixture.customer_id,
            "rules": []
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ingest_creates_open_alert_with_defaults() {
    let fixture = setup().await;
    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, true))
        .json(&json!({
            "title": "Suspicious login",
            "description": "Login from unusual location",
            "endpoint_id": fixture.endpoint_id,
            "source_name": "edr",
            "customer_id": fixture.customer_id,
            "rules": ["lateral-movement", "persistence"]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["status"], "open");
    assert_eq!(body["closure_code"], "NA");
    assert_eq!(body["mitigation"], "NA");
    assert_eq!(body["severity"], "low");
    assert_eq!(body["endpoint"], "web-01");
    assert_eq!(body["customer"], "Acme");
    assert_eq!(body["rules"].as_array().unwrap().len(), 2);

    let links = alert_rule::Entity::find()
        .count(fixture.resources.db.as_ref())
        .await
        .unwrap();
    assert_eq!(links, 2);
}

#[tokio::test]
async fn ingest_rejects_inactive_endpoint_without_persisting() {
    let fixture = setup().await;
    let inactive =
        seed_endpoint(fixture.resources.db.as_ref(), fixture.customer_id, "db-01", false).await;

    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, true))
        .json(&json!({
            "title": "t",
            "description": "d",
            "endpoint_id": inactive.id,
            "source_name": "edr",
            "customer_id": fixture.customer_id,
            "rules": []
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["endpoint_id"], "Endpoint is not active.");

    let alerts = alert::Entity::find()
        .count(fixture.resources.db.as_ref())
        .await
        .unwrap();
    assert_eq!(alerts, 0);
}

#[tokio::test]
async fn ingest_rule_resolution_is_all_or_nothing() {
    let fixture = setup().await;
    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, true))
        .json(&json!({
            "title": "t",
            "description": "d",
            "endpoint_id": fixture.endpoint_id,
            "source_name": "edr",
            "customer_id": fixture.customer_id,
            "rules": ["lateral-movement", "no-such-rule"]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["rules"], "One or more rules not found.");

    let db = fixture.resources.db.as_ref();
    assert_eq!(alert::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(alert_rule::Entity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn ingest_unknown_source_is_404() {
    let fixture = setup().await;
    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, true))
        .json(&json!({
            "title": "t",
            "description": "d",
            "endpoint_id": fixture.endpoint_id,
            "source_name": "netflow",
            "customer_id": fixture.customer_id,
            "rules": []
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Source not found.");
}

#[tokio::test]
async fn triage_sets_closure_code_and_validates() {
    let fixture = setup().await;
    let alert = ingest_fixture_alert(&fixture).await;

    let response = fixture
        .server
        .patch(&format!("/alerts/all/{}", alert.id))
        .authorization_bearer(token(true, None, true))
        .json(&json!({ "closure_code": "FP" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Closure code updated successfully.");

    let stored = alert::Entity::find_by_id(alert.id)
        .one(fixture.resources.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.closure_code, ClosureCode::Fp);
    assert_eq!(stored.status, AlertStatus::Validated);
    assert!(stored.validator_id.is_some());
    assert!(stored.validated_at.is_some());
}

#[tokio::test]
async fn triage_rejects_unknown_closure_code_unchanged() {
    let fixture = setup().await;
    let alert = ingest_fixture_alert(&fixture).await;

    let response = fixture
        .server
        .patch(&format!("/alerts/all/{}", alert.id))
        .authorization_bearer(token(true, None, true))
        .json(&json!({ "closure_code": "XX" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["closure_code"], "Invalid closure code.");

    let stored = alert::Entity::find_by_id(alert.id)
        .one(fixture.resources.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AlertStatus::Open);
    assert_eq!(stored.closure_code, ClosureCode::Na);
}

#[tokio::test]
async fn identical_strategy_text_reuses_catalog_entry() {
    let fixture = setup().await;
    let first = ingest_fixture_alert(&fixture).await;
    let second = ingest_fixture_alert(&fixture).await;
    let analyst = token(true, None, true);

    for id in [first.id, second.id] {
        let response = fixture
            .server
            .post(&format!("/alerts/all/{id}"))
            .authorization_bearer(analyst.clone())
            .json(&json!({ "description": "Block the sender domain." }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let db = fixture.resources.db.as_ref();
    assert_eq!(
        mitigation_strategy::Entity::find().count(db).await.unwrap(),
        1
    );

    let a = alert::Entity::find_by_id(first.id).one(db).await.unwrap().unwrap();
    let b = alert::Entity::find_by_id(second.id).one(db).await.unwrap().unwrap();
    assert_eq!(a.mitigation_strategy_id, b.mitigation_strategy_id);
}

#[tokio::test]
async fn customer_listing_is_scoped_to_own_alerts() {
    let fixture = setup().await;
    ingest_fixture_alert(&fixture).await;

    // Token affiliated with the other customer sees nothing.
    let response = fixture
        .server
        .get("/alerts")
        .authorization_bearer(token(false, Some(fixture.customer_id + 1), true))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["count"], 0);

    let response = fixture
        .server
        .get("/alerts")
        .authorization_bearer(token(false, Some(fixture.customer_id), true))
        .await;
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn listing_rejects_malformed_filters() {
    let fixture = setup().await;
    let response = fixture
        .server
        .get("/alerts/all?status=closed")
        .authorization_bearer(token(true, None, true))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], "Invalid status.");
}

#[tokio::test]
async fn non_tpnm_alert_is_invisible_to_self_service() {
    let fixture = setup().await;
    let alert_row = ingest_fixture_alert(&fixture).await;
    let customer = token(false, Some(fixture.customer_id), true);

    let response = fixture
        .server
        .patch(&format!("/alerts/non-malicious/{}", alert_row.id))
        .authorization_bearer(customer)
        .json(&json!({ "mitigation": "customer" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let stored = alert::Entity::find_by_id(alert_row.id)
        .one(fixture.resources.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.mitigation, Mitigation::Na);
}

#[tokio::test]
async fn self_service_flow_on_tpnm_alert() {
    let fixture = setup().await;
    let alert_row = ingest_fixture_alert(&fixture).await;
    lifecycle::set_closure_code(
        fixture.resources.db.as_ref(),
        alert_row.id,
        ClosureCode::Tpnm,
        1,
    )
    .await
    .unwrap();
    let customer = token(false, Some(fixture.customer_id), true);

    let response = fixture
        .server
        .get("/alerts/non-malicious")
        .authorization_bearer(customer.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = fixture
        .server
        .patch(&format!("/alerts/non-malicious/{}", alert_row.id))
        .authorization_bearer(customer.clone())
        .json(&json!({ "mitigation": "customer" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["mitigation"], "customer");

    let response = fixture
        .server
        .put(&format!("/alerts/non-malicious/{}", alert_row.id))
        .authorization_bearer(customer)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Alert marked as resolved.");

    let stored = alert::Entity::find_by_id(alert_row.id)
        .one(fixture.resources.db.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AlertStatus::Resolved);
    assert_eq!(stored.severity, Severity::Low);
    assert!(stored.resolved_at.is_some());
    assert!(stored.resolver_id.is_some());
}

#[tokio::test]
async fn customer_endpoint_listing_omits_customer_field() {
    let fixture = setup().await;
    let response = fixture
        .server
        .get("/endpoints")
        .authorization_bearer(token(false, Some(fixture.customer_id), true))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let first = &body.as_array().unwrap()[0];
    assert_eq!(first["name"], "web-01");
    assert!(first.get("customer_id").is_none());
}

#[tokio::test]
async fn unknown_company_listing_is_empty_not_an_error() {
    let fixture = setup().await;
    let response = fixture
        .server
        .get("/endpoints/NoSuchCorp")
        .authorization_bearer(token(true, None, true))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn endpoint_patch_deactivates() {
    let fixture = setup().await;
    let response = fixture
        .server
        .patch(&format!("/endpoints/Acme/{}", fixture.endpoint_id))
        .authorization_bearer(token(true, None, true))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["is_active"], false);

    // New alerts on the deactivated endpoint are now refused.
    let response = fixture
        .server
        .post("/receive")
        .authorization_bearer(token(false, None, true))
        .json(&json!({
            "title": "t",
            "description": "d",
            "endpoint_id": fixture.endpoint_id,
            "source_name": "edr",
            "customer_id": fixture.customer_id,
            "rules": []
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn endpoint_detail_is_scoped_by_company() {
    let fixture = setup().await;
    let response = fixture
        .server
        .get(&format!("/endpoints/Globex/{}", fixture.endpoint_id))
        .authorization_bearer(token(true, None, true))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Endpoint not found.");
}
