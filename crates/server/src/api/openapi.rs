//! OpenAPI/Utoipa configuration.

use crate::api::{
    ALERTS_TAG, DASHBOARD_TAG, ENDPOINTS_TAG, INGEST_TAG, MISC_TAG, REPORTS_TAG, SELF_SERVICE_TAG,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Bearer token issued by the identity provider. Carries the user id, \
                     MFA state and the analyst or customer role.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Alert Tracker API",
        version = "1.0.0",
        description = "API for tracking security alerts across customers: ingestion from \
                       monitoring sources, analyst triage, customer self-remediation of \
                       non-malicious findings, dashboards and PDF reports."
    ),
    tags(
        (name = INGEST_TAG, description = "Alert submission from monitoring sources"),
        (name = ALERTS_TAG, description = "Alert listings and analyst triage"),
        (name = SELF_SERVICE_TAG, description = "Customer self-remediation of TPNM findings"),
        (name = ENDPOINTS_TAG, description = "Endpoint inventory"),
        (name = DASHBOARD_TAG, description = "Aggregated statistics"),
        (name = REPORTS_TAG, description = "PDF report downloads"),
        (name = MISC_TAG, description = "Miscellaneous endpoints")
    )
)]
pub struct ApiDoc;
