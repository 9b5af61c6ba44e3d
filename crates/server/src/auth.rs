//! Caller identity resolution.
//!
//! Bearer tokens are decoded once per request into an explicit [`Caller`]
//! value; handlers dispatch on [`Role`] instead of re-deriving the role
//! from the request in every endpoint.

use crate::{AppResources, error::ApiError};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims carried by the bearer token. Issued by the external identity
/// provider; this service only verifies and consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize,
    pub user_id: i32,
    #[serde(default)]
    pub mfa_verified: bool,
    #[serde(default)]
    pub analyst: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i32>,
}

impl Claims {
    pub fn encode(&self, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), self, &EncodingKey::from_secret(secret))
    }

    pub fn decode(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        Ok(decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?.claims)
    }
}

/// Role of the authenticated caller. The analyst flag wins over a customer
/// affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Analyst,
    Customer { customer_id: i32 },
}

/// Authenticated caller identity, resolved once per request.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i32,
    pub mfa_verified: bool,
    pub role: Option<Role>,
}

impl Caller {
    pub fn from_claims(claims: &Claims) -> Self {
        let role = if claims.analyst {
            Some(Role::Analyst)
        } else {
            claims
                .customer_id
                .map(|customer_id| Role::Customer { customer_id })
        };
        Caller {
            user_id: claims.user_id,
            mfa_verified: claims.mfa_verified,
            role,
        }
    }

    /// Guard for ingestion: any authenticated identity, but MFA-verified.
    pub fn require_mfa(&self) -> Result<(), ApiError> {
        if self.mfa_verified {
            Ok(())
        } else {
            Err(ApiError::Forbidden("MFA verification required.".into()))
        }
    }

    /// Guard for analyst routes: analyst role plus MFA.
    pub fn require_analyst(&self) -> Result<(), ApiError> {
        self.require_mfa()?;
        match self.role {
            Some(Role::Analyst) => Ok(()),
            _ => Err(ApiError::Forbidden("Analyst role required.".into())),
        }
    }

    /// Guard for customer routes; returns the caller's customer id.
    pub fn require_customer(&self) -> Result<i32, ApiError> {
        match self.role {
            Some(Role::Customer { customer_id }) => Ok(customer_id),
            _ => Err(ApiError::Forbidden("Customer affiliation required.".into())),
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts
            .extensions
            .get::<AppResources>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("AppResources extension missing".into()))?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided.".into())
            })?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Authorization header must use the Bearer scheme.".into())
        })?;

        let claims = Claims::decode(token, resources.config.auth.token_secret.as_bytes())
            .map_err(|e| {
                tracing::warn!(
                    name = "auth.invalid_token",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "Invalid or expired bearer token"
                );
                ApiError::Unauthorized("Invalid or expired token.".into())
            })?;

        Ok(Caller::from_claims(&claims))
    }
}
