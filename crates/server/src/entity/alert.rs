use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Alert lifecycle status. Transitions only move forward:
/// open -> validated -> resolved.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "open",
            AlertStatus::Validated => "validated",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(AlertStatus::Open),
            "validated" => Ok(AlertStatus::Validated),
            "resolved" => Ok(AlertStatus::Resolved),
            _ => Err("Invalid status.".to_string()),
        }
    }
}

/// Triage classification assigned by the validating analyst.
/// `TPNM` ("true positive, not malicious") opens the customer
/// self-remediation path.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
pub enum ClosureCode {
    #[sea_orm(string_value = "NA")]
    #[serde(rename = "NA")]
    Na,
    #[sea_orm(string_value = "TP")]
    #[serde(rename = "TP")]
    Tp,
    #[sea_orm(string_value = "FP")]
    #[serde(rename = "FP")]
    Fp,
    #[sea_orm(string_value = "TPNM")]
    #[serde(rename = "TPNM")]
    Tpnm,
}

impl ClosureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosureCode::Na => "NA",
            ClosureCode::Tp => "TP",
            ClosureCode::Fp => "FP",
            ClosureCode::Tpnm => "TPNM",
        }
    }
}

impl FromStr for ClosureCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" => Ok(ClosureCode::Na),
            "TP" => Ok(ClosureCode::Tp),
            "FP" => Ok(ClosureCode::Fp),
            "TPNM" => Ok(ClosureCode::Tpnm),
            _ => Err("Invalid closure code.".to_string()),
        }
    }
}

/// Which party owns remediation of a non-malicious finding.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
pub enum Mitigation {
    #[sea_orm(string_value = "NA")]
    #[serde(rename = "NA")]
    Na,
    #[sea_orm(string_value = "soc")]
    #[serde(rename = "soc")]
    Soc,
    #[sea_orm(string_value = "customer")]
    #[serde(rename = "customer")]
    Customer,
}

impl Mitigation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mitigation::Na => "NA",
            Mitigation::Soc => "soc",
            Mitigation::Customer => "customer",
        }
    }
}

impl FromStr for Mitigation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" => Ok(Mitigation::Na),
            "soc" => Ok(Mitigation::Soc),
            "customer" => Ok(Mitigation::Customer),
            _ => Err("Invalid mitigation strategy.".to_string()),
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err("Invalid severity.".to_string()),
        }
    }
}

/// Central entity. `created_at` is assigned once at ingestion and never
/// updated; validated/resolved stamps are written by the corresponding
/// lifecycle transitions together with the acting user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "alert")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub endpoint_id: i32,
    pub source_id: i32,
    pub customer_id: i32,
    pub validator_id: Option<i32>,
    pub validated_at: Option<OffsetDateTime>,
    pub status: AlertStatus,
    pub closure_code: ClosureCode,
    pub mitigation_strategy_id: Option<i32>,
    pub mitigation: Mitigation,
    pub resolved_at: Option<OffsetDateTime>,
    pub resolver_id: Option<i32>,
    pub severity: Severity,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::endpoint::Entity",
        from = "Column::EndpointId",
        to = "super::endpoint::Column::Id"
    )]
    Endpoint,
    #[sea_orm(
        belongs_to = "super::source::Entity",
        from = "Column::SourceId",
        to = "super::source::Column::Id"
    )]
    Source,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::mitigation_strategy::Entity",
        from = "Column::MitigationStrategyId",
        to = "super::mitigation_strategy::Column::Id"
    )]
    MitigationStrategy,
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ValidatorId",
        to = "super::user_profile::Column::Id"
    )]
    Validator,
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::ResolverId",
        to = "super::user_profile::Column::Id"
    )]
    Resolver,
}

impl Related<super::endpoint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Endpoint.def()
    }
}

impl Related<super::source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Source.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::mitigation_strategy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MitigationStrategy.def()
    }
}

impl Related<super::rule::Entity> for Entity {
    fn to() -> RelationDef {
        super::alert_rule::Relation::Rule.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::alert_rule::Relation::Alert.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
