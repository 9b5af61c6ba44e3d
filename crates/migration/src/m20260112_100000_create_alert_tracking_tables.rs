//! Initial schema for the alert tracker.
//!
//! Creates tables for:
//! - customer: Companies under monitoring
//! - endpoint: Monitored hosts belonging to a customer
//! - user_profile: Analyst and customer user accounts
//! - source: Registered monitoring sources
//! - rule: Detection rules
//! - mitigation_strategy: Shared remediation text catalog
//! - alert: The alert lifecycle itself
//! - alert_rule: Many-to-many link between alerts and rules

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(pk_auto(Customer::Id))
                    .col(string(Customer::CompanyName).unique_key())
                    .col(string(Customer::Industry))
                    .col(string(Customer::ContactEmail))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Endpoint::Table)
                    .if_not_exists()
                    .col(pk_auto(Endpoint::Id))
                    .col(integer(Endpoint::CustomerId))
                    .col(string(Endpoint::Host))
                    .col(string(Endpoint::Ip))
                    .col(string(Endpoint::Name))
                    .col(string(Endpoint::Kind))
                    .col(boolean(Endpoint::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_endpoint_customer")
                            .from(Endpoint::Table, Endpoint::CustomerId)
                            .to(Customer::Table, Customer::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(UserProfile::Id))
                    .col(string(UserProfile::Username).unique_key())
                    .col(integer_null(UserProfile::CustomerId))
                    .col(boolean(UserProfile::IsAnalyst).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profile_customer")
                            .from(UserProfile::Table, UserProfile::CustomerId)
                            .to(Customer::Table, Customer::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Source::Table)
                    .if_not_exists()
                    .col(pk_auto(Source::Id))
                    .col(string(Source::Name).unique_key())
                    .col(string(Source::Description))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rule::Table)
                    .if_not_exists()
                    .col(pk_auto(Rule::Id))
                    .col(string(Rule::Name).unique_key())
                    .col(string(Rule::Description))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MitigationStrategy::Table)
                    .if_not_exists()
                    .col(pk_auto(MitigationStrategy::Id))
                    .col(string(MitigationStrategy::Description))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(pk_auto(Alert::Id))
                    .col(string(Alert::Title))
                    .col(string(Alert::Description))
                    .col(timestamp_with_time_zone(Alert::CreatedAt))
                    .col(integer(Alert::EndpointId))
                    .col(integer(Alert::SourceId))
                    .col(integer(Alert::CustomerId))
                    .col(integer_null(Alert::ValidatorId))
                    .col(timestamp_with_time_zone_null(Alert::ValidatedAt))
                    .col(string_len(Alert::Status, 50).default("open"))
                    .col(string_len(Alert::ClosureCode, 50).default("NA"))
                    .col(integer_null(Alert::MitigationStrategyId))
                    .col(string_len(Alert::Mitigation, 50).default("NA"))
                    .col(timestamp_with_time_zone_null(Alert::ResolvedAt))
                    .col(integer_null(Alert::ResolverId))
                    .col(string_len(Alert::Severity, 10).default("low"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_endpoint")
                            .from(Alert::Table, Alert::EndpointId)
                            .to(Endpoint::Table, Endpoint::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_source")
                            .from(Alert::Table, Alert::SourceId)
                            .to(Source::Table, Source::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_customer")
                            .from(Alert::Table, Alert::CustomerId)
                            .to(Customer::Table, Customer::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_validator")
                            .from(Alert::Table, Alert::ValidatorId)
                            .to(UserProfile::Table, UserProfile::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_resolver")
                            .from(Alert::Table, Alert::ResolverId)
                            .to(UserProfile::Table, UserProfile::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_mitigation_strategy")
                            .from(Alert::Table, Alert::MitigationStrategyId)
                            .to(MitigationStrategy::Table, MitigationStrategy::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlertRule::Table)
                    .if_not_exists()
                    .col(integer(AlertRule::AlertId))
                    .col(integer(AlertRule::RuleId))
                    .primary_key(
                        Index::create()
                            .col(AlertRule::AlertId)
                            .col(AlertRule::RuleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_rule_alert")
                            .from(AlertRule::Table, AlertRule::AlertId)
                            .to(Alert::Table, Alert::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_rule_rule")
                            .from(AlertRule::Table, AlertRule::RuleId)
                            .to(Rule::Table, Rule::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertRule::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MitigationStrategy::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rule::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Source::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Endpoint::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Customer {
    Table,
    Id,
    CompanyName,
    Industry,
    ContactEmail,
}

#[derive(DeriveIden)]
pub enum Endpoint {
    Table,
    Id,
    CustomerId,
    Host,
    Ip,
    Name,
    Kind,
    IsActive,
}

#[derive(DeriveIden)]
pub enum UserProfile {
    Table,
    Id,
    Username,
    CustomerId,
    IsAnalyst,
}

#[derive(DeriveIden)]
pub enum Source {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum Rule {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
pub enum MitigationStrategy {
    Table,
    Id,
    Description,
}

#[derive(DeriveIden)]
pub enum Alert {
    Table,
    Id,
    Title,
    Description,
    CreatedAt,
    EndpointId,
    SourceId,
    CustomerId,
    ValidatorId,
    ValidatedAt,
    Status,
    ClosureCode,
    MitigationStrategyId,
    Mitigation,
    ResolvedAt,
    ResolverId,
    Severity,
}

#[derive(DeriveIden)]
pub enum AlertRule {
    Table,
    AlertId,
    RuleId,
}
