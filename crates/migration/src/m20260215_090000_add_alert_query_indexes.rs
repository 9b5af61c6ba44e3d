use sea_orm_migration::prelude::*;

use crate::m20260112_100000_create_alert_tracking_tables::{Alert, Endpoint};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Indexes backing the dashboard window queries and the filtered listings.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alert_customer_created_at")
                    .table(Alert::Table)
                    .col(Alert::CustomerId)
                    .col(Alert::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alert_status")
                    .table(Alert::Table)
                    .col(Alert::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alert_closure_code")
                    .table(Alert::Table)
                    .col(Alert::ClosureCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_endpoint_customer_id")
                    .table(Endpoint::Table)
                    .col(Endpoint::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_endpoint_customer_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_alert_closure_code").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_alert_status").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_alert_customer_created_at")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
