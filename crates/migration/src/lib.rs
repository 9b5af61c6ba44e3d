pub use sea_orm_migration::prelude::*;

mod m20260112_100000_create_alert_tracking_tables;
mod m20260215_090000_add_alert_query_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260112_100000_create_alert_tracking_tables::Migration),
            Box::new(m20260215_090000_add_alert_query_indexes::Migration),
        ]
    }
}
