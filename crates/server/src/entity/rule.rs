use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// Named detection rule; an alert may cite several triggering rules.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "rule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::alert::Entity> for Entity {
    fn to() -> RelationDef {
        super::alert_rule::Relation::Alert.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::alert_rule::Relation::Rule.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
