//! `SeaORM` Entity for reviewer sign-offs on scheduled reversals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reversing_entry_approvals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub queue_id: i64,
    pub reviewer: String,
    pub role: String,
    pub level: i32,
    pub status: String,
    pub decided_on: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reversing_entry_queue::Entity",
        from = "Column::QueueId",
        to = "super::reversing_entry_queue::Column::Id"
    )]
    Queue,
}

impl Related<super::reversing_entry_queue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Queue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
