//! `SeaORM` Entity for accounting periods.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounting_periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub is_closed: bool,
    pub is_current: bool,
    pub current_step: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entries::Entity")]
    JournalEntries,
    #[sea_orm(has_many = "super::cycle_step_status::Entity")]
    CycleStepStatus,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::cycle_step_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CycleStepStatus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
