//! `SeaORM` Entity for the reversing-entry schedule queue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reversing_entry_queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub original_entry_id: i64,
    pub reverse_on: Date,
    pub deadline_on: Option<Date>,
    pub remind_on: Option<Date>,
    pub status: String,
    pub approval_required: bool,
    pub authorization_level: i32,
    pub reversed_entry_id: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_entries::Entity",
        from = "Column::OriginalEntryId",
        to = "super::journal_entries::Column::Id"
    )]
    JournalEntries,
    #[sea_orm(has_many = "super::reversing_entry_approvals::Entity")]
    Approvals,
    #[sea_orm(has_many = "super::reversing_entry_history::Entity")]
    History,
}

impl Related<super::journal_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::reversing_entry_approvals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::reversing_entry_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
