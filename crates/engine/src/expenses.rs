//! Expenses table.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::Expense;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub total_minor: i64,
    pub split_method: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    ExpenseParticipants,
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(Uuid, &Expense)> for ActiveModel {
    fn from((id, expense): (Uuid, &Expense)) -> Self {
        Self {
            id: ActiveValue::Set(id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            total_minor: ActiveValue::Set(expense.total.cents()),
            split_method: ActiveValue::Set(expense.split_method.as_str().to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}
