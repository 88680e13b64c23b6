//! One row per participant share, ordered by `position` inside its expense.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::ParticipantShare;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub position: i32,
    pub user_id: String,
    pub share_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new(expense_id: Uuid, position: i32, participant: &ParticipantShare) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            expense_id: ActiveValue::Set(expense_id.to_string()),
            position: ActiveValue::Set(position),
            user_id: ActiveValue::Set(participant.user.id.to_string()),
            share_minor: ActiveValue::Set(participant.share.cents()),
        }
    }
}
