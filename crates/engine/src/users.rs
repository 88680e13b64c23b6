//! Users table and the `User` domain type.
//!
//! A user is referenced by expenses through its `id`; clients name
//! participants by `email`, which is unique and stored normalized.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, UserIdentity, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
}

impl User {
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub mobile: Option<String>,
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

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            email: ActiveValue::Set(user.email.clone()),
            name: ActiveValue::Set(user.name.clone()),
            mobile: ActiveValue::Set(user.mobile.clone()),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            name: model.name,
            mobile: model.mobile,
        })
    }
}

impl TryFrom<Model> for UserIdentity {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            name: model.name,
        })
    }
}
