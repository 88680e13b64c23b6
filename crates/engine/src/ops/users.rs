use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, UserDirectory, UserIdentity, UserNewCmd,
    directory::normalize_reference,
    users,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

impl Engine {
    /// Registers a new user.
    ///
    /// The email becomes the participant reference of the user and must be
    /// unique (case-insensitive).
    pub async fn create_user(&self, cmd: UserNewCmd) -> ResultEngine<User> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let email = normalize_reference(&cmd.email);
        if !is_plausible_email(&email) {
            return Err(EngineError::InvalidInput(format!("invalid email: {email}")));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            mobile: normalize_optional_text(cmd.mobile.as_deref()),
        };

        with_tx!(self, |db_tx| {
            async {
                let existing = users::Entity::find()
                    .filter(users::Column::Email.eq(user.email.as_str()))
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    return Err(EngineError::ExistingKey(user.email.clone()));
                }
                users::ActiveModel::from(&user).insert(&db_tx).await?;
                Ok::<(), EngineError>(())
            }
            .await
        })?;

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Returns the user with the given id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
            .and_then(User::try_from)
    }

    /// Returns the user registered with `email`.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_reference(email)))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
            .and_then(User::try_from)
    }

    /// All users, ordered by name.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::Name)
            .order_by_asc(users::Column::Email)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}

impl UserDirectory for Engine {
    async fn resolve_user(&self, reference: &str) -> ResultEngine<Option<UserIdentity>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(normalize_reference(reference)))
            .one(&self.database)
            .await?
            .map(UserIdentity::try_from)
            .transpose()
    }

    /// Resolves all references with a single query.
    async fn resolve_users(&self, references: &[String]) -> ResultEngine<Vec<UserIdentity>> {
        let emails: Vec<String> = references
            .iter()
            .map(|reference| normalize_reference(reference))
            .collect();

        let mut by_email: HashMap<String, UserIdentity> = HashMap::new();
        for model in users::Entity::find()
            .filter(users::Column::Email.is_in(emails.clone()))
            .all(&self.database)
            .await?
        {
            by_email.insert(model.email.clone(), UserIdentity::try_from(model)?);
        }

        emails
            .iter()
            .zip(references)
            .map(|(email, reference)| {
                by_email
                    .get(email)
                    .cloned()
                    .ok_or_else(|| EngineError::ParticipantNotFound(reference.clone()))
            })
            .collect()
    }
}
