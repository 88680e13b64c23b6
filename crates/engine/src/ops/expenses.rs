use std::collections::{BTreeSet, HashMap};

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseNewCmd, ExpenseSubmission, MoneyCents, ParticipantShare,
    ResultEngine, SplitMethod, StoredExpense, UserIdentity, build_expense, expense_participants,
    expenses, users, util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a shared expense.
    ///
    /// Runs the full pipeline (parse, resolve participants, compute shares,
    /// assemble) and then writes the expense together with its shares in a
    /// single DB transaction. Nothing is written if any step fails.
    pub async fn create_expense(&self, cmd: ExpenseNewCmd) -> ResultEngine<StoredExpense> {
        let submission = ExpenseSubmission::parse(
            &cmd.description,
            cmd.total,
            &cmd.split_method,
            cmd.participants,
        )?;
        let expense =
            build_expense(self, self.clock.as_ref(), &self.tolerances, submission).await?;
        let id = Uuid::new_v4();

        with_tx!(self, |db_tx| {
            async {
                expenses::ActiveModel::from((id, &expense))
                    .insert(&db_tx)
                    .await?;
                for (position, participant) in expense.participants.iter().enumerate() {
                    let position = i32::try_from(position).map_err(|_| {
                        EngineError::InvalidAmount("too many participants".to_string())
                    })?;
                    expense_participants::ActiveModel::new(id, position, participant)
                        .insert(&db_tx)
                        .await?;
                }
                Ok::<(), EngineError>(())
            }
            .await
        })?;

        tracing::info!(
            expense_id = %id,
            method = %expense.split_method,
            total = %expense.total,
            participants = expense.participants.len(),
            "expense created"
        );
        Ok(StoredExpense { id, expense })
    }

    /// Returns a single expense with its shares.
    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<StoredExpense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

        self.load_expenses(vec![model])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    /// All expenses, newest first.
    pub async fn list_expenses(&self) -> ResultEngine<Vec<StoredExpense>> {
        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        self.load_expenses(models).await
    }

    /// Expenses `user_id` takes part in, newest first.
    pub async fn expenses_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<StoredExpense>> {
        self.user(user_id).await?;

        let expense_ids: BTreeSet<String> = expense_participants::Entity::find()
            .filter(expense_participants::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|row| row.expense_id)
            .collect();
        if expense_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = expenses::Entity::find()
            .filter(expenses::Column::Id.is_in(expense_ids))
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        self.load_expenses(models).await
    }

    /// Attaches shares and participant identities to expense rows, keeping
    /// the order of `models` and the stored order of the shares.
    async fn load_expenses(
        &self,
        models: Vec<expenses::Model>,
    ) -> ResultEngine<Vec<StoredExpense>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let expense_ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
        let rows = expense_participants::Entity::find()
            .filter(expense_participants::Column::ExpenseId.is_in(expense_ids))
            .order_by_asc(expense_participants::Column::ExpenseId)
            .order_by_asc(expense_participants::Column::Position)
            .all(&self.database)
            .await?;

        let user_ids: BTreeSet<String> = rows.iter().map(|row| row.user_id.clone()).collect();
        let mut identities: HashMap<String, UserIdentity> = HashMap::new();
        for model in users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.database)
            .await?
        {
            identities.insert(model.id.clone(), UserIdentity::try_from(model)?);
        }

        let mut shares: HashMap<String, Vec<ParticipantShare>> = HashMap::new();
        for row in rows {
            let user = identities
                .get(&row.user_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            shares.entry(row.expense_id).or_default().push(ParticipantShare {
                user,
                share: MoneyCents::new(row.share_minor),
            });
        }

        models
            .into_iter()
            .map(|model| {
                let participants = shares.remove(&model.id).unwrap_or_default();
                Ok(StoredExpense {
                    id: parse_uuid(&model.id, "expense")?,
                    expense: Expense {
                        description: model.description,
                        total: MoneyCents::new(model.total_minor),
                        split_method: SplitMethod::try_from(model.split_method.as_str())?,
                        participants,
                        created_at: model.created_at,
                    },
                })
            })
            .collect()
    }
}
