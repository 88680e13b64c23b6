use std::collections::{HashMap, HashSet};

use sea_orm::prelude::*;

use crate::{EngineError, MoneyCents, ResultEngine, UserIdentity, expense_participants};

use super::Engine;

/// What a user owes across every recorded expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserBalance {
    pub user: UserIdentity,
    pub owed: MoneyCents,
    /// Number of distinct expenses the user takes part in.
    pub expenses: usize,
}

#[derive(Default)]
struct Tally<'a> {
    owed: MoneyCents,
    expenses: HashSet<&'a str>,
}

/// Sums shares per user id. Rows are `(user_id, expense_id, share_minor)`.
fn tally_shares<'a, I>(rows: I) -> ResultEngine<HashMap<&'a str, (MoneyCents, usize)>>
where
    I: IntoIterator<Item = (&'a str, &'a str, i64)>,
{
    let mut tallies: HashMap<&'a str, Tally<'a>> = HashMap::new();
    for (user_id, expense_id, share_minor) in rows {
        let tally = tallies.entry(user_id).or_default();
        tally.owed = tally
            .owed
            .checked_add(MoneyCents::new(share_minor))
            .ok_or_else(|| EngineError::InvalidAmount("balance too large".to_string()))?;
        tally.expenses.insert(expense_id);
    }

    Ok(tallies
        .into_iter()
        .map(|(user_id, tally)| (user_id, (tally.owed, tally.expenses.len())))
        .collect())
}

impl Engine {
    /// Per-user totals of every share recorded so far, ordered by name.
    ///
    /// Users without expenses are listed with a zero balance.
    pub async fn balances(&self) -> ResultEngine<Vec<UserBalance>> {
        let users = self.list_users().await?;
        let rows = expense_participants::Entity::find()
            .all(&self.database)
            .await?;

        let tallies = tally_shares(rows.iter().map(|row| {
            (
                row.user_id.as_str(),
                row.expense_id.as_str(),
                row.share_minor,
            )
        }))?;

        Ok(users
            .into_iter()
            .map(|user| {
                let (owed, expenses) = tallies
                    .get(user.id.to_string().as_str())
                    .copied()
                    .unwrap_or((MoneyCents::ZERO, 0));
                UserBalance {
                    user: user.identity(),
                    owed,
                    expenses,
                }
            })
            .collect())
    }
}
