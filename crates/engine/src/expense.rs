//! The expense entity and the pipeline that produces it.
//!
//! ```text
//! ExpenseSubmission -> resolve_split -> calculate_shares -> Expense::assemble
//! ```
//!
//! Each step either hands a fully valid value to the next one or stops the
//! pipeline with an [`EngineError`](crate::EngineError).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Clock, ExpenseSubmission, MoneyCents, ResultEngine, SplitMethod, SplitTolerances,
    UserDirectory, UserIdentity, calculate_shares, resolve_split,
};

/// The amount a participant owes for one expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantShare {
    pub user: UserIdentity,
    pub share: MoneyCents,
}

/// A validated expense, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub description: String,
    pub total: MoneyCents,
    pub split_method: SplitMethod,
    pub participants: Vec<ParticipantShare>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Builds the canonical expense from already validated shares, stamping
    /// it with the clock's current time.
    pub fn assemble<C>(
        description: String,
        total: MoneyCents,
        split_method: SplitMethod,
        participants: Vec<ParticipantShare>,
        clock: &C,
    ) -> Self
    where
        C: Clock + ?Sized,
    {
        Self {
            description,
            total,
            split_method,
            participants,
            created_at: clock.now(),
        }
    }
}

/// An expense as stored, with its storage id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredExpense {
    pub id: Uuid,
    pub expense: Expense,
}

/// Runs the whole expense pipeline without touching storage.
///
/// Participant lookup is the only awaited step; if it fails nothing else is
/// computed.
pub async fn build_expense<D, C>(
    directory: &D,
    clock: &C,
    tolerances: &SplitTolerances,
    submission: ExpenseSubmission,
) -> ResultEngine<Expense>
where
    D: UserDirectory + ?Sized,
    C: Clock + ?Sized,
{
    let ExpenseSubmission {
        description,
        total,
        split,
    } = submission;
    let method = split.method();

    let resolved = resolve_split(directory, split).await?;
    let participants = calculate_shares(total, resolved, tolerances)?;
    tracing::debug!(%method, %total, participants = participants.len(), "shares computed");

    Ok(Expense::assemble(description, total, method, participants, clock))
}
