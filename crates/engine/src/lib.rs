//! Expense-splitting engine.
//!
//! Turns raw expense submissions into validated, persisted expenses:
//!
//! 1. [`ExpenseSubmission::parse`] maps the loosely typed request onto a
//!    [`Split`], rejecting unknown methods and malformed shares.
//! 2. [`resolve_split`] resolves participant references through a
//!    [`UserDirectory`].
//! 3. [`calculate_shares`] computes and validates the final shares.
//! 4. [`Expense::assemble`] stamps the result with the [`Clock`].
//!
//! [`build_expense`] runs the whole pipeline without storage;
//! [`Engine::create_expense`] runs it against the database and persists the
//! result.

pub use clock::{Clock, FixedClock, SystemClock};
pub use commands::{ExpenseNewCmd, UserNewCmd};
pub use directory::{UserDirectory, UserIdentity, resolve_split};
pub use error::EngineError;
pub use expense::{Expense, ParticipantShare, StoredExpense, build_expense};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, UserBalance};
pub use split::{Split, SplitMethod, SplitTolerances, calculate_shares};
pub use submission::{ExpenseSubmission, RawParticipant};
pub use users::User;

mod clock;
mod commands;
mod directory;
mod error;
mod expense;
mod expense_participants;
mod expenses;
mod money;
mod ops;
mod split;
mod submission;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
