//! Wire types shared by the HTTP server and its clients.
//!
//! Money crosses the wire in currency units as decimals (`"12.50"` or
//! `12.5`); responses always use strings with two decimals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub mobile: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub mobile: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserListResponse {
        pub users: Vec<UserView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SplitMethod {
        Equal,
        Exact,
        Percentage,
    }

    /// A participant of a new expense.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ParticipantNew {
        /// Email of a registered user.
        pub user: String,
        /// Amount owed (`exact`) or percentage of the total (`percentage`).
        /// Ignored by `equal` splits.
        pub share: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub total_amount: Decimal,
        /// `equal`, `exact` or `percentage`.
        ///
        /// Kept as free text so that unknown methods are reported by the
        /// engine rather than by the JSON decoder.
        pub split_method: String,
        pub participants: Vec<ParticipantNew>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ParticipantView {
        pub user_id: Uuid,
        pub name: String,
        pub email: String,
        pub share: Decimal,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub total_amount: Decimal,
        pub split_method: SplitMethod,
        pub participants: Vec<ParticipantView>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserBalanceView {
        pub user_id: Uuid,
        pub name: String,
        pub email: String,
        /// Sum of the user's shares across all expenses.
        pub owed: Decimal,
        pub expenses: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceSheet {
        pub balances: Vec<UserBalanceView>,
    }
}
