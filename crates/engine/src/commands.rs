//! Command structs for engine write operations.
//!
//! These types group the parameters of user and expense creation, keeping
//! call sites readable and avoiding long argument lists.

use rust_decimal::Decimal;

use crate::RawParticipant;

/// Register a user.
#[derive(Clone, Debug)]
pub struct UserNewCmd {
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
}

impl UserNewCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            mobile: None,
        }
    }

    #[must_use]
    pub fn mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }
}

/// Record a shared expense.
///
/// Fields are kept raw on purpose: they are parsed by
/// [`ExpenseSubmission::parse`](crate::ExpenseSubmission::parse) when the
/// command is executed.
#[derive(Clone, Debug)]
pub struct ExpenseNewCmd {
    pub description: String,
    pub total: Decimal,
    pub split_method: String,
    pub participants: Vec<RawParticipant>,
}

impl ExpenseNewCmd {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        total: Decimal,
        split_method: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            total,
            split_method: split_method.into(),
            participants: Vec::new(),
        }
    }

    /// Add a participant without a raw share (equal splits).
    #[must_use]
    pub fn participant(mut self, reference: impl Into<String>) -> Self {
        self.participants.push(RawParticipant::new(reference, None));
        self
    }

    /// Add a participant with a raw share (amount or percentage).
    #[must_use]
    pub fn participant_share(mut self, reference: impl Into<String>, share: Decimal) -> Self {
        self.participants
            .push(RawParticipant::new(reference, Some(share)));
        self
    }

    #[must_use]
    pub fn participants(mut self, participants: Vec<RawParticipant>) -> Self {
        self.participants = participants;
        self
    }
}
