//! The module contains the errors the engine can throw.
//!
//! Every error is terminal for the request that produced it and carries the
//! offending value:
//!
//! - [`ParticipantNotFound`] a participant reference could not be resolved.
//! - [`InvalidSplitMethod`] the split method is not `equal`, `exact` or
//!   `percentage`.
//! - [`ShareMismatch`] exact shares do not add up to the total.
//! - [`PercentageMismatch`] percentages do not add up to 100%.
//! - [`InvalidAmount`] non-positive totals, empty participant lists, bad
//!   shares.
//!
//!  [`ParticipantNotFound`]: EngineError::ParticipantNotFound
//!  [`InvalidSplitMethod`]: EngineError::InvalidSplitMethod
//!  [`ShareMismatch`]: EngineError::ShareMismatch
//!  [`PercentageMismatch`]: EngineError::PercentageMismatch
//!  [`InvalidAmount`]: EngineError::InvalidAmount
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;

use crate::MoneyCents;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("participant \"{0}\" not found")]
    ParticipantNotFound(String),
    #[error("invalid split method: \"{0}\"")]
    InvalidSplitMethod(String),
    #[error("shares add up to {shares} but the total is {total}")]
    ShareMismatch { total: MoneyCents, shares: MoneyCents },
    #[error("percentages add up to {total}%, expected 100%")]
    PercentageMismatch { total: Decimal },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ParticipantNotFound(a), Self::ParticipantNotFound(b)) => a == b,
            (Self::InvalidSplitMethod(a), Self::InvalidSplitMethod(b)) => a == b,
            (
                Self::ShareMismatch {
                    total: a_total,
                    shares: a_shares,
                },
                Self::ShareMismatch {
                    total: b_total,
                    shares: b_shares,
                },
            ) => a_total == b_total && a_shares == b_shares,
            (Self::PercentageMismatch { total: a }, Self::PercentageMismatch { total: b }) => {
                a == b
            }
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
