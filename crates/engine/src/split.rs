//! Split methods and the share calculator.
//!
//! A [`Split`] pairs every participant with the raw share the caller supplied
//! for the chosen method. The participant type is generic: submissions carry
//! references (`Split<String>`), the resolver turns them into identities
//! (`Split<UserIdentity>`) and [`calculate_shares`] produces the final,
//! validated [`ParticipantShare`]s.

use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ParticipantShare, ResultEngine, UserIdentity};

/// Strategy used to allocate an expense total across participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percentage => "percentage",
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SplitMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "exact" => Ok(Self::Exact),
            "percentage" => Ok(Self::Percentage),
            _ => Err(EngineError::InvalidSplitMethod(value.to_string())),
        }
    }
}

impl FromStr for SplitMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Participants of an expense together with their raw shares.
///
/// - `Equal`: raw shares are ignored, only the participants matter.
/// - `Exact`: each participant owes exactly the given amount.
/// - `Percentage`: each participant owes the given percentage (0-100) of the
///   total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Split<P> {
    Equal(Vec<P>),
    Exact(Vec<(P, MoneyCents)>),
    Percentage(Vec<(P, Decimal)>),
}

impl<P> Split<P> {
    #[must_use]
    pub fn method(&self) -> SplitMethod {
        match self {
            Self::Equal(_) => SplitMethod::Equal,
            Self::Exact(_) => SplitMethod::Exact,
            Self::Percentage(_) => SplitMethod::Percentage,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Equal(participants) => participants.len(),
            Self::Exact(participants) => participants.len(),
            Self::Percentage(participants) => participants.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Participants in input order.
    pub fn participants(&self) -> Vec<&P> {
        match self {
            Self::Equal(participants) => participants.iter().collect(),
            Self::Exact(participants) => participants.iter().map(|(p, _)| p).collect(),
            Self::Percentage(participants) => participants.iter().map(|(p, _)| p).collect(),
        }
    }

    /// Replaces the participants, position by position, keeping the raw
    /// shares.
    ///
    /// `replacements` must have exactly one item per participant.
    pub(crate) fn zip_participants<Q>(self, replacements: Vec<Q>) -> Split<Q> {
        fn swap<P, Q, S>(pairs: Vec<(P, S)>, replacements: Vec<Q>) -> Vec<(Q, S)> {
            pairs
                .into_iter()
                .zip(replacements)
                .map(|((_, share), q)| (q, share))
                .collect()
        }

        match self {
            Self::Equal(_) => Split::Equal(replacements),
            Self::Exact(pairs) => Split::Exact(swap(pairs, replacements)),
            Self::Percentage(pairs) => Split::Percentage(swap(pairs, replacements)),
        }
    }
}

/// How far caller-supplied shares may drift from the amount they must add up
/// to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitTolerances {
    /// Maximum `|sum(shares) - total|` for exact splits.
    pub exact: MoneyCents,
    /// Maximum `|sum(percentages) - 100|` for percentage splits, in
    /// percentage points.
    pub percentage: Decimal,
}

impl SplitTolerances {
    pub fn new(exact: MoneyCents, percentage: Decimal) -> ResultEngine<Self> {
        if exact.is_negative() {
            return Err(EngineError::InvalidAmount(
                "exact tolerance must be >= 0".to_string(),
            ));
        }
        if percentage.is_sign_negative() {
            return Err(EngineError::InvalidAmount(
                "percentage tolerance must be >= 0".to_string(),
            ));
        }
        Ok(Self { exact, percentage })
    }
}

impl Default for SplitTolerances {
    fn default() -> Self {
        Self {
            exact: MoneyCents::new(10_00),
            percentage: Decimal::TWO,
        }
    }
}

/// Computes and validates the final share of every participant.
///
/// Output order matches the input order. Nothing is rounded away silently:
/// equal splits hand leftover cents to the first participants, percentage
/// shares are rounded to the cent (midpoint away from zero).
pub fn calculate_shares(
    total: MoneyCents,
    split: Split<UserIdentity>,
    tolerances: &SplitTolerances,
) -> ResultEngine<Vec<ParticipantShare>> {
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "total must be > 0, got {total}"
        )));
    }
    if split.is_empty() {
        return Err(EngineError::InvalidAmount(
            "an expense needs at least one participant".to_string(),
        ));
    }

    match split {
        Split::Equal(users) => {
            let shares = equal_shares(total, users.len())?;
            Ok(users
                .into_iter()
                .zip(shares)
                .map(|(user, share)| ParticipantShare { user, share })
                .collect())
        }
        Split::Exact(pairs) => {
            validate_exact(total, &pairs, tolerances.exact)?;
            Ok(pairs
                .into_iter()
                .map(|(user, share)| ParticipantShare { user, share })
                .collect())
        }
        Split::Percentage(pairs) => {
            validate_percentages(&pairs, tolerances.percentage)?;
            pairs
                .into_iter()
                .map(|(user, percentage)| {
                    percentage_share(total, percentage)
                        .map(|share| ParticipantShare { user, share })
                })
                .collect()
        }
    }
}

/// `total / count` at cent precision; the `total mod count` leftover cents go
/// to the first participants, one each.
fn equal_shares(total: MoneyCents, count: usize) -> ResultEngine<Vec<MoneyCents>> {
    let count = i64::try_from(count)
        .map_err(|_| EngineError::InvalidAmount("too many participants".to_string()))?;
    let base = total.cents() / count;
    let remainder = total.cents() % count;
    Ok((0..count)
        .map(|position| MoneyCents::new(base + i64::from(position < remainder)))
        .collect())
}

fn validate_exact<P>(
    total: MoneyCents,
    pairs: &[(P, MoneyCents)],
    tolerance: MoneyCents,
) -> ResultEngine<()> {
    if let Some((_, share)) = pairs.iter().find(|(_, share)| share.is_negative()) {
        return Err(EngineError::InvalidAmount(format!(
            "share must be >= 0, got {share}"
        )));
    }

    let overflow = || EngineError::InvalidAmount("shares too large".to_string());
    let shares = MoneyCents::checked_sum(pairs.iter().map(|(_, share)| *share))
        .ok_or_else(overflow)?;
    let diff = shares
        .checked_sub(total)
        .and_then(MoneyCents::checked_abs)
        .ok_or_else(overflow)?;

    if diff > tolerance {
        tracing::warn!(%total, %shares, "exact shares rejected");
        return Err(EngineError::ShareMismatch { total, shares });
    }
    Ok(())
}

fn validate_percentages<P>(pairs: &[(P, Decimal)], tolerance: Decimal) -> ResultEngine<()> {
    if let Some((_, percentage)) = pairs
        .iter()
        .find(|(_, percentage)| percentage.is_sign_negative() && !percentage.is_zero())
    {
        return Err(EngineError::InvalidAmount(format!(
            "percentage must be >= 0, got {percentage}"
        )));
    }

    let total = pairs
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, percentage)| acc.checked_add(*percentage))
        .ok_or_else(|| EngineError::InvalidAmount("percentages too large".to_string()))?;

    if (total - Decimal::ONE_HUNDRED).abs() > tolerance {
        tracing::warn!(%total, "percentage shares rejected");
        return Err(EngineError::PercentageMismatch { total });
    }
    Ok(())
}

fn percentage_share(total: MoneyCents, percentage: Decimal) -> ResultEngine<MoneyCents> {
    let share = total
        .to_decimal()
        .checked_mul(percentage)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| EngineError::InvalidAmount("share too large".to_string()))?;
    MoneyCents::try_from(share.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
