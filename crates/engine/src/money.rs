use std::fmt;

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Every monetary value handled by the engine (expense totals, shares,
/// tolerances, balances) uses this type, so that split arithmetic never goes
/// through floating point.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Absolute value (returns `None` for `i64::MIN` cents).
    #[must_use]
    pub fn checked_abs(self) -> Option<MoneyCents> {
        self.0.checked_abs().map(MoneyCents)
    }

    /// Sums the amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, MoneyCents::checked_add)
    }

    /// The amount in currency units, with a scale of 2.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl TryFrom<Decimal> for MoneyCents {
    type Error = EngineError;

    /// Converts an amount in currency units into cents.
    ///
    /// Rejects values with more than 2 significant fractional digits instead
    /// of rounding them away.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > 2 {
            return Err(EngineError::InvalidAmount(format!(
                "too many decimals: {value}"
            )));
        }
        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.trunc().to_i64())
            .map(MoneyCents)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn decimal_conversion_keeps_cents() {
        assert_eq!(
            MoneyCents::try_from(Decimal::new(4050, 2)).unwrap(),
            MoneyCents::new(4050)
        );
        assert_eq!(
            MoneyCents::try_from(Decimal::from(300)).unwrap(),
            MoneyCents::new(300_00)
        );
        // trailing zeros are not significant
        assert_eq!(
            MoneyCents::try_from(Decimal::new(12_5000, 4)).unwrap(),
            MoneyCents::new(1250)
        );
        assert!(MoneyCents::try_from(Decimal::new(12_345, 3)).is_err());
        assert_eq!(MoneyCents::new(3334).to_decimal(), Decimal::new(3334, 2));
    }

    #[test]
    fn checked_sum_detects_overflow() {
        let amounts = [MoneyCents::new(1), MoneyCents::new(2), MoneyCents::new(3)];
        assert_eq!(MoneyCents::checked_sum(amounts), Some(MoneyCents::new(6)));
        assert_eq!(
            MoneyCents::checked_sum([MoneyCents::new(i64::MAX), MoneyCents::new(1)]),
            None
        );
    }
}
