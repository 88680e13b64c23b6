//! Boundary parsing of raw expense submissions.
//!
//! Requests arrive loosely typed: the split method is free text and every
//! participant carries an optional decimal whose meaning depends on the
//! method. [`ExpenseSubmission::parse`] turns that into a typed [`Split`] so
//! that unknown methods and malformed shares are rejected before any user
//! lookup happens. References are kept as sent; the directory normalizes them
//! for lookup.

use rust_decimal::Decimal;

use crate::{
    EngineError, MoneyCents, ResultEngine, Split, SplitMethod, util::normalize_required_text,
};

/// A participant as submitted by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawParticipant {
    /// External reference (email) of the participant.
    pub reference: String,
    /// Amount (exact split) or percentage (percentage split). Ignored for
    /// equal splits.
    pub share: Option<Decimal>,
}

impl RawParticipant {
    pub fn new(reference: impl Into<String>, share: Option<Decimal>) -> Self {
        Self {
            reference: reference.into(),
            share,
        }
    }
}

/// A parsed expense, ready for participant resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseSubmission {
    pub description: String,
    pub total: MoneyCents,
    pub split: Split<String>,
}

impl ExpenseSubmission {
    /// Parses a raw submission.
    ///
    /// Checks, in order: split method, description, total, participant list,
    /// then every raw share.
    pub fn parse(
        description: &str,
        total: Decimal,
        split_method: &str,
        participants: Vec<RawParticipant>,
    ) -> ResultEngine<Self> {
        let method = SplitMethod::try_from(split_method)?;

        let description = normalize_required_text(description, "description")?;

        let total = MoneyCents::try_from(total)?;
        if !total.is_positive() {
            return Err(EngineError::InvalidAmount(format!(
                "total must be > 0, got {total}"
            )));
        }

        if participants.is_empty() {
            return Err(EngineError::InvalidAmount(
                "an expense needs at least one participant".to_string(),
            ));
        }

        let split = match method {
            SplitMethod::Equal => Split::Equal(
                participants.into_iter().map(|p| p.reference).collect(),
            ),
            SplitMethod::Exact => Split::Exact(
                participants
                    .into_iter()
                    .map(|p| {
                        let share = required_share(&p)?;
                        Ok((p.reference, MoneyCents::try_from(share)?))
                    })
                    .collect::<ResultEngine<_>>()?,
            ),
            SplitMethod::Percentage => Split::Percentage(
                participants
                    .into_iter()
                    .map(|p| {
                        let share = required_share(&p)?;
                        Ok((p.reference, share))
                    })
                    .collect::<ResultEngine<_>>()?,
            ),
        };

        Ok(Self {
            description,
            total,
            split,
        })
    }
}

fn required_share(participant: &RawParticipant) -> ResultEngine<Decimal> {
    participant.share.ok_or_else(|| {
        EngineError::InvalidAmount(format!(
            "missing share for participant \"{}\"",
            participant.reference
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(reference: &str, share: Option<i64>) -> RawParticipant {
        RawParticipant::new(reference, share.map(Decimal::from))
    }

    #[test]
    fn equal_split_ignores_shares_and_keeps_references_verbatim() {
        let submission = ExpenseSubmission::parse(
            " Dinner ",
            Decimal::from(300),
            "equal",
            vec![raw("A@example.com", Some(5)), raw("b@example.com", None)],
        )
        .unwrap();

        assert_eq!(submission.description, "Dinner");
        assert_eq!(submission.total, MoneyCents::new(300_00));
        assert_eq!(
            submission.split,
            Split::Equal(vec![
                "A@example.com".to_string(),
                "b@example.com".to_string()
            ])
        );
    }

    #[test]
    fn exact_split_converts_shares_to_cents() {
        let submission = ExpenseSubmission::parse(
            "Taxi",
            Decimal::new(4550, 2),
            "exact",
            vec![RawParticipant::new("a@example.com", Some(Decimal::new(4550, 2)))],
        )
        .unwrap();

        assert_eq!(
            submission.split,
            Split::Exact(vec![("a@example.com".to_string(), MoneyCents::new(4550))])
        );
    }

    #[test]
    fn unknown_method_is_rejected_first() {
        let err = ExpenseSubmission::parse("", Decimal::ZERO, "weekly", vec![]).unwrap_err();
        assert_eq!(err, EngineError::InvalidSplitMethod("weekly".to_string()));
    }

    #[test]
    fn blank_description_is_rejected() {
        let err =
            ExpenseSubmission::parse("  ", Decimal::from(10), "equal", vec![raw("a", None)])
                .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn invalid_totals_and_empty_participants_are_rejected() {
        for total in [Decimal::ZERO, Decimal::from(-5)] {
            let err = ExpenseSubmission::parse("x", total, "equal", vec![raw("a", None)])
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }

        let err = ExpenseSubmission::parse("x", Decimal::new(1001, 3), "equal", vec![raw("a", None)])
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));

        let err = ExpenseSubmission::parse("x", Decimal::from(10), "equal", vec![]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn missing_shares_are_rejected_for_exact_and_percentage() {
        for method in ["exact", "percentage"] {
            let err = ExpenseSubmission::parse(
                "x",
                Decimal::from(10),
                method,
                vec![raw("a", Some(5)), raw("b", None)],
            )
            .unwrap_err();
            assert_eq!(
                err,
                EngineError::InvalidAmount("missing share for participant \"b\"".to_string())
            );
        }
    }

    #[test]
    fn percentages_keep_their_precision() {
        let submission = ExpenseSubmission::parse(
            "x",
            Decimal::from(10),
            "percentage",
            vec![RawParticipant::new("a", Some(Decimal::new(33_333, 3)))],
        )
        .unwrap();
        assert_eq!(
            submission.split,
            Split::Percentage(vec![("a".to_string(), Decimal::new(33_333, 3))])
        );
    }
}
