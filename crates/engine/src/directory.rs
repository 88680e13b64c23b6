//! Participant resolution.
//!
//! Expenses name their participants by an external reference (the user's
//! email). Before any share is computed, every reference is resolved against
//! a [`UserDirectory`]; a single unknown reference aborts the whole expense.

use std::future::Future;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Split};

/// Resolved identity of a participant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Read-only lookup of users by participant reference.
pub trait UserDirectory: Sync {
    /// Looks up a single reference. `Ok(None)` means the user does not exist.
    fn resolve_user(
        &self,
        reference: &str,
    ) -> impl Future<Output = ResultEngine<Option<UserIdentity>>> + Send;

    /// Resolves every reference, preserving input order.
    ///
    /// Fails with [`EngineError::ParticipantNotFound`] on the first reference
    /// that does not resolve. Implementations backed by a database should
    /// override this with a single query.
    fn resolve_users(
        &self,
        references: &[String],
    ) -> impl Future<Output = ResultEngine<Vec<UserIdentity>>> + Send {
        async move {
            let mut resolved = Vec::with_capacity(references.len());
            for reference in references {
                match self.resolve_user(reference).await? {
                    Some(user) => resolved.push(user),
                    None => return Err(EngineError::ParticipantNotFound(reference.clone())),
                }
            }
            Ok(resolved)
        }
    }
}

/// Canonical form of a participant reference: NFKC, trimmed, lowercase.
pub(crate) fn normalize_reference(reference: &str) -> String {
    reference.trim().nfkc().collect::<String>().to_lowercase()
}

/// Replaces every participant reference of `split` with its identity.
///
/// Order is preserved. Either every participant resolves, or the first
/// missing one is reported and nothing is returned.
pub async fn resolve_split<D>(directory: &D, split: Split<String>) -> ResultEngine<Split<UserIdentity>>
where
    D: UserDirectory + ?Sized,
{
    let references: Vec<String> = split.participants().into_iter().cloned().collect();
    tracing::debug!(participants = references.len(), "resolving participants");

    let users = directory.resolve_users(&references).await?;
    if users.len() != references.len() {
        let missing = references.get(users.len()).cloned().unwrap_or_default();
        return Err(EngineError::ParticipantNotFound(missing));
    }

    Ok(split.zip_participants(users))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use rust_decimal::Decimal;

    use super::*;
    use crate::MoneyCents;

    /// In-memory directory keyed by normalized email.
    #[derive(Default)]
    pub(crate) struct MemoryDirectory {
        users: HashMap<String, UserIdentity>,
        pub(crate) lookups: AtomicUsize,
    }

    impl MemoryDirectory {
        pub(crate) fn with_users(names: &[&str]) -> Self {
            let users = names
                .iter()
                .map(|name| {
                    let user = UserIdentity {
                        id: Uuid::new_v4(),
                        email: format!("{name}@example.com"),
                        name: (*name).to_string(),
                    };
                    (user.email.clone(), user)
                })
                .collect();
            Self {
                users,
                lookups: AtomicUsize::new(0),
            }
        }

        pub(crate) fn user(&self, name: &str) -> UserIdentity {
            self.users[&format!("{name}@example.com")].clone()
        }
    }

    impl UserDirectory for MemoryDirectory {
        async fn resolve_user(&self, reference: &str) -> ResultEngine<Option<UserIdentity>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.users.get(&normalize_reference(reference)).cloned())
        }
    }

    fn refs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("{n}@example.com")).collect()
    }

    #[tokio::test]
    async fn resolves_in_input_order() {
        let directory = MemoryDirectory::with_users(&["ann", "bob", "cid"]);
        let split = Split::Equal(refs(&["cid", "ann", "bob"]));

        let resolved = resolve_split(&directory, split).await.unwrap();

        assert_eq!(
            resolved,
            Split::Equal(vec![
                directory.user("cid"),
                directory.user("ann"),
                directory.user("bob")
            ])
        );
    }

    #[tokio::test]
    async fn keeps_raw_shares_next_to_their_participant() {
        let directory = MemoryDirectory::with_users(&["ann", "bob"]);
        let split = Split::Percentage(vec![
            ("bob@example.com".to_string(), Decimal::from(70)),
            ("ann@example.com".to_string(), Decimal::from(30)),
        ]);

        let resolved = resolve_split(&directory, split).await.unwrap();

        assert_eq!(
            resolved,
            Split::Percentage(vec![
                (directory.user("bob"), Decimal::from(70)),
                (directory.user("ann"), Decimal::from(30)),
            ])
        );
    }

    #[tokio::test]
    async fn unknown_reference_fails_fast() {
        let directory = MemoryDirectory::with_users(&["ann", "bob"]);
        let split = Split::Exact(vec![
            ("ann@example.com".to_string(), MoneyCents::new(100)),
            ("ghost@example.com".to_string(), MoneyCents::new(100)),
            ("bob@example.com".to_string(), MoneyCents::new(100)),
        ]);

        let err = resolve_split(&directory, split).await.unwrap_err();

        assert_eq!(
            err,
            EngineError::ParticipantNotFound("ghost@example.com".to_string())
        );
        // bob is never looked up
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_reference_is_reported_as_sent() {
        let directory = MemoryDirectory::with_users(&["ann"]);
        let split = Split::Equal(vec![
            " ANN@example.com".to_string(),
            " Ghost@Example.COM".to_string(),
        ]);

        let err = resolve_split(&directory, split).await.unwrap_err();

        assert_eq!(
            err,
            EngineError::ParticipantNotFound(" Ghost@Example.COM".to_string())
        );
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let directory = MemoryDirectory::with_users(&["ann", "bob"]);
        let references = refs(&["bob", "ann", "bob"]);

        let first = directory.resolve_users(&references).await.unwrap();
        let second = directory.resolve_users(&references).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn references_are_normalized() {
        assert_eq!(normalize_reference("  Ann@Example.COM "), "ann@example.com");
        // fullwidth letters fold to ASCII
        assert_eq!(normalize_reference("ｂｏｂ@example.com"), "bob@example.com");
    }
}
