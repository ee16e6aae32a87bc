//! Process-local user store used when no database is configured.
//!
//! Ids are assigned from a monotonically increasing counter starting at one.
//! Email uniqueness is exact-match, mirroring the `users.email` constraint.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use mockable::Clock;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{CredentialRecord, NewUser, PasswordHash, UserId, UserIdentity};

/// `DashMap`-backed [`UserStore`].
pub struct InMemoryUserStore {
    users: DashMap<UserId, CredentialRecord>,
    emails: DashMap<String, UserId>,
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserStore {
    /// Build an empty store stamping creation times from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicI64::new(1),
            clock,
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are stored.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl std::fmt::Debug for InMemoryUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryUserStore")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(
        &self,
        draft: &NewUser,
        password_hash: &PasswordHash,
    ) -> Result<UserIdentity, UserStoreError> {
        match self.emails.entry(draft.email.clone()) {
            Entry::Occupied(_) => Err(UserStoreError::duplicate_email()),
            Entry::Vacant(slot) => {
                let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
                let id = UserId::new(raw)
                    .map_err(|err| UserStoreError::query(format!("id allocation: {err}")))?;
                let identity = UserIdentity::new(id, draft.clone(), self.clock.utc());
                self.users.insert(
                    id,
                    CredentialRecord {
                        identity: identity.clone(),
                        password_hash: password_hash.clone(),
                    },
                );
                slot.insert(id);
                Ok(identity)
            }
        }
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserStoreError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, UserStoreError> {
        Ok(self.users.get(&id).map(|entry| entry.identity.clone()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> InMemoryUserStore {
        InMemoryUserStore::new(Arc::new(DefaultClock))
    }

    fn draft(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            email: email.to_owned(),
            role: "user".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn assigns_increasing_ids_from_one(store: InMemoryUserStore) {
        let hash = PasswordHash::new("hash");
        let first = store
            .create_user(&draft("alice", "alice@x.com"), &hash)
            .await
            .expect("create alice");
        let second = store
            .create_user(&draft("bob", "bob@x.com"), &hash)
            .await
            .expect("create bob");

        assert_eq!(first.id().get(), 1);
        assert_eq!(second.id().get(), 2);
        assert_eq!(store.len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_duplicate_email(store: InMemoryUserStore) {
        let hash = PasswordHash::new("hash");
        store
            .create_user(&draft("alice", "alice@x.com"), &hash)
            .await
            .expect("create alice");

        let err = store
            .create_user(&draft("alice2", "alice@x.com"), &hash)
            .await
            .expect_err("duplicate email");

        assert_eq!(err, UserStoreError::DuplicateEmail);
        assert_eq!(store.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn lookups_return_identity_and_hash(store: InMemoryUserStore) {
        let hash = PasswordHash::new("stored-hash");
        let created = store
            .create_user(&draft("alice", "alice@x.com"), &hash)
            .await
            .expect("create alice");

        let record = store
            .find_by_email("alice@x.com")
            .await
            .expect("lookup")
            .expect("record present");
        assert_eq!(record.identity, created);
        assert_eq!(record.password_hash, hash);

        let by_id = store.find_by_id(created.id()).await.expect("lookup");
        assert_eq!(by_id, Some(created));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_users_are_none(store: InMemoryUserStore) {
        assert!(
            store
                .find_by_email("nobody@x.com")
                .await
                .expect("lookup")
                .is_none()
        );
        let id = UserId::new(99).expect("valid id");
        assert!(store.find_by_id(id).await.expect("lookup").is_none());
    }
}
