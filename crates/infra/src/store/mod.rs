//! Persistence boundary for accounts and transactions.
//!
//! The traits make no storage assumptions: the in-memory implementations back
//! tests and local development, the Postgres ones back deployments.
//!
//! ## Save semantics
//!
//! Both stores insert-or-update keyed by the **domain** identifier. Backends may
//! keep their own storage keys; those are never surfaced.
//!
//! `AccountStore::save` is version-guarded: a snapshot is accepted only when the
//! stored version still equals `Account::version()`. The stored version is then
//! bumped and the returned account carries it. A stale snapshot fails with
//! `StoreError::ConcurrentModification`.
//!
//! Saves of different aggregates are independent writes. Nothing here spans two
//! accounts, so a transfer that fails between its two saves leaves the debit
//! persisted without the credit.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bankcore_banking::{Account, Transaction};
use bankcore_core::{AccountId, TransactionId};

pub use in_memory::{InMemoryAccountStore, InMemoryTransactionStore};
pub use postgres::{PostgresAccountStore, PostgresTransactionStore};

/// Store operation error.
///
/// These are **infrastructure errors** as opposed to ledger errors (funds,
/// amounts, shapes).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(
        "concurrent modification of account {account_id}: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        account_id: AccountId,
        expected: u64,
        actual: u64,
    },

    /// A persisted record no longer satisfies the domain invariants.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        StoreError::Backend(value.to_string())
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// All accounts, oldest first.
    async fn find_all(&self) -> Result<Vec<Account>, StoreError>;

    /// Insert-or-update, version-guarded. Returns the account at its new version.
    async fn save(&self, account: &Account) -> Result<Account, StoreError>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// All transactions, newest first.
    async fn find_all(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Transactions where the account is source or target, newest first.
    async fn find_by_account_id(&self, id: AccountId) -> Result<Vec<Transaction>, StoreError>;

    /// Insert-or-update keyed by the transaction id.
    async fn save(&self, transaction: &Transaction) -> Result<Transaction, StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        (**self).find_all().await
    }

    async fn save(&self, account: &Account) -> Result<Account, StoreError> {
        (**self).save(account).await
    }
}

#[async_trait]
impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Transaction>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_account_id(&self, id: AccountId) -> Result<Vec<Transaction>, StoreError> {
        (**self).find_by_account_id(id).await
    }

    async fn save(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        (**self).save(transaction).await
    }
}

/// Newest first; ids break ties (UUIDv7 is time-ordered).
pub(crate) fn newest_first(transactions: &mut [Transaction]) {
    use bankcore_core::Entity;

    transactions.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(a.id()))
    });
}
