use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bankcore_banking::{Account, Transaction};
use bankcore_core::{AccountId, AggregateRoot, Entity, ExpectedVersion, TransactionId};

use super::{AccountStore, StoreError, TransactionStore, newest_first};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// In-memory account store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        let mut all: Vec<Account> = accounts.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(all)
    }

    async fn save(&self, account: &Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;

        let id = account.id_typed();
        let current = accounts.get(&id).map(|a| a.version()).unwrap_or(0);
        ExpectedVersion(account.version())
            .check(current)
            .map_err(|_| StoreError::ConcurrentModification {
                account_id: id,
                expected: account.version(),
                actual: current,
            })?;

        let mut stored = account.clone();
        stored.mark_persisted(current + 1);
        accounts.insert(id, stored.clone());
        Ok(stored)
    }
}

/// In-memory transaction store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let transactions = self.transactions.read().map_err(|_| poisoned())?;
        Ok(transactions.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let transactions = self.transactions.read().map_err(|_| poisoned())?;
        let mut all: Vec<Transaction> = transactions.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn find_by_account_id(&self, id: AccountId) -> Result<Vec<Transaction>, StoreError> {
        let transactions = self.transactions.read().map_err(|_| poisoned())?;
        let mut matching: Vec<Transaction> = transactions
            .values()
            .filter(|t| t.involves(id))
            .cloned()
            .collect();
        newest_first(&mut matching);
        Ok(matching)
    }

    async fn save(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        let mut transactions = self.transactions.write().map_err(|_| poisoned())?;
        transactions.insert(*transaction.id(), transaction.clone());
        Ok(transaction.clone())
    }
}
