//! Ledger use-case service (application-level orchestration).
//!
//! `LedgerService` is the inbound surface of the ledger core. It composes an
//! `AccountStore` and a `TransactionStore` that are handed to it once, at wiring
//! time, and runs every money movement through the same pipeline:
//!
//! ```text
//! Request
//!   ↓
//! 1. Load account(s) by domain id (AccountNotFound if any is missing)
//!   ↓
//! 2. Stage the ledger operation (shape check → balance mutation)
//!   ↓
//! 3a. Applied:  save account(s), then the COMPLETED transaction
//! 3b. Refused:  save the FAILED transaction only, then return the original error
//! 3c. An account write fails: save the transaction as FAILED, return the store error
//! ```
//!
//! Shape errors abort in step 2 before any transaction exists, so nothing is saved.
//! Once a transaction exists it is always recorded. When recording a FAILED
//! transaction itself fails, that store error is logged and the error that
//! failed the operation is still the one returned. No retries happen here.

mod error;
mod views;

use tracing::{error, info, instrument, warn};

use bankcore_banking::{Account, LedgerError, Money, Staged, Transaction, operation};
use bankcore_core::{AccountId, TransactionId};

use crate::store::{AccountStore, TransactionStore};

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use views::{AccountView, TransactionView};

pub struct LedgerService<A, T> {
    accounts: A,
    transactions: T,
}

impl<A, T> LedgerService<A, T>
where
    A: AccountStore,
    T: TransactionStore,
{
    pub fn new(accounts: A, transactions: T) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_account(
        &self,
        name: &str,
        initial_balance: Option<Money>,
    ) -> ServiceResult<AccountView> {
        let account = Account::open_with_balance(name, initial_balance.unwrap_or_default())?;
        let saved = self.accounts.save(&account).await?;

        info!(account_id = %saved.id_typed(), balance = %saved.balance(), "account opened");
        Ok(AccountView::from(&saved))
    }

    pub async fn get_account(&self, id: AccountId) -> ServiceResult<AccountView> {
        let account = self.load_account(id).await?;
        Ok(AccountView::from(&account))
    }

    pub async fn list_accounts(&self) -> ServiceResult<Vec<AccountView>> {
        let accounts = self.accounts.find_all().await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    #[instrument(skip(self, description), fields(amount = %amount))]
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: Money,
        description: &str,
    ) -> ServiceResult<TransactionView> {
        let mut target = self.load_account(account_id).await?;
        let staged = operation::stage_deposit(&mut target, amount, description)?;
        self.settle(staged, &[&target]).await
    }

    #[instrument(skip(self, description), fields(amount = %amount))]
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: Money,
        description: &str,
    ) -> ServiceResult<TransactionView> {
        let mut source = self.load_account(account_id).await?;
        let staged = operation::stage_withdrawal(&mut source, amount, description)?;
        self.settle(staged, &[&source]).await
    }

    /// Move money between two accounts.
    ///
    /// The debit and the credit are saved as two separate writes with no
    /// surrounding atomic boundary. If the second write fails the first one stays
    /// and the transaction is recorded as FAILED, so the partial debit is visible
    /// in the account history.
    #[instrument(skip(self, description), fields(amount = %amount))]
    pub async fn transfer(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Money,
        description: &str,
    ) -> ServiceResult<TransactionView> {
        let mut source = self.load_account(from_id).await?;
        let mut target = self.load_account(to_id).await?;
        let staged = operation::stage_transfer(&mut source, &mut target, amount, description)?;
        self.settle(staged, &[&source, &target]).await
    }

    pub async fn get_transaction(&self, id: TransactionId) -> ServiceResult<TransactionView> {
        self.transactions
            .find_by_id(id)
            .await?
            .map(|tx| TransactionView::from(&tx))
            .ok_or(ServiceError::TransactionNotFound(id))
    }

    pub async fn list_transactions(&self) -> ServiceResult<Vec<TransactionView>> {
        let transactions = self.transactions.find_all().await?;
        Ok(transactions.iter().map(TransactionView::from).collect())
    }

    /// Transactions where the account is source or target, newest first.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> ServiceResult<Vec<TransactionView>> {
        self.load_account(account_id).await?;
        let transactions = self.transactions.find_by_account_id(account_id).await?;
        Ok(transactions.iter().map(TransactionView::from).collect())
    }

    async fn load_account(&self, id: AccountId) -> ServiceResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::Ledger(LedgerError::AccountNotFound(id)))
    }

    async fn settle(&self, staged: Staged, touched: &[&Account]) -> ServiceResult<TransactionView> {
        if staged.is_applied() {
            for (written, account) in touched.iter().enumerate() {
                if let Err(store_err) = self.accounts.save(account).await {
                    let transaction = staged.abandon()?;
                    warn!(
                        transaction_id = %transaction.id_typed(),
                        kind = %transaction.kind(),
                        account_id = %account.id_typed(),
                        accounts_written = written,
                        error = %store_err,
                        "account write failed; recording transaction as FAILED"
                    );
                    self.record_failure(&transaction).await;
                    return Err(store_err.into());
                }
            }
        }

        let (transaction, error) = staged.finalize()?.into_parts();

        if let Some(err) = error {
            warn!(
                transaction_id = %transaction.id_typed(),
                kind = %transaction.kind(),
                error = %err,
                "ledger operation failed"
            );
            self.record_failure(&transaction).await;
            return Err(err.into());
        }

        self.transactions.save(&transaction).await?;

        info!(
            transaction_id = %transaction.id_typed(),
            kind = %transaction.kind(),
            amount = %transaction.amount(),
            "ledger operation completed"
        );
        Ok(TransactionView::from(&transaction))
    }

    // The caller returns the error that failed the operation; a store error here
    // is only logged.
    async fn record_failure(&self, transaction: &Transaction) {
        if let Err(store_err) = self.transactions.save(transaction).await {
            error!(
                transaction_id = %transaction.id_typed(),
                error = %store_err,
                "failed transaction could not be recorded"
            );
        }
    }
}
