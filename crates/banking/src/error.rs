//! Ledger error taxonomy.
//!
//! Every failure a caller may need to react to is its own variant, so callers
//! match on the kind instead of inspecting messages.

use thiserror::Error;

use bankcore_core::{AccountId, DomainError};

use crate::money::Money;
use crate::transaction::{ShapeViolation, TransactionStatus};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Deposit/withdraw amount was zero or negative.
    #[error("invalid amount {0}: must be greater than zero")]
    InvalidAmount(Money),

    #[error("insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Money,
        requested: Money,
    },

    /// Account references (or amount) do not fit the transaction kind.
    #[error("invalid transaction shape: {0}")]
    InvalidTransactionShape(ShapeViolation),

    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Attempt to leave a terminal transaction status.
    #[error("invalid transaction status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    #[error("invalid account name: {0}")]
    InvalidAccountName(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<ShapeViolation> for LedgerError {
    fn from(value: ShapeViolation) -> Self {
        LedgerError::InvalidTransactionShape(value)
    }
}
