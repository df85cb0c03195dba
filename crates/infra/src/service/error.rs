use thiserror::Error;

use bankcore_banking::LedgerError;
use bankcore_core::TransactionId;

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by the ledger use-case surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fieldless classification of a `ServiceError`, for callers that map errors to
/// responses without inspecting payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmount,
    InsufficientFunds,
    InvalidTransactionShape,
    AccountNotFound,
    TransactionNotFound,
    InvalidStatusTransition,
    InvalidAccountName,
    InvalidInput,
    ConcurrentModification,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAmount => "invalid_amount",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::InvalidTransactionShape => "invalid_transaction_shape",
            ErrorKind::AccountNotFound => "account_not_found",
            ErrorKind::TransactionNotFound => "transaction_not_found",
            ErrorKind::InvalidStatusTransition => "invalid_status_transition",
            ErrorKind::InvalidAccountName => "invalid_account_name",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ConcurrentModification => "concurrent_modification",
            ErrorKind::Storage => "storage_error",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Ledger(err) => match err {
                LedgerError::InvalidAmount(_) => ErrorKind::InvalidAmount,
                LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
                LedgerError::InvalidTransactionShape(_) => ErrorKind::InvalidTransactionShape,
                LedgerError::AccountNotFound(_) => ErrorKind::AccountNotFound,
                LedgerError::InvalidStatusTransition { .. } => ErrorKind::InvalidStatusTransition,
                LedgerError::InvalidAccountName(_) => ErrorKind::InvalidAccountName,
                LedgerError::Domain(_) => ErrorKind::InvalidInput,
            },
            ServiceError::TransactionNotFound(_) => ErrorKind::TransactionNotFound,
            ServiceError::Store(StoreError::ConcurrentModification { .. }) => {
                ErrorKind::ConcurrentModification
            }
            ServiceError::Store(_) => ErrorKind::Storage,
        }
    }
}
