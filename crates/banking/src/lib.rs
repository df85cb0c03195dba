//! Banking module: money, accounts, transactions and the ledger operations that
//! tie them together.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Stores and the
//! use-case service live in `bankcore-infra`.

pub mod account;
pub mod error;
pub mod money;
pub mod operation;
pub mod transaction;

pub use account::{Account, AccountSnapshot};
pub use error::{LedgerError, LedgerResult};
pub use money::Money;
pub use operation::{Outcome, Staged};
pub use transaction::{
    ShapeViolation, Transaction, TransactionKind, TransactionSnapshot, TransactionStatus,
};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the ledger persists (microseconds).
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
