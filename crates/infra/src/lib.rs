//! Infrastructure layer: account/transaction stores and the ledger use-case service.

pub mod service;
pub mod store;

pub use service::{AccountView, ErrorKind, LedgerService, ServiceError, TransactionView};
pub use store::{AccountStore, StoreError, TransactionStore};
