//! Store selection and ledger service wiring.
//!
//! This is the only place stores are constructed. Handlers receive the finished
//! service through an `Extension`.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use bankcore_infra::store::{
    AccountStore, InMemoryAccountStore, InMemoryTransactionStore, PostgresAccountStore,
    PostgresTransactionStore, TransactionStore, postgres::ensure_schema,
};
use bankcore_infra::LedgerService;

use crate::config::StoreBackend;

/// Ledger service over type-erased stores, shared by all handlers.
pub type SharedLedger = Arc<LedgerService<Arc<dyn AccountStore>, Arc<dyn TransactionStore>>>;

/// In-memory wiring (dev/test).
pub fn in_memory() -> SharedLedger {
    let accounts: Arc<dyn AccountStore> = Arc::new(InMemoryAccountStore::new());
    let transactions: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactionStore::new());
    Arc::new(LedgerService::new(accounts, transactions))
}

pub async fn build_services(backend: &StoreBackend) -> anyhow::Result<SharedLedger> {
    match backend {
        StoreBackend::InMemory => {
            tracing::warn!("using in-memory stores; data is lost on restart");
            Ok(in_memory())
        }
        StoreBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            ensure_schema(&pool)
                .await
                .context("failed to create ledger schema")?;

            let accounts: Arc<dyn AccountStore> = Arc::new(PostgresAccountStore::new(pool.clone()));
            let transactions: Arc<dyn TransactionStore> =
                Arc::new(PostgresTransactionStore::new(pool));
            tracing::info!("using Postgres stores");
            Ok(Arc::new(LedgerService::new(accounts, transactions)))
        }
    }
}
