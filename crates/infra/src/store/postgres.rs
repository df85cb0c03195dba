//! Postgres-backed account and transaction stores.
//!
//! ## Keys
//!
//! Each table has a `storage_key BIGSERIAL` primary key owned by the database and a
//! unique column holding the domain identifier. Lookups and upserts go through the
//! domain identifier only; the storage key never leaves this module.
//!
//! ## Error Mapping
//!
//! | Situation | StoreError |
//! |-----------|------------|
//! | Version guard matched no row | `ConcurrentModification` |
//! | Row violates a domain invariant on load | `Corrupt` |
//! | Any SQLx error | `Backend` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use bankcore_banking::{
    Account, AccountSnapshot, Money, Transaction, TransactionKind, TransactionSnapshot,
    TransactionStatus,
};
use bankcore_core::{AccountId, AggregateRoot, Entity, TransactionId};

use super::{AccountStore, StoreError, TransactionStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        storage_key BIGSERIAL PRIMARY KEY,
        account_id  UUID NOT NULL UNIQUE,
        name        TEXT NOT NULL CHECK (length(name) > 0),
        balance     NUMERIC(20, 2) NOT NULL CHECK (balance >= 0),
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        version     BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        storage_key     BIGSERIAL PRIMARY KEY,
        transaction_id  UUID NOT NULL UNIQUE,
        kind            TEXT NOT NULL,
        amount          NUMERIC(20, 2) NOT NULL CHECK (amount > 0),
        from_account_id UUID NULL,
        to_account_id   UUID NULL,
        description     TEXT NOT NULL,
        status          TEXT NOT NULL,
        created_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS transactions_from_idx ON transactions (from_account_id, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS transactions_to_idx ON transactions (to_account_id, created_at DESC)",
];

/// Create the ledger tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn to_db_version(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| StoreError::Corrupt(format!("version {version} overflows")))
}

fn from_db_version(version: i64) -> Result<u64, StoreError> {
    u64::try_from(version).map_err(|_| StoreError::Corrupt(format!("negative version {version}")))
}

fn money_from_row(row: &PgRow, column: &str) -> Result<Money, StoreError> {
    Money::new(row.try_get::<Decimal, _>(column)?).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
        let snapshot = AccountSnapshot {
            id: AccountId::from_uuid(row.try_get::<Uuid, _>("account_id")?),
            name: row.try_get("name")?,
            balance: money_from_row(row, "balance")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
            version: from_db_version(row.try_get("version")?)?,
        };
        Account::restore(snapshot).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn current_version(&self, id: AccountId) -> Result<u64, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM accounts WHERE account_id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        version.map(from_db_version).transpose().map(|v| v.unwrap_or(0))
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), fields(account_id = %id))]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT account_id, name, balance, created_at, updated_at, version
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::account_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, name, balance, created_at, updated_at, version
            FROM accounts
            ORDER BY created_at ASC, account_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::account_from_row).collect()
    }

    #[instrument(skip(self, account), fields(account_id = %account.id_typed(), version = account.version()))]
    async fn save(&self, account: &Account) -> Result<Account, StoreError> {
        let expected = account.version();
        let id = account.id_typed();

        // Insert only claims a fresh id; update only matches the expected version.
        let new_version: Option<i64> = if expected == 0 {
            sqlx::query_scalar(
                r#"
                INSERT INTO accounts (account_id, name, balance, created_at, updated_at, version)
                VALUES ($1, $2, $3, $4, $5, 1)
                ON CONFLICT (account_id) DO NOTHING
                RETURNING version
                "#,
            )
            .bind(id.as_uuid())
            .bind(account.name())
            .bind(account.balance().amount())
            .bind(account.created_at())
            .bind(account.updated_at())
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                r#"
                UPDATE accounts
                SET name = $2, balance = $3, updated_at = $4, version = version + 1
                WHERE account_id = $1 AND version = $5
                RETURNING version
                "#,
            )
            .bind(id.as_uuid())
            .bind(account.name())
            .bind(account.balance().amount())
            .bind(account.updated_at())
            .bind(to_db_version(expected)?)
            .fetch_optional(&self.pool)
            .await?
        };

        match new_version {
            Some(version) => {
                let mut stored = account.clone();
                stored.mark_persisted(from_db_version(version)?);
                Ok(stored)
            }
            None => Err(StoreError::ConcurrentModification {
                account_id: id,
                expected,
                actual: self.current_version(id).await?,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn transaction_from_row(row: &PgRow) -> Result<Transaction, StoreError> {
        let kind: String = row.try_get("kind")?;
        let status: String = row.try_get("status")?;

        let snapshot = TransactionSnapshot {
            id: TransactionId::from_uuid(row.try_get::<Uuid, _>("transaction_id")?),
            kind: TransactionKind::parse(&kind)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown transaction kind '{kind}'")))?,
            amount: money_from_row(row, "amount")?,
            from_account: row
                .try_get::<Option<Uuid>, _>("from_account_id")?
                .map(AccountId::from_uuid),
            to_account: row
                .try_get::<Option<Uuid>, _>("to_account_id")?
                .map(AccountId::from_uuid),
            description: row.try_get("description")?,
            status: TransactionStatus::parse(&status)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown transaction status '{status}'")))?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        };
        Transaction::restore(snapshot).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

const TRANSACTION_COLUMNS: &str =
    "transaction_id, kind, amount, from_account_id, to_account_id, description, status, created_at";

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    #[instrument(skip(self), fields(transaction_id = %id))]
    async fn find_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::transaction_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC, transaction_id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(Self::transaction_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %id))]
    async fn find_by_account_id(&self, id: AccountId) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE from_account_id = $1 OR to_account_id = $1 \
             ORDER BY created_at DESC, transaction_id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::transaction_from_row).collect()
    }

    #[instrument(skip(self, transaction), fields(transaction_id = %transaction.id(), status = %transaction.status()))]
    async fn save(&self, transaction: &Transaction) -> Result<Transaction, StoreError> {
        // Only the status is mutable after construction.
        sqlx::query(
            r#"
            INSERT INTO transactions
                (transaction_id, kind, amount, from_account_id, to_account_id, description, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (transaction_id) DO UPDATE SET status = EXCLUDED.status
            "#,
        )
        .bind(transaction.id().as_uuid())
        .bind(transaction.kind().as_str())
        .bind(transaction.amount().amount())
        .bind(transaction.from_account().map(Uuid::from))
        .bind(transaction.to_account().map(Uuid::from))
        .bind(transaction.description())
        .bind(transaction.status().as_str())
        .bind(transaction.created_at())
        .execute(&self.pool)
        .await?;

        Ok(transaction.clone())
    }
}
