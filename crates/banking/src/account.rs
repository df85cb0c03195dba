use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bankcore_core::{AccountId, AggregateRoot};

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;

/// Aggregate root: a bank account holding a single balance.
///
/// Invariant: `deposit`/`withdraw` never leave the balance negative or above
/// `Money::max()`. Both reject an offending amount before touching any field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    balance: Money,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

/// Persisted form of an account, used by stores to rebuild the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub name: String,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl Account {
    /// Open a new account with a zero balance.
    pub fn open(name: impl Into<String>) -> LedgerResult<Self> {
        Self::open_with_balance(name, Money::zero())
    }

    /// Open a new account with an initial balance (zero or more).
    pub fn open_with_balance(name: impl Into<String>, balance: Money) -> LedgerResult<Self> {
        Self::open_with_id(AccountId::new(), name, balance)
    }

    /// Open a new account under a caller-chosen identifier.
    pub fn open_with_id(
        id: AccountId,
        name: impl Into<String>,
        balance: Money,
    ) -> LedgerResult<Self> {
        let name = validate_name(name.into())?;
        if balance.is_negative() {
            return Err(LedgerError::InvalidAmount(balance));
        }

        let now = crate::now();
        Ok(Self {
            id,
            name,
            balance,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Rebuild an account from its persisted form.
    pub fn restore(snapshot: AccountSnapshot) -> LedgerResult<Self> {
        let name = validate_name(snapshot.name)?;
        if snapshot.balance.is_negative() {
            return Err(LedgerError::InvalidAmount(snapshot.balance));
        }

        Ok(Self {
            id: snapshot.id,
            name,
            balance: snapshot.balance,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            version: snapshot.version,
        })
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            name: self.name.clone(),
            balance: self.balance,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the display name.
    pub fn rename(&mut self, name: impl Into<String>) -> LedgerResult<()> {
        self.name = validate_name(name.into())?;
        self.touch();
        Ok(())
    }

    pub fn deposit(&mut self, amount: Money) -> LedgerResult<()> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }

        self.balance = self
            .balance
            .add(amount)
            .map_err(|_| LedgerError::InvalidAmount(amount))?;
        self.touch();
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Money) -> LedgerResult<()> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account_id: self.id,
                balance: self.balance,
                requested: amount,
            });
        }

        self.balance = self.balance.subtract(amount)?;
        self.touch();
        Ok(())
    }

    /// True iff `withdraw(amount)` would succeed against the current balance.
    ///
    /// Advisory only: `withdraw` re-checks on its own.
    pub fn can_withdraw(&self, amount: Money) -> bool {
        amount.is_positive() && self.balance >= amount
    }

    /// True iff `deposit(amount)` would succeed, i.e. the balance stays in range.
    pub fn can_deposit(&self, amount: Money) -> bool {
        amount.is_positive() && self.balance.add(amount).is_ok()
    }

    /// Record that the store accepted this snapshot under `version`.
    pub fn mark_persisted(&mut self, version: u64) {
        self.version = version;
    }

    // updated_at must move forward even when the clock does not.
    fn touch(&mut self) {
        let now = crate::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }
}

impl AggregateRoot for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn validate_name(name: String) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAccountName(
            "account name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
