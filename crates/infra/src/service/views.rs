//! Plain data projections returned by the use-case surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bankcore_banking::{Account, Money, Transaction, TransactionKind, TransactionStatus};
use bankcore_core::{AccountId, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub name: String,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id_typed(),
            name: account.name().to_string(),
            balance: account.balance(),
            created_at: account.created_at(),
            updated_at: account.updated_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub from_account_id: Option<AccountId>,
    pub to_account_id: Option<AccountId>,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id_typed(),
            kind: tx.kind(),
            amount: tx.amount(),
            from_account_id: tx.from_account(),
            to_account_id: tx.to_account(),
            description: tx.description().to_string(),
            status: tx.status(),
            created_at: tx.created_at(),
        }
    }
}
