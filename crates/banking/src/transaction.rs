use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bankcore_core::{AccountId, Entity, TransactionId};

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;

/// Kind of money movement. Determines which account references are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Money enters the ledger: target only.
    Deposit,
    /// Money leaves the ledger: source only.
    Withdrawal,
    /// Money moves between two distinct accounts.
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
            TransactionKind::Transfer => "TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT" => Some(TransactionKind::Deposit),
            "WITHDRAWAL" => Some(TransactionKind::Withdrawal),
            "TRANSFER" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }
}

impl core::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction status lifecycle: `Pending -> Completed | Failed`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TransactionStatus::Pending),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "FAILED" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Only a pending transaction moves, and only into a terminal status.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transaction could not be constructed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShapeViolation {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("{0} requires a source account")]
    MissingSource(TransactionKind),
    #[error("{0} must not have a source account")]
    UnexpectedSource(TransactionKind),
    #[error("{0} requires a target account")]
    MissingTarget(TransactionKind),
    #[error("{0} must not have a target account")]
    UnexpectedTarget(TransactionKind),
    #[error("source and target accounts must differ")]
    SameSourceAndTarget,
}

/// Record of one monetary movement.
///
/// The shape (kind, amount, account references) is validated once, at
/// construction, and is immutable afterwards. Only the status moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionKind,
    amount: Money,
    from_account: Option<AccountId>,
    to_account: Option<AccountId>,
    description: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

/// Persisted form of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub from_account: Option<AccountId>,
    pub to_account: Option<AccountId>,
    pub description: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Start a new pending transaction, validating its shape.
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        from_account: Option<AccountId>,
        to_account: Option<AccountId>,
        description: impl Into<String>,
    ) -> LedgerResult<Self> {
        validate_shape(kind, amount, from_account, to_account)?;

        Ok(Self {
            id: TransactionId::new(),
            kind,
            amount,
            from_account,
            to_account,
            description: description.into(),
            status: TransactionStatus::Pending,
            created_at: crate::now(),
        })
    }

    pub fn deposit(
        to_account: AccountId,
        amount: Money,
        description: impl Into<String>,
    ) -> LedgerResult<Self> {
        Self::new(TransactionKind::Deposit, amount, None, Some(to_account), description)
    }

    pub fn withdrawal(
        from_account: AccountId,
        amount: Money,
        description: impl Into<String>,
    ) -> LedgerResult<Self> {
        Self::new(TransactionKind::Withdrawal, amount, Some(from_account), None, description)
    }

    pub fn transfer(
        from_account: AccountId,
        to_account: AccountId,
        amount: Money,
        description: impl Into<String>,
    ) -> LedgerResult<Self> {
        Self::new(
            TransactionKind::Transfer,
            amount,
            Some(from_account),
            Some(to_account),
            description,
        )
    }

    /// Rebuild a transaction from its persisted form. The shape is re-checked.
    pub fn restore(snapshot: TransactionSnapshot) -> LedgerResult<Self> {
        validate_shape(
            snapshot.kind,
            snapshot.amount,
            snapshot.from_account,
            snapshot.to_account,
        )?;

        Ok(Self {
            id: snapshot.id,
            kind: snapshot.kind,
            amount: snapshot.amount,
            from_account: snapshot.from_account,
            to_account: snapshot.to_account,
            description: snapshot.description,
            status: snapshot.status,
            created_at: snapshot.created_at,
        })
    }

    pub fn snapshot(&self) -> TransactionSnapshot {
        TransactionSnapshot {
            id: self.id,
            kind: self.kind,
            amount: self.amount,
            from_account: self.from_account,
            to_account: self.to_account,
            description: self.description.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn from_account(&self) -> Option<AccountId> {
        self.from_account
    }

    pub fn to_account(&self) -> Option<AccountId> {
        self.to_account
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when the account is this transaction's source or target.
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.from_account == Some(account_id) || self.to_account == Some(account_id)
    }

    /// `Pending -> Completed`. Fails from a terminal status.
    pub fn complete(&mut self) -> LedgerResult<()> {
        self.transition(TransactionStatus::Completed)
    }

    /// `Pending -> Failed`. Fails from a terminal status.
    pub fn fail(&mut self) -> LedgerResult<()> {
        self.transition(TransactionStatus::Failed)
    }

    fn transition(&mut self, next: TransactionStatus) -> LedgerResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(LedgerError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_shape(
    kind: TransactionKind,
    amount: Money,
    from_account: Option<AccountId>,
    to_account: Option<AccountId>,
) -> Result<(), ShapeViolation> {
    if !amount.is_positive() {
        return Err(ShapeViolation::NonPositiveAmount);
    }

    match kind {
        TransactionKind::Deposit => {
            if from_account.is_some() {
                return Err(ShapeViolation::UnexpectedSource(kind));
            }
            if to_account.is_none() {
                return Err(ShapeViolation::MissingTarget(kind));
            }
        }
        TransactionKind::Withdrawal => {
            if from_account.is_none() {
                return Err(ShapeViolation::MissingSource(kind));
            }
            if to_account.is_some() {
                return Err(ShapeViolation::UnexpectedTarget(kind));
            }
        }
        TransactionKind::Transfer => match (from_account, to_account) {
            (None, _) => return Err(ShapeViolation::MissingSource(kind)),
            (_, None) => return Err(ShapeViolation::MissingTarget(kind)),
            (Some(from), Some(to)) if from == to => {
                return Err(ShapeViolation::SameSourceAndTarget);
            }
            _ => {}
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount() -> Money {
        Money::new(dec!(25.00)).unwrap()
    }

    fn shape_err(result: LedgerResult<Transaction>) -> ShapeViolation {
        match result {
            Err(LedgerError::InvalidTransactionShape(v)) => v,
            other => panic!("expected shape violation, got {other:?}"),
        }
    }

    #[test]
    fn new_transactions_start_pending() {
        let tx = Transaction::deposit(AccountId::new(), amount(), "salary").unwrap();

        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.kind(), TransactionKind::Deposit);
        assert_eq!(tx.amount(), amount());
        assert_eq!(tx.description(), "salary");
    }

    #[test]
    fn non_positive_amount_is_rejected_for_every_kind() {
        let a = AccountId::new();
        let b = AccountId::new();

        for zeroish in [Money::zero(), Money::new(dec!(-5)).unwrap()] {
            assert_eq!(
                shape_err(Transaction::deposit(a, zeroish, "")),
                ShapeViolation::NonPositiveAmount
            );
            assert_eq!(
                shape_err(Transaction::withdrawal(a, zeroish, "")),
                ShapeViolation::NonPositiveAmount
            );
            assert_eq!(
                shape_err(Transaction::transfer(a, b, zeroish, "")),
                ShapeViolation::NonPositiveAmount
            );
        }
    }

    #[test]
    fn deposit_with_source_is_rejected() {
        let err = Transaction::new(
            TransactionKind::Deposit,
            amount(),
            Some(AccountId::new()),
            Some(AccountId::new()),
            "",
        );
        assert_eq!(shape_err(err), ShapeViolation::UnexpectedSource(TransactionKind::Deposit));
    }

    #[test]
    fn deposit_without_target_is_rejected() {
        let err = Transaction::new(TransactionKind::Deposit, amount(), None, None, "");
        assert_eq!(shape_err(err), ShapeViolation::MissingTarget(TransactionKind::Deposit));
    }

    #[test]
    fn withdrawal_with_target_is_rejected() {
        let err = Transaction::new(
            TransactionKind::Withdrawal,
            amount(),
            Some(AccountId::new()),
            Some(AccountId::new()),
            "",
        );
        assert_eq!(
            shape_err(err),
            ShapeViolation::UnexpectedTarget(TransactionKind::Withdrawal)
        );
    }

    #[test]
    fn withdrawal_without_source_is_rejected() {
        let err = Transaction::new(TransactionKind::Withdrawal, amount(), None, None, "");
        assert_eq!(shape_err(err), ShapeViolation::MissingSource(TransactionKind::Withdrawal));
    }

    #[test]
    fn transfer_to_itself_is_rejected() {
        let a = AccountId::new();
        assert_eq!(
            shape_err(Transaction::transfer(a, a, amount(), "")),
            ShapeViolation::SameSourceAndTarget
        );
    }

    #[test]
    fn transfer_needs_both_references() {
        let a = AccountId::new();
        let kind = TransactionKind::Transfer;

        assert_eq!(
            shape_err(Transaction::new(kind, amount(), None, Some(a), "")),
            ShapeViolation::MissingSource(kind)
        );
        assert_eq!(
            shape_err(Transaction::new(kind, amount(), Some(a), None, "")),
            ShapeViolation::MissingTarget(kind)
        );
    }

    #[test]
    fn terminal_statuses_cannot_be_left() {
        let mut completed = Transaction::withdrawal(AccountId::new(), amount(), "").unwrap();
        completed.complete().unwrap();
        assert_eq!(
            completed.fail(),
            Err(LedgerError::InvalidStatusTransition {
                from: TransactionStatus::Completed,
                to: TransactionStatus::Failed,
            })
        );
        assert!(completed.complete().is_err());
        assert_eq!(completed.status(), TransactionStatus::Completed);

        let mut failed = Transaction::withdrawal(AccountId::new(), amount(), "").unwrap();
        failed.fail().unwrap();
        assert!(failed.complete().is_err());
        assert_eq!(failed.status(), TransactionStatus::Failed);
    }

    #[test]
    fn involves_matches_either_side() {
        let a = AccountId::new();
        let b = AccountId::new();
        let tx = Transaction::transfer(a, b, amount(), "").unwrap();

        assert!(tx.involves(a));
        assert!(tx.involves(b));
        assert!(!tx.involves(AccountId::new()));
    }

    #[test]
    fn restore_rechecks_shape() {
        let mut snapshot = Transaction::deposit(AccountId::new(), amount(), "x")
            .unwrap()
            .snapshot();
        snapshot.from_account = Some(AccountId::new());

        assert!(matches!(
            Transaction::restore(snapshot),
            Err(LedgerError::InvalidTransactionShape(ShapeViolation::UnexpectedSource(_)))
        ));
    }

    #[test]
    fn kind_and_status_wire_names() {
        assert_eq!(
            serde_json::to_value(TransactionKind::Withdrawal).unwrap(),
            serde_json::json!("WITHDRAWAL")
        );
        assert_eq!(TransactionStatus::parse("FAILED"), Some(TransactionStatus::Failed));
        assert_eq!(TransactionKind::parse("deposit"), None);
    }

    #[test]
    fn only_pending_moves_and_only_to_a_terminal_status() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Completed, Failed] {
            for next in [Pending, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
