//! Ledger operations: deposit, withdrawal and transfer over in-memory accounts.
//!
//! Each operation runs the same three steps:
//!
//! ```text
//! 1. Begin     build a PENDING transaction (shape errors abort here, nothing changes)
//! 2. Apply     mutate the account balance(s)
//! 3. Finalize  COMPLETED on success; FAILED on error, error kept for the caller
//! ```
//!
//! Once step 1 succeeds a transaction always comes back, so a failed attempt can
//! be persisted with status FAILED instead of disappearing.
//!
//! `stage_*` stop after step 2 and hand back a [`Staged`] operation. Callers that
//! persist balances use it to finalize only once the writes have landed, and to
//! fail the transaction when they did not.

use bankcore_core::AggregateRoot;

use crate::account::Account;
use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::transaction::Transaction;

/// A finalized transaction plus the error that failed it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    transaction: Transaction,
    error: Option<LedgerError>,
}

impl Outcome {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn error(&self) -> Option<&LedgerError> {
        self.error.as_ref()
    }

    pub fn into_parts(self) -> (Transaction, Option<LedgerError>) {
        (self.transaction, self.error)
    }
}

/// An operation whose balance change was attempted but whose PENDING
/// transaction is not finalized yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    transaction: Transaction,
    applied: LedgerResult<()>,
}

impl Staged {
    /// True when the account mutation(s) succeeded.
    pub fn is_applied(&self) -> bool {
        self.applied.is_ok()
    }

    /// COMPLETED when the mutation succeeded, FAILED with its error otherwise.
    pub fn finalize(self) -> LedgerResult<Outcome> {
        let mut transaction = self.transaction;
        match self.applied {
            Ok(()) => {
                transaction.complete()?;
                Ok(Outcome {
                    transaction,
                    error: None,
                })
            }
            Err(err) => {
                transaction.fail()?;
                Ok(Outcome {
                    transaction,
                    error: Some(err),
                })
            }
        }
    }

    /// FAILED regardless of the mutation result, for changes that could not be
    /// made durable.
    pub fn abandon(self) -> LedgerResult<Transaction> {
        let mut transaction = self.transaction;
        transaction.fail()?;
        Ok(transaction)
    }
}

pub fn deposit(
    target: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Outcome> {
    stage_deposit(target, amount, description)?.finalize()
}

pub fn withdraw(
    source: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Outcome> {
    stage_withdrawal(source, amount, description)?.finalize()
}

/// Debit `source`, then credit `target`.
pub fn transfer(
    source: &mut Account,
    target: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Outcome> {
    stage_transfer(source, target, amount, description)?.finalize()
}

pub fn stage_deposit(
    target: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Staged> {
    let transaction = Transaction::deposit(*target.id(), amount, description)?;
    let applied = target.deposit(amount);
    Ok(Staged {
        transaction,
        applied,
    })
}

pub fn stage_withdrawal(
    source: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Staged> {
    let transaction = Transaction::withdrawal(*source.id(), amount, description)?;
    let applied = ensure_funds(source, amount).and_then(|()| source.withdraw(amount));
    Ok(Staged {
        transaction,
        applied,
    })
}

/// Both sides are checked before either balance moves, so a refused transfer
/// leaves both accounts untouched.
pub fn stage_transfer(
    source: &mut Account,
    target: &mut Account,
    amount: Money,
    description: impl Into<String>,
) -> LedgerResult<Staged> {
    let transaction = Transaction::transfer(*source.id(), *target.id(), amount, description)?;
    let applied = ensure_funds(source, amount)
        .and_then(|()| ensure_capacity(target, amount))
        .and_then(|()| source.withdraw(amount))
        .and_then(|()| target.deposit(amount));
    Ok(Staged {
        transaction,
        applied,
    })
}

fn ensure_funds(source: &Account, amount: Money) -> LedgerResult<()> {
    if source.can_withdraw(amount) {
        Ok(())
    } else {
        Err(LedgerError::InsufficientFunds {
            account_id: *source.id(),
            balance: source.balance(),
            requested: amount,
        })
    }
}

fn ensure_capacity(target: &Account, amount: Money) -> LedgerResult<()> {
    if target.can_deposit(amount) {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount))
    }
}
