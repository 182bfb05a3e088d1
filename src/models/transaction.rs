//! Transaction model
//!
//! One row of the standard schema shared by monthly batches and reconciled
//! ledgers. Adjustment entries are transactions whose category marks them as
//! synthetic and whose amounts are computed by the reconciler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::{deserialize_cell, Money};

/// Category of the entry that seeds a ledger's opening balance
pub const INITIAL_BALANCE_CATEGORY: &str = "initial-balance";

/// Category of the entry appended at every month-end reconciliation point
pub const ADJUSTMENT_CATEGORY: &str = "reconciler-adjustment";

/// Description carried by a reconciliation point with no confirmed balance
pub const NO_CHECKPOINT_DESCRIPTION: &str = "no balance data available";

/// Kind of synthetic entry inserted by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    /// Opening balance of a bank's ledger
    InitialBalance,
    /// Month-end correction towards a confirmed balance
    Reconciliation,
}

impl AdjustmentKind {
    pub fn category(&self) -> &'static str {
        match self {
            Self::InitialBalance => INITIAL_BALANCE_CATEGORY,
            Self::Reconciliation => ADJUSTMENT_CATEGORY,
        }
    }
}

/// A row in the standard transaction schema
///
/// Field order is the column order of batch and ledger files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,

    pub bank: String,

    /// Inflow, never negative
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub income: Money,

    /// Outflow, never negative
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub outcome: Money,

    /// Running balance; ignored on input and recomputed by the reconciler
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub balance: Money,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub original_id: String,

    #[serde(default)]
    pub participant: String,
}

impl Transaction {
    /// Create a plain transaction with no category or description
    pub fn new(date: NaiveDate, bank: impl Into<String>, income: Money, outcome: Money) -> Self {
        Self {
            date,
            bank: bank.into(),
            income,
            outcome,
            balance: Money::zero(),
            category: String::new(),
            description: String::new(),
            original_id: String::new(),
            participant: String::new(),
        }
    }

    /// Opening-balance entry; the whole balance is booked as income or outcome
    pub fn initial_balance(date: NaiveDate, bank: impl Into<String>, balance: Money) -> Self {
        let mut txn = Self::new(date, bank, balance.positive_part(), balance.negative_part());
        txn.balance = balance;
        txn.category = AdjustmentKind::InitialBalance.category().to_string();
        txn
    }

    /// Month-end reconciliation entry moving `computed` to `target`
    ///
    /// Without a target the entry is a zero-amount marker that keeps the
    /// computed balance. Returns `None` when the correction itself is out of
    /// range.
    pub fn reconciler_adjustment(
        date: NaiveDate,
        bank: impl Into<String>,
        computed: Money,
        target: Option<Money>,
    ) -> Option<Self> {
        let (adjustment, balance, description) = match target {
            Some(target) => (target.checked_sub(computed)?, target, String::new()),
            None => (
                Money::zero(),
                computed,
                NO_CHECKPOINT_DESCRIPTION.to_string(),
            ),
        };

        let mut txn = Self::new(
            date,
            bank,
            adjustment.positive_part(),
            adjustment.negative_part(),
        );
        txn.balance = balance;
        txn.category = AdjustmentKind::Reconciliation.category().to_string();
        txn.description = description;
        Some(txn)
    }

    /// Signed effect of this row on the balance
    ///
    /// Exact for rows that pass [`Transaction::validate`].
    pub fn net(&self) -> Money {
        self.income - self.outcome
    }

    /// Signed effect of any row, `None` if it is out of range
    pub fn checked_net(&self) -> Option<Money> {
        self.income.checked_sub(self.outcome)
    }

    /// Validate the row's amounts
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.income.is_negative() {
            return Err(TransactionValidationError::NegativeIncome(self.income));
        }
        if self.outcome.is_negative() {
            return Err(TransactionValidationError::NegativeOutcome(self.outcome));
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} +{} -{} = {}",
            self.date.format("%Y-%m-%d"),
            self.bank,
            self.income,
            self.outcome,
            self.balance
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NegativeIncome(Money),
    NegativeOutcome(Money),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeIncome(m) => write!(f, "income must not be negative (got {})", m),
            Self::NegativeOutcome(m) => write!(f, "outcome must not be negative (got {})", m),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
