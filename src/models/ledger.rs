//! Reconciled ledgers
//!
//! A ledger is the ordered sequence of one bank's transactions, adjustment
//! entries included, whose balance column is a running sum over the whole
//! sequence.

use chrono::NaiveDate;

use super::money::Money;
use super::month::MonthKey;
use super::transaction::Transaction;
use crate::error::{LedgerError, LedgerResult};

/// Standard-schema transactions of one bank for one calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBatch {
    pub month: MonthKey,
    pub transactions: Vec<Transaction>,
}

impl MonthlyBatch {
    pub fn new(month: MonthKey, transactions: Vec<Transaction>) -> Self {
        Self {
            month,
            transactions,
        }
    }
}

/// Outcome of one month-end reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationPoint {
    pub month: MonthKey,
    /// Balance the batch arithmetic arrived at
    pub computed: Money,
    /// Confirmed balance, if the user supplied one
    pub target: Option<Money>,
    /// Signed amount of the adjustment entry
    pub adjustment: Money,
}

impl ReconciliationPoint {
    /// Whether the correction is at least `tolerance` in magnitude
    pub fn drifted(&self, tolerance: Money) -> bool {
        !self.adjustment.is_zero() && self.adjustment.abs() >= tolerance
    }

    /// Balance carried into the next month
    pub fn closing(&self) -> Money {
        self.target.unwrap_or(self.computed)
    }
}

/// One bank's reconciled transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    pub bank: String,
    pub entries: Vec<Transaction>,
    pub points: Vec<ReconciliationPoint>,
}

impl Ledger {
    pub fn new(bank: impl Into<String>) -> Self {
        Self {
            bank: bank.into(),
            entries: Vec::new(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.entries.first().map(|t| t.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.last().map(|t| t.date)
    }

    /// Balance of the last entry
    pub fn closing_balance(&self) -> Money {
        self.entries.last().map(|t| t.balance).unwrap_or_default()
    }

    /// Months covered, in order
    pub fn months(&self) -> Vec<MonthKey> {
        self.points.iter().map(|p| p.month).collect()
    }

    /// Re-check ordering and the cumulative balance over every entry
    pub fn verify_balances(&self) -> LedgerResult<()> {
        let mut previous: Option<&Transaction> = None;

        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.bank != self.bank {
                return Err(LedgerError::reconciliation(
                    &self.bank,
                    format!("entry {} belongs to bank '{}'", idx, entry.bank),
                ));
            }

            let expected = match previous {
                Some(prev) => {
                    if entry.date < prev.date {
                        return Err(LedgerError::reconciliation(
                            &self.bank,
                            format!("entry {} dated {} precedes {}", idx, entry.date, prev.date),
                        ));
                    }
                    entry
                        .checked_net()
                        .and_then(|net| prev.balance.checked_add(net))
                }
                None => entry.checked_net(),
            };
            let expected = expected.ok_or_else(|| {
                LedgerError::reconciliation(
                    &self.bank,
                    format!("entry {} overflows the running balance", idx),
                )
            })?;

            if entry.balance != expected {
                return Err(LedgerError::reconciliation(
                    &self.bank,
                    format!(
                        "entry {} has balance {} but the running sum is {}",
                        idx, entry.balance, expected
                    ),
                ));
            }

            previous = Some(entry);
        }

        Ok(())
    }
}
