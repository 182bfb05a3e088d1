//! Ledger reconciliation service
//!
//! Folds a bank's monthly batches, in order, into one ledger. The fold seeds
//! the running balance from the confirmed opening balance, recomputes every
//! batch's balance column and closes each month with an adjustment entry
//! that moves the computed balance onto the confirmed one.

use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BankCheckpoints, Ledger, Money, MonthlyBatch, ReconciliationPoint, Transaction};

/// Recompute the balance column of `transactions` starting from `opening`
///
/// Returns the rebalanced rows and the closing balance, or `None` if the
/// running balance leaves the representable range.
pub fn with_running_balance(
    transactions: &[Transaction],
    opening: Money,
) -> Option<(Vec<Transaction>, Money)> {
    let mut balance = opening;
    let mut rows = Vec::with_capacity(transactions.len());
    for txn in transactions {
        balance = balance.checked_add(txn.checked_net()?)?;
        rows.push(Transaction {
            balance,
            ..txn.clone()
        });
    }
    Some((rows, balance))
}

/// Service that turns ordered monthly batches into a reconciled ledger
pub struct LedgerReconciler {
    tolerance: Money,
}

impl LedgerReconciler {
    /// Create a reconciler; `tolerance` only decides which drifts are reported
    pub fn new(tolerance: Money) -> Self {
        Self { tolerance }
    }

    /// Reconcile a bank's batches against its confirmed balances
    ///
    /// Batches must be in ascending month order; they are never reordered.
    /// Months missing between two batches carry the balance unchanged.
    pub fn reconcile(
        &self,
        bank: &str,
        batches: &[MonthlyBatch],
        checkpoints: &BankCheckpoints,
    ) -> LedgerResult<Ledger> {
        self.validate(bank, batches)?;

        let mut ledger = Ledger::new(bank);
        let mut running = checkpoints.opening_balance();

        for (idx, batch) in batches.iter().enumerate() {
            let (first, last) = match (batch.transactions.first(), batch.transactions.last()) {
                (Some(first), Some(last)) => (first.date, last.date),
                _ => {
                    return Err(LedgerError::reconciliation(
                        bank,
                        format!("batch {} is empty", batch.month),
                    ))
                }
            };

            if idx == 0 {
                ledger
                    .entries
                    .push(Transaction::initial_balance(first, bank, running));
            }

            let (rows, computed) = with_running_balance(&batch.transactions, running)
                .ok_or_else(|| {
                    LedgerError::reconciliation(
                        bank,
                        format!("running balance of batch {} is out of range", batch.month),
                    )
                })?;
            ledger.entries.extend(rows);

            let target = checkpoints.target(batch.month);
            let adjustment = Transaction::reconciler_adjustment(last, bank, computed, target)
                .ok_or_else(|| {
                    LedgerError::reconciliation(
                        bank,
                        format!("adjustment for {} is out of range", batch.month),
                    )
                })?;
            let point = ReconciliationPoint {
                month: batch.month,
                computed,
                target,
                adjustment: adjustment.net(),
            };

            match target {
                Some(_) if point.drifted(self.tolerance) => warn!(
                    bank,
                    month = %batch.month,
                    computed = %computed,
                    adjustment = %point.adjustment,
                    "Computed balance drifted from the confirmed balance"
                ),
                Some(_) => debug!(bank, month = %batch.month, "Balance matches checkpoint"),
                None => warn!(
                    bank,
                    month = %batch.month,
                    balance = %computed,
                    "No confirmed balance; keeping computed balance"
                ),
            }

            running = point.closing();
            ledger.entries.push(adjustment);
            ledger.points.push(point);
        }

        let covered = ledger.months();
        for month in checkpoints.months.keys() {
            if !covered.contains(month) {
                warn!(bank, month = %month, "Confirmed balance has no batch and was not applied");
            }
        }

        ledger.verify_balances()?;
        Ok(ledger)
    }

    /// Check batch ordering and row consistency before folding
    fn validate(&self, bank: &str, batches: &[MonthlyBatch]) -> LedgerResult<()> {
        if batches.is_empty() {
            return Err(LedgerError::reconciliation(bank, "no batches to reconcile"));
        }

        for pair in batches.windows(2) {
            if pair[1].month <= pair[0].month {
                return Err(LedgerError::reconciliation(
                    bank,
                    format!(
                        "batches out of order: {} follows {}",
                        pair[1].month, pair[0].month
                    ),
                ));
            }
        }

        for batch in batches {
            if batch.transactions.is_empty() {
                return Err(LedgerError::reconciliation(
                    bank,
                    format!("batch {} is empty", batch.month),
                ));
            }

            let mut previous = None;
            for (row, txn) in batch.transactions.iter().enumerate() {
                let fail = |message: String| {
                    LedgerError::reconciliation(
                        bank,
                        format!("batch {} row {}: {}", batch.month, row + 1, message),
                    )
                };

                if txn.bank != bank {
                    return Err(fail(format!("belongs to bank '{}'", txn.bank)));
                }
                if !batch.month.contains(txn.date) {
                    return Err(fail(format!("dated {} outside the month", txn.date)));
                }
                if let Some(prev) = previous {
                    if txn.date < prev {
                        return Err(fail(format!("dated {} after a row dated {}", txn.date, prev)));
                    }
                }
                txn.validate().map_err(|e| fail(e.to_string()))?;
                previous = Some(txn.date);
            }
        }

        Ok(())
    }
}

impl Default for LedgerReconciler {
    fn default() -> Self {
        Self::new(Money::from_cents(1))
    }
}
