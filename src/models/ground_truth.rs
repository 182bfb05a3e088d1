//! Ground-truth balances confirmed by the user
//!
//! The mapping has the shape `{ "<bank>": { "initial": 100, "2023-01": 150 } }`.
//! Each bank's section is validated on its own so that one malformed section
//! fails only that bank.

use serde_json::Value;
use std::collections::BTreeMap;

use super::money::Money;
use super::month::MonthKey;
use crate::error::{LedgerError, LedgerResult};

/// Key of the opening balance in a bank's section
pub const INITIAL_CHECKPOINT: &str = "initial";

/// Confirmed balances for one bank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankCheckpoints {
    pub initial: Option<Money>,
    pub months: BTreeMap<MonthKey, Money>,
}

impl BankCheckpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(mut self, balance: Money) -> Self {
        self.initial = Some(balance);
        self
    }

    pub fn with_month(mut self, month: MonthKey, balance: Money) -> Self {
        self.months.insert(month, balance);
        self
    }

    /// Balance the ledger starts from; zero when no initial value was confirmed
    pub fn opening_balance(&self) -> Money {
        self.initial.unwrap_or_default()
    }

    /// Confirmed closing balance for a month, if any
    pub fn target(&self, month: MonthKey) -> Option<Money> {
        self.months.get(&month).copied()
    }

    /// Validate one bank's section of the mapping
    ///
    /// `null` values are treated as absent checkpoints.
    pub fn from_value(bank: &str, value: &Value) -> LedgerResult<Self> {
        let section = value.as_object().ok_or_else(|| {
            LedgerError::GroundTruth(format!("section for '{}' must be an object", bank))
        })?;

        let mut checkpoints = Self::new();
        for (key, raw) in section {
            if raw.is_null() {
                continue;
            }
            let balance: Money = serde_json::from_value(raw.clone()).map_err(|e| {
                LedgerError::GroundTruth(format!("'{}'.'{}': {}", bank, key, e))
            })?;

            if key == INITIAL_CHECKPOINT {
                checkpoints.initial = Some(balance);
            } else {
                let month: MonthKey = key.parse().map_err(|e| {
                    LedgerError::GroundTruth(format!("'{}': {}", bank, e))
                })?;
                checkpoints.months.insert(month, balance);
            }
        }

        Ok(checkpoints)
    }
}

/// The full ground-truth mapping, bank sections kept unvalidated until used
#[derive(Debug, Clone, Default)]
pub struct GroundTruthBalances {
    banks: BTreeMap<String, Value>,
}

impl GroundTruthBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the mapping; the top level must be a JSON object
    pub fn from_json_str(s: &str) -> LedgerResult<Self> {
        let banks: BTreeMap<String, Value> = serde_json::from_str(s)
            .map_err(|e| LedgerError::GroundTruth(format!("unreadable balances mapping: {}", e)))?;
        Ok(Self { banks })
    }

    /// Checkpoints for a bank; an unlisted bank has none
    pub fn checkpoints_for(&self, bank: &str) -> LedgerResult<BankCheckpoints> {
        match self.banks.get(bank) {
            Some(value) => BankCheckpoints::from_value(bank, value),
            None => Ok(BankCheckpoints::new()),
        }
    }

    pub fn banks(&self) -> impl Iterator<Item = &str> {
        self.banks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping() {
        let gt = GroundTruthBalances::from_json_str(
            r#"{"x": {"initial": 100, "2023-01": 150.5}, "y": {"2023-02": "-20.00"}}"#,
        )
        .unwrap();

        let x = gt.checkpoints_for("x").unwrap();
        assert_eq!(x.opening_balance(), Money::from_units(100));
        let jan: MonthKey = "2023-01".parse().unwrap();
        assert_eq!(x.target(jan), Some(Money::from_cents(15050)));

        let y = gt.checkpoints_for("y").unwrap();
        assert_eq!(y.opening_balance(), Money::zero());
        assert_eq!(y.months.len(), 1);
    }

    #[test]
    fn test_unknown_bank_has_no_checkpoints() {
        let gt = GroundTruthBalances::from_json_str(r#"{"x": {"initial": 1}}"#).unwrap();
        assert_eq!(gt.checkpoints_for("z").unwrap(), BankCheckpoints::new());
    }

    #[test]
    fn test_malformed_section_fails_only_that_bank() {
        let gt = GroundTruthBalances::from_json_str(
            r#"{"good": {"initial": 10}, "bad": {"January": 5}, "worse": [1, 2]}"#,
        )
        .unwrap();

        assert!(gt.checkpoints_for("good").is_ok());
        assert!(matches!(
            gt.checkpoints_for("bad"),
            Err(LedgerError::GroundTruth(_))
        ));
        assert!(matches!(
            gt.checkpoints_for("worse"),
            Err(LedgerError::GroundTruth(_))
        ));
    }

    #[test]
    fn test_null_is_absent() {
        let gt = GroundTruthBalances::from_json_str(r#"{"x": {"initial": null, "2023-01": null}}"#)
            .unwrap();
        assert_eq!(gt.checkpoints_for("x").unwrap(), BankCheckpoints::new());
    }

    #[test]
    fn test_unreadable_mapping() {
        assert!(matches!(
            GroundTruthBalances::from_json_str("[1, 2, 3]"),
            Err(LedgerError::GroundTruth(_))
        ));
        assert!(GroundTruthBalances::from_json_str("{not json").is_err());
    }
}
