//! Consolidation run service
//!
//! Drives one reconcile run: index the monthly batches, reconcile each bank
//! independently, write every ledger and publish the results. A failing bank
//! is reported and skipped; an infrastructure failure aborts the run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, error, info, warn};

use super::reconciliation::LedgerReconciler;
use crate::config::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{GroundTruthBalances, MonthKey};
use crate::storage::{batches, load_ground_truth, BatchIndex, ConsolidatedWriter, StagingArea};

/// How a bank's reconciliation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankStatus {
    Succeeded {
        path: PathBuf,
        months: usize,
        entries: usize,
        /// Months whose adjustment reached the drift tolerance
        drifted: usize,
    },
    Failed {
        error: String,
    },
}

/// Per-bank line of a run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankReport {
    pub bank: String,
    pub status: BankStatus,
    /// Months missing between the bank's first and last batch
    pub gaps: Vec<MonthKey>,
}

impl BankReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, BankStatus::Succeeded { .. })
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub banks: Vec<BankReport>,
    /// Files in the batch directory that were not batches
    pub skipped_files: Vec<PathBuf>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.banks.iter().any(|b| !b.succeeded())
    }

    pub fn succeeded_count(&self) -> usize {
        self.banks.iter().filter(|b| b.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.banks.len() - self.succeeded_count()
    }
}

struct BankOutput {
    path: PathBuf,
    months: usize,
    entries: usize,
    drifted: usize,
}

/// Service for reconcile runs
pub struct ConsolidationService<'a> {
    settings: &'a Settings,
    ground_truth: Result<GroundTruthBalances, String>,
    reconciler: LedgerReconciler,
    writer: ConsolidatedWriter,
}

impl<'a> ConsolidationService<'a> {
    /// Create a new consolidation service
    pub fn new(settings: &'a Settings, ground_truth: GroundTruthBalances) -> Self {
        Self::build(settings, Ok(ground_truth))
    }

    /// Create a service whose balances mapping could not be read
    ///
    /// Every bank of the run fails with the given reason.
    pub fn with_unreadable_ground_truth(settings: &'a Settings, reason: impl Into<String>) -> Self {
        Self::build(settings, Err(reason.into()))
    }

    /// Create a service from a balances file on disk
    ///
    /// Only an I/O failure reading the file is returned as an error.
    pub fn from_balances_file(settings: &'a Settings, path: &Path) -> LedgerResult<Self> {
        match load_ground_truth(path) {
            Ok(ground_truth) => Ok(Self::new(settings, ground_truth)),
            Err(LedgerError::GroundTruth(reason)) => {
                warn!(path = %path.display(), %reason, "Balances mapping is unreadable");
                Ok(Self::with_unreadable_ground_truth(settings, reason))
            }
            Err(e) => Err(e),
        }
    }

    fn build(settings: &'a Settings, ground_truth: Result<GroundTruthBalances, String>) -> Self {
        Self {
            settings,
            ground_truth,
            reconciler: LedgerReconciler::new(settings.tolerance),
            writer: ConsolidatedWriter::new(settings.output_extension.clone()),
        }
    }

    /// Reconcile every bank with batches in `batches_dir` into `output_dir`
    pub fn run(&self, batches_dir: &Path, output_dir: &Path) -> LedgerResult<RunReport> {
        let index = batches::discover(batches_dir, &self.settings.output_extension)?;
        info!(
            banks = index.banks.len(),
            skipped = index.skipped.len(),
            "Indexed monthly batches"
        );
        if let Ok(ground_truth) = &self.ground_truth {
            if ground_truth.is_empty() {
                warn!("No ground truth balances; every month gets a zero adjustment");
            }
            for bank in ground_truth.banks() {
                if !index.banks.contains_key(bank) {
                    warn!(bank = %bank, "Ground truth lists a bank with no batches");
                }
            }
        }

        let staging = if self.settings.stage_runs {
            Some(StagingArea::create(output_dir)?)
        } else {
            fs::create_dir_all(output_dir).map_err(|e| {
                LedgerError::Io(format!("Failed to create {}: {}", output_dir.display(), e))
            })?;
            None
        };
        let write_dir = staging
            .as_ref()
            .map(|s| s.path().to_path_buf())
            .unwrap_or_else(|| output_dir.to_path_buf());

        let outcomes = self.process_banks(&index, &write_dir);

        let mut report = RunReport {
            banks: Vec::with_capacity(outcomes.len()),
            skipped_files: index.skipped.clone(),
        };
        let mut written = Vec::new();
        let mut fatal = None;

        for (bank, outcome) in outcomes {
            let gaps = index.gaps(&bank);
            for month in &gaps {
                warn!(bank = %bank, month = %month, "No batch for month; balance carried across the gap");
            }

            let status = match outcome {
                Ok(output) => {
                    written.push((bank.clone(), output.path.clone()));
                    BankStatus::Succeeded {
                        path: output.path,
                        months: output.months,
                        entries: output.entries,
                        drifted: output.drifted,
                    }
                }
                Err(e) => {
                    if e.is_fatal() {
                        error!(bank = %bank, error = %e, "Run aborted");
                    } else {
                        warn!(bank = %bank, error = %e, "Bank failed to reconcile");
                    }
                    let status = BankStatus::Failed {
                        error: e.to_string(),
                    };
                    if e.is_fatal() && fatal.is_none() {
                        fatal = Some(e);
                    }
                    status
                }
            };

            report.banks.push(BankReport { bank, status, gaps });
        }

        // Banks that finished are kept even when another bank aborted the run
        let finished = self.finish(staging, &written, output_dir, &mut report);

        if let Some(e) = fatal {
            if let Err(publish_error) = finished {
                error!(error = %publish_error, "Could not publish finished ledgers");
            }
            return Err(e);
        }
        finished?;

        info!(
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            "Reconcile run finished"
        );
        Ok(report)
    }

    /// Move written ledgers into place and drop their superseded spans
    fn finish(
        &self,
        staging: Option<StagingArea>,
        written: &[(String, PathBuf)],
        output_dir: &Path,
        report: &mut RunReport,
    ) -> LedgerResult<()> {
        match staging {
            Some(staging) => {
                let published: BTreeMap<String, PathBuf> =
                    staging.publish(written, &self.writer)?.into_iter().collect();
                for bank in &mut report.banks {
                    if let (BankStatus::Succeeded { path, .. }, Some(dest)) =
                        (&mut bank.status, published.get(&bank.bank))
                    {
                        *path = dest.clone();
                    }
                }
            }
            None => {
                for (bank, path) in written {
                    self.writer.prune_older(bank, output_dir, path)?;
                }
            }
        }
        Ok(())
    }

    /// Reconcile each bank, one thread per bank once there are enough banks
    fn process_banks(
        &self,
        index: &BatchIndex,
        write_dir: &Path,
    ) -> Vec<(String, LedgerResult<BankOutput>)> {
        if index.banks.len() < self.settings.parallel_min_banks {
            return index
                .banks
                .iter()
                .map(|(bank, months)| (bank.clone(), self.process_bank(bank, months, write_dir)))
                .collect();
        }

        debug!(banks = index.banks.len(), "Reconciling banks in parallel");
        thread::scope(|scope| {
            let handles: Vec<_> = index
                .banks
                .iter()
                .map(|(bank, months)| {
                    (
                        bank,
                        scope.spawn(move || self.process_bank(bank, months, write_dir)),
                    )
                })
                .collect();

            handles
                .into_iter()
                .map(|(bank, handle)| {
                    let outcome = handle.join().unwrap_or_else(|_| {
                        Err(LedgerError::reconciliation(bank, "worker thread panicked"))
                    });
                    (bank.clone(), outcome)
                })
                .collect()
        })
    }

    /// Read, reconcile and write one bank
    fn process_bank(
        &self,
        bank: &str,
        months: &BTreeMap<MonthKey, PathBuf>,
        write_dir: &Path,
    ) -> LedgerResult<BankOutput> {
        let batches = months
            .iter()
            .map(|(month, path)| {
                batches::read_batch(*month, path)
                    .map_err(|e| LedgerError::reconciliation(bank, e.to_string()))
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        let checkpoints = match &self.ground_truth {
            Ok(ground_truth) => ground_truth.checkpoints_for(bank)?,
            Err(reason) => return Err(LedgerError::GroundTruth(reason.clone())),
        };

        let ledger = self.reconciler.reconcile(bank, &batches, &checkpoints)?;
        let path = self.writer.write(bank, &ledger, write_dir).map_err(|e| {
            if e.is_fatal() {
                e
            } else {
                LedgerError::reconciliation(bank, e.to_string())
            }
        })?;

        Ok(BankOutput {
            path,
            months: ledger.points.len(),
            entries: ledger.len(),
            drifted: ledger
                .points
                .iter()
                .filter(|p| p.drifted(self.settings.tolerance))
                .count(),
        })
    }
}
