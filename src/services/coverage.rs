//! Coverage resolution service
//!
//! Scans a directory of raw extracts, turns each recognized extract into one
//! coverage candidate per calendar month it touches, and picks a single
//! extract for every (bank, month): complete extracts first, then the longest
//! range, then the lexically smallest path.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::LedgerResult;
use crate::models::{CoverageCandidate, MonthKey, MonthRows, RawExtractFile};
use crate::parsers::ParserRegistry;
use crate::storage::file_io;

/// A raw file that contributed no coverage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The rows chosen for one (bank, month)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMonth {
    pub source: PathBuf,
    pub is_complete: bool,
    pub rows: MonthRows,
}

/// Output of a resolver run
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// bank -> month -> chosen rows; absent months are gaps
    pub months: BTreeMap<String, BTreeMap<MonthKey, ResolvedMonth>>,
    /// Months resolved from an extract that does not span the whole month
    pub incomplete: Vec<(String, MonthKey)>,
    /// Months whose chosen extract held no rows for them
    pub empty: Vec<(String, MonthKey)>,
    /// Files that were not recognized, had a malformed range or could not be read
    pub skipped: Vec<SkippedFile>,
}

impl Resolution {
    /// The extract chosen for each (bank, month)
    pub fn chosen_files(&self) -> BTreeMap<(String, MonthKey), PathBuf> {
        self.months
            .iter()
            .flat_map(|(bank, months)| {
                months
                    .iter()
                    .map(move |(month, resolved)| ((bank.clone(), *month), resolved.source.clone()))
            })
            .collect()
    }

    /// Covered months per bank, ascending
    pub fn coverage(&self) -> BTreeMap<String, Vec<MonthKey>> {
        self.months
            .iter()
            .map(|(bank, months)| (bank.clone(), months.keys().copied().collect()))
            .collect()
    }

    pub fn month_count(&self) -> usize {
        self.months.values().map(BTreeMap::len).sum()
    }
}

/// Preference order between two candidates for the same (bank, month)
///
/// `Ordering::Less` means `a` wins.
pub fn preference(a: &CoverageCandidate, b: &CoverageCandidate) -> Ordering {
    b.is_complete
        .cmp(&a.is_complete)
        .then(b.range_days.cmp(&a.range_days))
        .then_with(|| a.path.cmp(&b.path))
}

/// Pick one candidate per (bank, month)
///
/// The result does not depend on the order candidates arrive in.
pub fn select_candidates<I>(candidates: I) -> BTreeMap<(String, MonthKey), CoverageCandidate>
where
    I: IntoIterator<Item = CoverageCandidate>,
{
    let mut chosen: BTreeMap<(String, MonthKey), CoverageCandidate> = BTreeMap::new();

    for candidate in candidates {
        let key = (candidate.bank.clone(), candidate.month);
        match chosen.get(&key) {
            Some(current) if preference(&candidate, current) != Ordering::Less => {}
            _ => {
                chosen.insert(key, candidate);
            }
        }
    }

    chosen
}

/// Service that resolves raw extracts into monthly row sets
pub struct CoverageResolver<'a> {
    registry: &'a ParserRegistry,
}

impl<'a> CoverageResolver<'a> {
    /// Create a new coverage resolver
    pub fn new(registry: &'a ParserRegistry) -> Self {
        Self { registry }
    }

    /// Identify every recognized extract under `raw_dir`
    ///
    /// Failing to list the directory itself is fatal; problems with single
    /// files are logged and reported as skipped.
    pub fn scan(&self, raw_dir: &Path) -> LedgerResult<(Vec<RawExtractFile>, Vec<SkippedFile>)> {
        let mut extracts = Vec::new();
        let mut skipped = Vec::new();

        for path in file_io::list_files_recursive(raw_dir)? {
            match self.registry.identify(&path) {
                Ok(Some(extract)) => {
                    debug!(
                        bank = %extract.bank,
                        path = %path.display(),
                        start = %extract.start_date,
                        end = %extract.end_date,
                        "Recognized extract"
                    );
                    extracts.push(extract);
                }
                Ok(None) => {
                    warn!(path = %path.display(), "No parser recognizes this file; skipping");
                    skipped.push(SkippedFile {
                        path,
                        reason: "unrecognized filename".to_string(),
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed extract name; skipping");
                    skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok((extracts, skipped))
    }

    /// Resolve `raw_dir` into one row set per covered (bank, month)
    pub fn resolve(&self, raw_dir: &Path) -> LedgerResult<Resolution> {
        let (extracts, skipped) = self.scan(raw_dir)?;
        let candidates = extracts.iter().flat_map(RawExtractFile::candidates);
        let chosen = select_candidates(candidates);

        let mut resolution = Resolution {
            skipped,
            ..Resolution::default()
        };

        for ((bank, month), candidate) in chosen {
            let parser = match self.registry.for_bank(&bank) {
                Some(parser) => parser,
                None => continue,
            };

            let rows = match parser.read_month(&candidate.path, month) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(
                        bank = %bank,
                        month = %month,
                        path = %candidate.path.display(),
                        error = %e,
                        "Could not read chosen extract; leaving month uncovered"
                    );
                    resolution.skipped.push(SkippedFile {
                        path: candidate.path.clone(),
                        reason: format!("{}: {}", month, e),
                    });
                    continue;
                }
            };

            if rows.is_empty() {
                debug!(bank = %bank, month = %month, "Chosen extract has no rows for month");
                resolution.empty.push((bank, month));
                continue;
            }

            if !candidate.is_complete {
                warn!(
                    bank = %bank,
                    month = %month,
                    start = %candidate.start_date,
                    end = %candidate.end_date,
                    "Incomplete month: best extract does not span the whole month"
                );
                resolution.incomplete.push((bank.clone(), month));
            }

            resolution.months.entry(bank).or_default().insert(
                month,
                ResolvedMonth {
                    source: candidate.path,
                    is_complete: candidate.is_complete,
                    rows,
                },
            );
        }

        info!(
            banks = resolution.months.len(),
            months = resolution.month_count(),
            skipped = resolution.skipped.len(),
            "Coverage resolved"
        );

        Ok(resolution)
    }
}
