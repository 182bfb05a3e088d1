//! Run report formatting
//!
//! One table row per bank: status, months, entries, drift, gaps and the
//! written ledger or the error that stopped the bank.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::MonthKey;
use crate::services::{BankReport, BankStatus, RunReport};

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Bank")]
    bank: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Months")]
    months: String,
    #[tabled(rename = "Entries")]
    entries: String,
    #[tabled(rename = "Drift")]
    drifted: String,
    #[tabled(rename = "Gaps")]
    gaps: String,
    #[tabled(rename = "Ledger / Error")]
    detail: String,
}

fn format_gaps(gaps: &[MonthKey]) -> String {
    if gaps.is_empty() {
        return "-".to_string();
    }
    gaps.iter()
        .map(MonthKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&BankReport> for ReportRow {
    fn from(report: &BankReport) -> Self {
        let gaps = format_gaps(&report.gaps);
        match &report.status {
            BankStatus::Succeeded {
                path,
                months,
                entries,
                drifted,
            } => Self {
                bank: report.bank.clone(),
                status: "ok",
                months: months.to_string(),
                entries: entries.to_string(),
                drifted: drifted.to_string(),
                gaps,
                detail: path.display().to_string(),
            },
            BankStatus::Failed { error } => Self {
                bank: report.bank.clone(),
                status: "FAILED",
                months: "-".to_string(),
                entries: "-".to_string(),
                drifted: "-".to_string(),
                gaps,
                detail: error.clone(),
            },
        }
    }
}

/// Format a reconcile run as a table followed by a one-line tally
pub fn format_run_report(report: &RunReport) -> String {
    if report.banks.is_empty() {
        return "No batches found.\n".to_string();
    }

    let rows: Vec<ReportRow> = report.banks.iter().map(ReportRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());

    let mut output = format!("{}\n", table);
    output.push_str(&format!(
        "{} succeeded, {} failed\n",
        report.succeeded_count(),
        report.failed_count()
    ));

    if !report.skipped_files.is_empty() {
        output.push_str("Skipped files:\n");
        for path in &report.skipped_files {
            output.push_str(&format!("  {}\n", path.display()));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_run_report() {
        let report = RunReport {
            banks: vec![
                BankReport {
                    bank: "nubank".to_string(),
                    status: BankStatus::Succeeded {
                        path: PathBuf::from("out/nubank_2023-01-02_2023-03-30.csv"),
                        months: 3,
                        entries: 42,
                        drifted: 1,
                    },
                    gaps: vec!["2023-02".parse().unwrap()],
                },
                BankReport {
                    bank: "inter".to_string(),
                    status: BankStatus::Failed {
                        error: "batch 2023-01 is empty".to_string(),
                    },
                    gaps: Vec::new(),
                },
            ],
            skipped_files: vec![PathBuf::from("batches/README.md")],
        };

        let output = format_run_report(&report);
        assert!(output.contains("nubank"));
        assert!(output.contains("out/nubank_2023-01-02_2023-03-30.csv"));
        assert!(output.contains("2023-02"));
        assert!(output.contains("FAILED"));
        assert!(output.contains("batch 2023-01 is empty"));
        assert!(output.contains("1 succeeded, 1 failed"));
        assert!(output.contains("batches/README.md"));
    }

    #[test]
    fn test_format_empty_report() {
        assert_eq!(format_run_report(&RunReport::default()), "No batches found.\n");
    }
}
