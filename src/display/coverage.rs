//! Coverage summary formatting
//!
//! Renders the resolver's output as bank -> year -> months.

use std::collections::BTreeMap;

use crate::models::MonthKey;
use crate::services::Resolution;

/// Group months by year, each year's months ascending
pub fn months_by_year(months: &[MonthKey]) -> BTreeMap<i32, Vec<u32>> {
    let mut years: BTreeMap<i32, Vec<u32>> = BTreeMap::new();
    for month in months {
        years.entry(month.year()).or_default().push(month.month());
    }
    for list in years.values_mut() {
        list.sort_unstable();
        list.dedup();
    }
    years
}

/// Format the coverage of a resolver run
pub fn format_coverage_summary(resolution: &Resolution) -> String {
    let coverage = resolution.coverage();
    if coverage.is_empty() {
        let mut output = "No months covered.\n".to_string();
        push_skipped(&mut output, resolution);
        return output;
    }

    let mut output = String::from("Coverage summary\n");
    for (bank, months) in &coverage {
        output.push_str(&format!("{}\n", bank));
        for (year, list) in months_by_year(months) {
            let list: Vec<String> = list.iter().map(|m| format!("{:02}", m)).collect();
            output.push_str(&format!("  {}: {}\n", year, list.join(", ")));
        }
    }

    if !resolution.incomplete.is_empty() {
        output.push_str("\nIncomplete months (resolved from a partial extract):\n");
        for (bank, month) in &resolution.incomplete {
            output.push_str(&format!("  {} {}\n", bank, month));
        }
    }

    if !resolution.empty.is_empty() {
        output.push_str("\nMonths without rows (left as gaps):\n");
        for (bank, month) in &resolution.empty {
            output.push_str(&format!("  {} {}\n", bank, month));
        }
    }

    push_skipped(&mut output, resolution);
    output
}

fn push_skipped(output: &mut String, resolution: &Resolution) {
    if resolution.skipped.is_empty() {
        return;
    }
    output.push_str("\nSkipped files:\n");
    for skipped in &resolution.skipped {
        output.push_str(&format!(
            "  {} ({})\n",
            skipped.path.display(),
            skipped.reason
        ));
    }
}
