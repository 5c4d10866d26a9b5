// Report generation from rating results

use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vaultprivacy_lookup::{Grade, RatingRecord};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub const CSV_HEADER: [&str; 5] = ["service", "domain", "grade", "service_id", "status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Markdown,
}

impl ReportFormat {
    /// Formats to write given the `--csv-only` / `--markdown-only` flags.
    pub fn selected(csv_only: bool, markdown_only: bool) -> Vec<Self> {
        let mut formats = Vec::new();
        if !markdown_only {
            formats.push(ReportFormat::Csv);
        }
        if !csv_only {
            formats.push(ReportFormat::Markdown);
        }
        formats
    }

    /// File name for a report about the vault file named `stem`.
    pub fn file_name(&self, stem: &str) -> String {
        match self {
            ReportFormat::Csv => format!("vault_privacy_analysis_{}.csv", stem),
            ReportFormat::Markdown => format!("vault_privacy_summary_{}.md", stem),
        }
    }

    pub fn output_path(&self, output_dir: &Path, vault_path: &Path) -> PathBuf {
        let stem = vault_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vault".to_string());
        output_dir.join(self.file_name(&stem))
    }
}

/// Counts shared by the Markdown report and the console summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub found: usize,
    pub unknown: usize,
    pub grade_counts: BTreeMap<Grade, usize>,
}

impl ReportSummary {
    pub fn from_records(records: &[RatingRecord]) -> Self {
        let mut grade_counts = BTreeMap::new();
        for record in records {
            *grade_counts.entry(record.grade).or_insert(0) += 1;
        }
        let unknown = grade_counts.get(&Grade::Unknown).copied().unwrap_or(0);

        Self {
            total: records.len(),
            found: records.len() - unknown,
            unknown,
            grade_counts,
        }
    }

    pub fn count(&self, grade: Grade) -> usize {
        self.grade_counts.get(&grade).copied().unwrap_or(0)
    }

    /// Share of all records, 0.0 when there are none.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// All records ordered by grade (A first, Unknown last), then by name.
pub fn sorted_by_grade(records: &[RatingRecord]) -> Vec<&RatingRecord> {
    let mut sorted: Vec<&RatingRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.grade
            .rank()
            .cmp(&b.grade.rank())
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted
}

/// D and E graded records, E first, otherwise in input order.
pub fn risky_services(records: &[RatingRecord]) -> Vec<&RatingRecord> {
    let mut risky: Vec<&RatingRecord> = records.iter().filter(|r| r.grade.is_risky()).collect();
    risky.sort_by_key(|r| if r.grade == Grade::E { 0 } else { 1 });
    risky
}

fn service_id_cell(record: &RatingRecord) -> String {
    record
        .service_id
        .map(|id| id.to_string())
        .unwrap_or_default()
}

pub fn write_csv_report<W: Write>(records: &[RatingRecord], writer: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    for record in records {
        writer.write_record([
            record.name.as_str(),
            record.domain.as_str(),
            record.grade.as_str(),
            service_id_cell(record).as_str(),
            record.status(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn generate_csv_report(records: &[RatingRecord]) -> Result<String, ReportError> {
    let mut buffer = Vec::new();
    write_csv_report(records, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn grade_description(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "Excellent privacy practices",
        Grade::B => "Good privacy practices",
        Grade::C => "Average privacy practices",
        Grade::D => "Poor privacy practices",
        Grade::E => "Very poor privacy practices",
        Grade::Unknown => "No rating available",
    }
}

pub fn generate_markdown_report(records: &[RatingRecord], generated_at: &DateTime<Local>) -> String {
    let summary = ReportSummary::from_records(records);
    let mut report = String::new();

    report.push_str("# VaultPrivacy Analysis Report\n\n");
    report.push_str(&format!(
        "**Generated:** {}  \n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("**Total Services Analyzed:** {}  \n", summary.total));
    report.push_str(&format!("**Services Found in ToS;DR:** {}  \n", summary.found));
    report.push_str(&format!("**Unknown Services:** {}  \n\n", summary.unknown));
    report.push_str("---\n\n");

    report.push_str("## Overview\n\n");
    report.push_str(
        "This report analyzes the privacy practices of services found in your password vault \
         using data from [ToS;DR](https://tosdr.org/) (Terms of Service; Didn't Read). Each \
         service is assigned a privacy grade from A (excellent) to E (very poor).\n\n",
    );
    report.push_str("### Privacy Grade Scale\n\n");
    report.push_str("| Grade | Description |\n");
    report.push_str("|-------|-------------|\n");
    for grade in Grade::ALL {
        report.push_str(&format!("| {} | {} |\n", grade, grade_description(grade)));
    }
    report.push_str("\n---\n\n");

    report.push_str("## Executive Summary\n\n");
    report.push_str(&format!("- **Total Services:** {}\n", summary.total));
    report.push_str(&format!(
        "- **Rated Services:** {} ({:.1}%)\n",
        summary.found,
        summary.percentage(summary.found)
    ));
    report.push_str(&format!(
        "- **Unknown Services:** {} ({:.1}%)\n\n",
        summary.unknown,
        summary.percentage(summary.unknown)
    ));

    report.push_str("### Key Findings\n\n");
    for grade in [Grade::E, Grade::D, Grade::A, Grade::B] {
        let count = summary.count(grade);
        if count > 0 {
            report.push_str(&format!(
                "- **{} services** have {} (Grade {})\n",
                count,
                grade_description(grade).to_lowercase(),
                grade
            ));
        }
    }
    report.push_str("\n---\n\n");

    report.push_str("## Grade Distribution\n\n");
    report.push_str("| Grade | Count | Percentage |\n");
    report.push_str("|-------|-------|------------|\n");
    for (grade, count) in &summary.grade_counts {
        report.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            grade,
            count,
            summary.percentage(*count)
        ));
    }
    report.push('\n');

    let risky = risky_services(records);
    if !risky.is_empty() {
        report.push_str("## Services with Poor Privacy Practices\n\n");
        report.push_str("| Service | Domain | Grade | ToS;DR ID |\n");
        report.push_str("|---------|--------|-------|-----------|\n");
        for record in risky {
            report.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&record.name),
                record.domain,
                record.grade,
                service_id_cell(record)
            ));
        }
        report.push('\n');
    }

    report.push_str("## Complete Service Analysis\n\n");
    report.push_str("| Service | Domain | Grade | ToS;DR ID | Status |\n");
    report.push_str("|---------|--------|-------|-----------|--------|\n");
    for record in sorted_by_grade(records) {
        report.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&record.name),
            record.domain,
            record.grade,
            service_id_cell(record),
            record.status()
        ));
    }
    report.push('\n');

    report.push_str(MARKDOWN_FOOTER);
    report.push_str(&format!(
        "\n*Generated by VaultPrivacy v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    report
}

const MARKDOWN_FOOTER: &str = "---

## About This Report

This report was generated by **VaultPrivacy**, a tool for analyzing privacy risks in your password manager vault.

### Data Sources

- **ToS;DR (Terms of Service; Didn't Read)**: https://tosdr.org/
- **Privacy Ratings**: Based on community-reviewed analysis of terms of service

### Recommendations

1. **Review Poor-Rated Services**: Consider alternatives for services with grades D or E
2. **Investigate Unknown Services**: Research privacy practices for services without ToS;DR data
3. **Regular Audits**: Re-run this analysis periodically as services update their policies
4. **Privacy Settings**: Review and adjust privacy settings for all services

### Disclaimer

This analysis is based on publicly available information and community reviews. Privacy practices can change over time, and this tool should not be the sole basis for privacy decisions.

---
";

// Service names come from a third party; keep them from breaking the table.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn save_report(content: &str, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
