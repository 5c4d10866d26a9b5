// Tests for report generation functionality

use chrono::{Local, TimeZone};
use std::path::Path;
use tempfile::TempDir;
use vaultprivacy_core::report::{
    ReportFormat, ReportSummary, generate_csv_report, generate_markdown_report, save_report,
};
use vaultprivacy_lookup::{Grade, RatingRecord};

fn record(domain: &str, grade: Grade, service_id: Option<i64>, name: &str) -> RatingRecord {
    RatingRecord {
        domain: domain.to_string(),
        grade,
        service_id,
        name: name.to_string(),
    }
}

fn sample_records() -> Vec<RatingRecord> {
    vec![
        record("google.com", Grade::E, Some(217), "Google"),
        record("github.com", Grade::B, Some(297), "GitHub"),
        RatingRecord::unknown("example.com"),
        record("facebook.com", Grade::E, Some(182), "Facebook"),
        record("duckduckgo.com", Grade::A, Some(222), "DuckDuckGo"),
    ]
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_selection() {
    assert_eq!(
        ReportFormat::selected(false, false),
        vec![ReportFormat::Csv, ReportFormat::Markdown]
    );
    assert_eq!(ReportFormat::selected(true, false), vec![ReportFormat::Csv]);
    assert_eq!(ReportFormat::selected(false, true), vec![ReportFormat::Markdown]);
}

#[test]
fn test_report_paths_use_vault_stem() {
    let out = Path::new("/tmp/reports");
    let vault = Path::new("/home/me/bitwarden_export.json");

    assert_eq!(
        ReportFormat::Csv.output_path(out, vault),
        out.join("vault_privacy_analysis_bitwarden_export.csv")
    );
    assert_eq!(
        ReportFormat::Markdown.output_path(out, vault),
        out.join("vault_privacy_summary_bitwarden_export.md")
    );
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_counts() {
    let summary = ReportSummary::from_records(&sample_records());

    assert_eq!(summary.total, 5);
    assert_eq!(summary.found, 4);
    assert_eq!(summary.unknown, 1);
    assert_eq!(summary.count(Grade::E), 2);
    assert_eq!(summary.count(Grade::C), 0);
    assert!((summary.percentage(summary.found) - 80.0).abs() < f64::EPSILON);
}

// ============================================================================
// CSV Tests
// ============================================================================

#[test]
fn test_csv_report_rows() {
    let csv = generate_csv_report(&sample_records()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "service,domain,grade,service_id,status");
    assert_eq!(lines[1], "Google,google.com,E,217,Found");
    assert_eq!(lines[3], "example.com,example.com,Unknown,,Unknown");
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_csv_report_quotes_commas_in_names() {
    let records = vec![record("acme.com", Grade::C, Some(9), "Acme, Inc.")];
    let csv = generate_csv_report(&records).unwrap();

    assert!(csv.contains("\"Acme, Inc.\",acme.com,C,9,Found"));
}

#[test]
fn test_csv_report_empty() {
    let csv = generate_csv_report(&[]).unwrap();
    assert_eq!(csv, "service,domain,grade,service_id,status\n");
}

// ============================================================================
// Markdown Tests
// ============================================================================

#[test]
fn test_markdown_report_sections() {
    let generated_at = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let report = generate_markdown_report(&sample_records(), &generated_at);

    assert!(report.starts_with("# VaultPrivacy Analysis Report"));
    assert!(report.contains("**Generated:** 2024-01-15 09:30:00"));
    assert!(report.contains("**Total Services Analyzed:** 5"));
    assert!(report.contains("- **Rated Services:** 4 (80.0%)"));
    assert!(report.contains("- **Unknown Services:** 1 (20.0%)"));
    assert!(report.contains("- **2 services** have very poor privacy practices (Grade E)"));
    assert!(!report.contains("(Grade D)"));
    assert!(report.contains("| E | 2 | 40.0% |"));
    assert!(report.contains("| Unknown | 1 | 20.0% |"));
    assert!(report.contains("## Services with Poor Privacy Practices"));
    assert!(report.contains("## Complete Service Analysis"));
}

#[test]
fn test_markdown_complete_table_is_sorted() {
    let generated_at = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let report = generate_markdown_report(&sample_records(), &generated_at);

    let table = report
        .split("## Complete Service Analysis")
        .nth(1)
        .unwrap();
    let duck = table.find("| DuckDuckGo |").unwrap();
    let github = table.find("| GitHub |").unwrap();
    let facebook = table.find("| Facebook |").unwrap();
    let google = table.find("| Google |").unwrap();
    let example = table.find("| example.com |").unwrap();

    assert!(duck < github);
    assert!(github < facebook);
    assert!(facebook < google);
    assert!(google < example);
    assert!(table.contains("| example.com | example.com | Unknown |  | Unknown |"));
}

#[test]
fn test_markdown_without_risky_services() {
    let generated_at = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let records = vec![record("github.com", Grade::B, Some(297), "GitHub")];
    let report = generate_markdown_report(&records, &generated_at);

    assert!(!report.contains("## Services with Poor Privacy Practices"));
    assert!(report.contains("| B | 1 | 100.0% |"));
}

#[test]
fn test_markdown_empty_records() {
    let generated_at = Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
    let report = generate_markdown_report(&[], &generated_at);

    assert!(report.contains("- **Rated Services:** 0 (0.0%)"));
    assert!(report.contains("*Generated by VaultPrivacy v"));
}

#[test]
fn test_save_report() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("report.md");

    save_report("# hello\n", &path)?;
    assert_eq!(std::fs::read_to_string(&path)?, "# hello\n");
    Ok(())
}
