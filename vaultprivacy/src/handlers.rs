use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use vaultprivacy_core::report::{
    ReportFormat, ReportSummary, generate_csv_report, generate_markdown_report, risky_services,
    save_report,
};
use vaultprivacy_core::{
    AnalysisProgressCallback, MultiPartSuffixes, VaultFormat, analyze, extract_domains_with,
    unique_root_domains,
};
use vaultprivacy_lookup::client::DEFAULT_DELAY_MS;
use vaultprivacy_lookup::search::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use vaultprivacy_lookup::{Grade, LookupConfig, RatingCache, RatingClient, RatingRecord, ServiceSearch};

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub vault_file: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<ReportFormat>,
    pub verbose: bool,
    pub quiet: bool,
    pub cache_path: PathBuf,
    pub suffixes_file: Option<PathBuf>,
    pub lookup: LookupConfig,
}

impl RunOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let cache = matches
            .get_one::<String>("cache")
            .map(String::as_str)
            .unwrap_or(vaultprivacy_lookup::cache::DEFAULT_CACHE_FILE);
        let timeout = matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let delay = matches
            .get_one::<u64>("delay-ms")
            .copied()
            .unwrap_or(DEFAULT_DELAY_MS);

        Self {
            vault_file: matches
                .get_one::<PathBuf>("VAULT_FILE")
                .cloned()
                .unwrap_or_default(),
            output_dir: matches
                .get_one::<PathBuf>("output-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
            formats: ReportFormat::selected(
                matches.get_flag("csv-only"),
                matches.get_flag("markdown-only"),
            ),
            verbose: matches.get_flag("verbose"),
            quiet: matches.get_flag("quiet"),
            cache_path: expand_path(cache),
            suffixes_file: matches.get_one::<PathBuf>("suffixes").cloned(),
            lookup: LookupConfig {
                endpoint: matches
                    .get_one::<String>("endpoint")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                timeout: Duration::from_secs(timeout),
                delay: Duration::from_millis(delay),
            },
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub records: Vec<RatingRecord>,
    pub reports: Vec<PathBuf>,
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Install the stderr log subscriber. `--verbose` turns on debug output.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn print_banner() {
    println!("{}", "🔍 VaultPrivacy - Privacy Analysis Tool".bright_white().bold());
    print_divider();
}

fn print_divider() {
    println!("{}", "=".repeat(50).bright_blue());
}

/// Check the vault path exists and has a supported extension.
pub fn validate_vault_file(path: &Path) -> Result<VaultFormat> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    VaultFormat::from_path(path).map_err(|_| anyhow!("File must be CSV or JSON format"))
}

pub fn load_suffixes(path: Option<&Path>) -> Result<MultiPartSuffixes> {
    let mut suffixes = MultiPartSuffixes::default();
    if let Some(path) = path {
        let added = suffixes
            .extend_from_file(path)
            .with_context(|| format!("Failed to read suffix file {}", path.display()))?;
        info!("Loaded {} extra suffixes from {}", added, path.display());
    }
    Ok(suffixes)
}

/// Write the selected reports into `output_dir`, creating it if needed.
pub fn write_reports(
    records: &[RatingRecord],
    formats: &[ReportFormat],
    output_dir: &Path,
    vault_file: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for format in formats {
        let path = format.output_path(output_dir, vault_file);
        let content = match format {
            ReportFormat::Csv => generate_csv_report(records)?,
            ReportFormat::Markdown => generate_markdown_report(records, &chrono::Local::now()),
        };
        save_report(&content, &path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Wrote {:?} report to {}", format, path.display());
        written.push(path);
    }

    Ok(written)
}

/// Full pipeline against the ToS;DR endpoint named in `options`.
pub async fn handle_analyze(options: &RunOptions) -> Result<RunSummary> {
    let client = RatingClient::from_config(&options.lookup)
        .context("Failed to build HTTP client")?;
    run_analysis(options, &client).await
}

/// Full pipeline: parse, normalize, rate, report.
pub async fn run_analysis<S: ServiceSearch>(
    options: &RunOptions,
    client: &RatingClient<S>,
) -> Result<RunSummary> {
    validate_vault_file(&options.vault_file)?;
    let suffixes = load_suffixes(options.suffixes_file.as_deref())?;
    let say = |msg: String| {
        if !options.quiet {
            println!("{}", msg);
        }
    };

    say(format!(
        "{} Parsing Bitwarden export: {}",
        "1.".bright_blue().bold(),
        options.vault_file.display()
    ));
    let domains = extract_domains_with(&options.vault_file, &suffixes)
        .with_context(|| format!("Failed to parse {}", options.vault_file.display()))?;
    say(format!("   Found {} unique domains", domains.len()));

    if domains.is_empty() {
        bail!("No domains found in vault file");
    }
    if options.verbose {
        say(format!("   Domains: {}", domains.join(", ")));
    }

    say(format!("{} Normalizing domains...", "2.".bright_blue().bold()));
    let roots = unique_root_domains(&domains, &suffixes);
    say(format!("   Normalized to {} unique root domains", roots.len()));
    if options.verbose {
        say(format!("   Normalized domains: {}", roots.join(", ")));
    }

    say(format!("{} Fetching ToS;DR privacy ratings...", "3.".bright_blue().bold()));
    let mut cache = RatingCache::load(&options.cache_path);

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(roots.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("   [{pos}/{len}] {bar:30.cyan/blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    };
    let progress_clone = progress.clone();
    let callback: AnalysisProgressCallback = Arc::new(move |index: usize, total: usize, domain: &str| {
        progress_clone.set_length(total as u64);
        progress_clone.set_position(index.saturating_sub(1) as u64);
        progress_clone.set_message(format!("Looking up: {}", domain));
    });

    let records = analyze(&roots, &suffixes, client, &mut cache, Some(callback)).await;
    progress.finish_and_clear();

    if options.verbose {
        for record in &records {
            say(format!(
                "      {} -> {} ({}, id {})",
                record.domain,
                record.grade,
                record.name,
                record
                    .service_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string())
            ));
        }
    }

    say(format!("{} Generating reports...", "4.".bright_blue().bold()));
    let reports = write_reports(
        &records,
        &options.formats,
        &options.output_dir,
        &options.vault_file,
    )?;

    Ok(RunSummary { records, reports })
}

fn grade_colored(grade: Grade) -> colored::ColoredString {
    match grade {
        Grade::A | Grade::B => grade.as_str().green().bold(),
        Grade::C => grade.as_str().yellow().bold(),
        Grade::D | Grade::E => grade.as_str().red().bold(),
        Grade::Unknown => grade.as_str().dimmed(),
    }
}

pub fn print_summary(summary: &RunSummary) {
    let stats = ReportSummary::from_records(&summary.records);

    println!();
    print_divider();
    println!("{}", "✓ ANALYSIS COMPLETE!".green().bold());
    print_divider();

    println!("{}", "📊 Summary:".bright_white().bold());
    println!("   Total services analyzed: {}", stats.total);
    println!("   Found in ToS;DR: {}", stats.found.to_string().green());
    println!("   Unknown services: {}", stats.unknown.to_string().dimmed());

    if !stats.grade_counts.is_empty() {
        println!("   Grade distribution:");
        for (grade, count) in &stats.grade_counts {
            println!("     Grade {}: {} services", grade_colored(*grade), count);
        }
    }

    let risky = risky_services(&summary.records);
    if !risky.is_empty() {
        println!();
        println!("{}", "⚠  Services with poor privacy practices:".yellow().bold());
        for record in risky {
            println!(
                "   - {} ({}): Grade {}",
                record.name,
                record.domain,
                grade_colored(record.grade)
            );
        }
    }

    println!();
    println!("{}", "📁 Reports generated:".bright_white().bold());
    for report in &summary.reports {
        println!("   - {}", report.display().to_string().bright_white());
    }

    println!();
    println!("{}", "🎯 Next steps:".bright_white().bold());
    println!("   1. Review the generated reports");
    println!("   2. Consider alternatives for services with grades D or E");
    println!("   3. Research unknown services manually");
    println!("   4. Run this analysis periodically");
}
