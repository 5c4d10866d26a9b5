use crate::CLAP_STYLING;
use clap::arg;
use std::path::PathBuf;
use vaultprivacy_lookup::cache::DEFAULT_CACHE_FILE;
use vaultprivacy_lookup::client::DEFAULT_DELAY_MS;
use vaultprivacy_lookup::search::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("vaultprivacy")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("vaultprivacy")
        .about("Analyze privacy risks of services in your Bitwarden vault")
        .after_help(
            "Examples:\n  vaultprivacy vault_export.json\n  vaultprivacy vault_export.csv \
             --output-dir ./reports\n  vaultprivacy vault_export.json --csv-only",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!(<VAULT_FILE>)
                .help("Path to Bitwarden vault export file (CSV or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(-o --"output-dir" <DIR>)
                .required(false)
                .help("Output directory for reports")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            arg!(--"csv-only")
                .required(false)
                .help("Generate only the CSV report")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("markdown-only"),
        )
        .arg(
            arg!(--"markdown-only")
                .required(false)
                .help("Generate only the Markdown report")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("csv-only"),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("List domains and lookup results, enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-q --"quiet")
                .required(false)
                .help("Suppress banner, progress and summary output")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            arg!(--"cache" <PATH>)
                .required(false)
                .help("Rating cache file (~ is expanded)")
                .default_value(DEFAULT_CACHE_FILE),
        )
        .arg(
            arg!(--"endpoint" <URL>)
                .required(false)
                .help("ToS;DR search endpoint")
                .default_value(DEFAULT_ENDPOINT),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help(format!("Request timeout in seconds [default: {}]", DEFAULT_TIMEOUT_SECS))
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            arg!(--"delay-ms" <MS>)
                .required(false)
                .help(format!(
                    "Pause after each uncached lookup, in milliseconds [default: {}]",
                    DEFAULT_DELAY_MS
                ))
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--"suffixes" <PATH>)
                .required(false)
                .help("Extra multi-part public suffixes, one per line (e.g. co.nz)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}
