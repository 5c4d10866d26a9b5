use colored::Colorize;
use vaultprivacy::command_argument_builder;
use vaultprivacy::handlers::{RunOptions, handle_analyze, init_logging, print_banner, print_summary};

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let options = RunOptions::from_matches(&matches);

    init_logging(options.verbose);

    if !options.quiet {
        print_banner();
    }

    tokio::select! {
        result = handle_analyze(&options) => match result {
            Ok(summary) => {
                if !options.quiet {
                    print_summary(&summary);
                }
            }
            Err(e) => {
                eprintln!("\n{} Error: {:#}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n\n{} Analysis interrupted by user", "✗".red().bold());
            std::process::exit(1);
        }
    }
}
