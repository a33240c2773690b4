use anyhow::Result;
use clap::Parser;
use tracing::error;

use domainfeed::pipeline::{print_collection_report, print_feed_report};
use domainfeed::utils::{setup_logging, validate_args};
use domainfeed::{collect_domains, generate_feeds, init_default_config, load_config, Args, Command};

fn run(args: &Args) -> Result<bool> {
    if args.command == Command::Init {
        init_default_config(&args.dir)?;
        return Ok(true);
    }

    let config = load_config(args.config.as_deref(), &args.dir)?;

    if matches!(args.command, Command::Collect | Command::Run) {
        let report = collect_domains(&config, &args.dir)?;
        print_collection_report(&report);
    }

    if matches!(args.command, Command::Score | Command::Run) {
        match generate_feeds(&config, &args.dir)? {
            Some(report) => print_feed_report(&report),
            None => {
                eprintln!(
                    "No collector CSV found in {}: run `domainfeed collect` first to produce fresh_domains_YYYY-MM-DD_HHMM.csv",
                    args.dir.display()
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    match run(&args) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
