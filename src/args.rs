use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "domainfeed",
    about = "Collect fresh domains from public sources and score them into resale feeds",
    version,
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Directory for collector output and feed files
    #[arg(short, long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch domains from every configured source and write a timestamped list
    Collect,
    /// Score the latest collected list and write the JSON and niche CSV feeds
    Score,
    /// Collect, then score
    Run,
    /// Write domainfeed.json with the default configuration
    Init,
}
