use anyhow::Result;
use chrono::Local;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::collector::run_collector;
use crate::config::Config;
use crate::feed::run_scorer;
use crate::fetch::HttpFetcher;
use crate::stats::{CollectionReport, FeedReport};
use crate::utils::format_number;

pub fn collect_domains(config: &Config, dir: &Path) -> Result<CollectionReport> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "pipeline", stage = "collect", "Starting domain collection");

    let fetcher = HttpFetcher::new(&config.collector.user_agent, config.collector.timeout())?;
    let report = run_collector(&fetcher, &config.collector, dir, Local::now())?;

    info!(
        action = "complete",
        component = "pipeline",
        stage = "collect",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Domain collection finished"
    );
    Ok(report)
}

pub fn generate_feeds(config: &Config, dir: &Path) -> Result<Option<FeedReport>> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "pipeline", stage = "score", "Starting feed generation");

    let report = run_scorer(dir, &config.scoring)?;

    info!(
        action = "complete",
        component = "pipeline",
        stage = "score",
        produced = report.is_some(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "Feed generation finished"
    );
    Ok(report)
}

pub fn print_collection_report(report: &CollectionReport) {
    println!("\n--- Domain Collection ---");

    for source in &report.sources {
        match &source.error {
            Some(error) => println!("- {}: failed ({})", source.name, error),
            None => println!("- {}: {} domains", source.name, format_number(source.found)),
        }
    }

    println!(
        "Collected {} unique domains, {} passed the TLD and keyword filter",
        format_number(report.collected),
        format_number(report.filtered)
    );
    if report.used_fallback {
        println!("No source produced a usable domain; wrote the fallback list instead");
    }
    println!(
        "Saved {} domains to {} and {}",
        format_number(report.domains.len()),
        report.txt_path.display(),
        report.csv_path.display()
    );
}

pub fn print_feed_report(report: &FeedReport) {
    println!("\n--- Feed Generation ---");
    println!("Source: {}", report.source_csv.display());
    println!(
        "Total: {}, premium (score >= {}): {}",
        format_number(report.total),
        report.premium_threshold,
        format_number(report.premium)
    );

    for (niche, counts) in &report.niche_counts {
        println!(
            "- {}: {} domains, {} premium",
            niche,
            format_number(counts.all),
            format_number(counts.premium)
        );
    }

    println!("Wrote {} files:", report.files.len());
    for file in &report.files {
        println!("  {}", file.display());
    }
}
