use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::CollectorConfig;
use crate::domain::{contains_any, has_suffix_in};
use crate::fetch::Fetcher;
use crate::sources::{parse_body, Source};
use crate::stats::{CollectionReport, SourceReport};

/// Fetches one source. Failures are logged and contribute nothing.
pub fn fetch_source(fetcher: &dyn Fetcher, source: &Source) -> (BTreeSet<String>, SourceReport) {
    let start_time = Instant::now();

    let outcome = fetcher.fetch(&source.url).and_then(|response| {
        if !response.is_success() {
            anyhow::bail!("returned status {}", response.status);
        }
        Ok(parse_body(&response.body))
    });

    match outcome {
        Ok(domains) => {
            info!(
                action = "fetch",
                component = "source",
                source = source.name.as_str(),
                domain_count = domains.len(),
                duration_ms = start_time.elapsed().as_millis(),
                "Source fetched"
            );
            let report = SourceReport {
                name: source.name.clone(),
                found: domains.len(),
                error: None,
            };
            (domains, report)
        }
        Err(e) => {
            warn!(
                action = "fetch",
                component = "source",
                source = source.name.as_str(),
                error = %e,
                duration_ms = start_time.elapsed().as_millis(),
                "Source failed"
            );
            let report = SourceReport {
                name: source.name.clone(),
                found: 0,
                error: Some(format!("{:#}", e)),
            };
            (BTreeSet::new(), report)
        }
    }
}

/// Union of every source, tried in order with a pause between attempts.
pub fn gather(fetcher: &dyn Fetcher, config: &CollectorConfig) -> (BTreeSet<String>, Vec<SourceReport>) {
    let mut domains = BTreeSet::new();
    let mut reports = Vec::with_capacity(config.sources.len());

    for (idx, source) in config.sources.iter().enumerate() {
        if idx > 0 && !config.delay().is_zero() {
            thread::sleep(config.delay());
        }
        let (found, report) = fetch_source(fetcher, source);
        domains.extend(found);
        reports.push(report);
    }

    (domains, reports)
}

pub fn filter_domains(domains: &BTreeSet<String>, config: &CollectorConfig) -> BTreeSet<String> {
    domains
        .iter()
        .filter(|d| has_suffix_in(d, &config.allowed_tlds) && contains_any(d, &config.keywords).is_some())
        .cloned()
        .collect()
}

/// Timestamp layout embedded in collector file names.
pub const STAMP_FORMAT: &str = "%Y-%m-%d_%H%M";

pub fn output_paths(dir: &Path, stamp: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("fresh_domains_{}.txt", stamp)),
        dir.join(format!("fresh_domains_{}.csv", stamp)),
    )
}

/// Writes the sorted list as `fresh_domains_<stamp>.txt` and `.csv`.
pub fn write_outputs(dir: &Path, domains: &BTreeSet<String>, stamp: &str) -> Result<(PathBuf, PathBuf)> {
    let (txt_path, csv_path) = output_paths(dir, stamp);

    let mut txt = BufWriter::new(
        File::create(&txt_path).with_context(|| format!("Failed to create {:?}", txt_path))?,
    );
    for domain in domains {
        writeln!(txt, "{}", domain)?;
    }
    txt.flush()
        .with_context(|| format!("Failed to write {:?}", txt_path))?;

    let mut csv = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("Failed to create {:?}", csv_path))?;
    csv.write_record(["domain"])?;
    for domain in domains {
        csv.write_record([domain.as_str()])?;
    }
    csv.flush()
        .with_context(|| format!("Failed to write {:?}", csv_path))?;

    Ok((txt_path, csv_path))
}

pub fn run_collector(
    fetcher: &dyn Fetcher,
    config: &CollectorConfig,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<CollectionReport> {
    let start_time = Instant::now();
    info!(action = "start", component = "collector", source_count = config.sources.len(), "Trying public sources");

    let (collected, sources) = gather(fetcher, config);
    let mut filtered = filter_domains(&collected, config);
    let filtered_count = filtered.len();
    info!(
        action = "filter",
        component = "collector",
        collected = collected.len(),
        kept = filtered_count,
        "Filtered collected domains"
    );

    let used_fallback = filtered.is_empty();
    if used_fallback {
        warn!(
            action = "fallback",
            component = "collector",
            fallback_count = config.fallback.len(),
            "No filtered domains from any source, using fallback list"
        );
        filtered = config.fallback.iter().cloned().collect();
    }

    let stamp = now.format(STAMP_FORMAT).to_string();
    let (txt_path, csv_path) = write_outputs(dir, &filtered, &stamp)?;

    info!(
        action = "complete",
        component = "collector",
        domain_count = filtered.len(),
        txt_path = ?txt_path,
        csv_path = ?csv_path,
        duration_ms = start_time.elapsed().as_millis(),
        "Collection completed"
    );

    Ok(CollectionReport {
        sources,
        collected: collected.len(),
        filtered: filtered_count,
        used_fallback,
        domains: filtered.into_iter().collect(),
        txt_path,
        csv_path,
    })
}
