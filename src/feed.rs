use anyhow::{Context, Result};
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::collector::STAMP_FORMAT;
use crate::config::{CsvSchema, ScoringConfig};
use crate::scoring::{detect_niche, score_domain, Niche};
use crate::stats::{FeedReport, NicheCount};

pub const FEED_FILE: &str = "feed.json";
pub const PREMIUM_FEED_FILE: &str = "premium_feed.json";

fn collector_csv_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^fresh_domains_(\d{4}-\d{2}-\d{2}_\d{4})\.csv$")
            .expect("collector file name pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredDomain {
    pub domain: String,
    pub niche: Niche,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub updated: String,
    pub count: usize,
    pub items: Vec<ScoredDomain>,
}

impl Feed {
    pub fn new(items: Vec<ScoredDomain>) -> Self {
        Self {
            updated: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            count: items.len(),
            items,
        }
    }
}

/// Newest collector CSV in `dir`, judged by the timestamp in its name.
pub fn find_latest_csv(dir: &Path) -> Result<Option<PathBuf>> {
    let mut latest: Option<(NaiveDateTime, PathBuf)> = None;

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(captures) = collector_csv_pattern().captures(name) else {
            continue;
        };
        let Ok(stamp) = NaiveDateTime::parse_from_str(&captures[1], STAMP_FORMAT) else {
            debug!(action = "skip", component = "input_discovery", file_name = name, "Ignoring file with unparseable timestamp");
            continue;
        };

        if latest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            latest = Some((stamp, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

/// Reads domains from a collector CSV. Uses the `domain` column when the
/// header has one, otherwise the first non-empty value of each row.
pub fn read_domains(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?}", path))?;

    let domain_column = reader
        .headers()
        .with_context(|| format!("Failed to read header of {:?}", path))?
        .iter()
        .position(|h| h.trim() == "domain");

    let mut domains = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read row of {:?}", path))?;
        let value = match domain_column {
            Some(idx) => record.get(idx).unwrap_or(""),
            None => record.iter().find(|v| !v.is_empty()).unwrap_or(""),
        };
        let domain = value.trim().to_lowercase();
        if !domain.is_empty() {
            domains.push(domain);
        }
    }
    Ok(domains)
}

pub fn score_all(domains: &[String], cfg: &ScoringConfig) -> Vec<ScoredDomain> {
    domains
        .iter()
        .map(|domain| ScoredDomain {
            domain: domain.clone(),
            niche: detect_niche(domain, cfg),
            score: score_domain(domain, cfg),
        })
        .collect()
}

/// Items at or above `threshold`. The input is left untouched.
pub fn premium_items(items: &[ScoredDomain], threshold: u8) -> Vec<ScoredDomain> {
    items
        .iter()
        .filter(|item| item.score >= threshold)
        .cloned()
        .collect()
}

pub fn group_by_niche(items: &[ScoredDomain]) -> BTreeMap<Niche, Vec<&ScoredDomain>> {
    let mut groups: BTreeMap<Niche, Vec<&ScoredDomain>> = BTreeMap::new();
    for item in items {
        groups.entry(item.niche).or_default().push(item);
    }
    groups
}

pub fn write_feed_json(path: &Path, feed: &Feed) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, feed)
        .with_context(|| format!("Failed to write {:?}", path))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Writes `<prefix>_<niche>.csv` for every niche present in `items`.
pub fn write_niche_csvs(
    dir: &Path,
    prefix: &str,
    items: &[ScoredDomain],
    schema: CsvSchema,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (niche, group) in group_by_niche(items) {
        let path = dir.join(format!("{}_{}.csv", prefix, niche));
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("Failed to create {:?}", path))?;

        match schema {
            CsvSchema::DomainScore => writer.write_record(["domain", "score"])?,
            CsvSchema::DomainTitleScore => writer.write_record(["domain", "title", "score"])?,
        }
        for item in &group {
            let score = item.score.to_string();
            match schema {
                CsvSchema::DomainScore => writer.write_record([item.domain.as_str(), score.as_str()])?,
                CsvSchema::DomainTitleScore => {
                    writer.write_record([item.domain.as_str(), "", score.as_str()])?
                }
            }
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {:?}", path))?;

        info!(action = "write", component = "niche_csv", niche = %niche, item_count = group.len(), file_path = ?path, "Wrote niche CSV");
        written.push(path);
    }

    Ok(written)
}

/// Scores the latest collector CSV in `dir`. Returns `None`, writing
/// nothing, when no collector CSV exists.
pub fn run_scorer(dir: &Path, cfg: &ScoringConfig) -> Result<Option<FeedReport>> {
    let start_time = Instant::now();
    info!(action = "start", component = "feed_scorer", dir = ?dir, "Starting feed generation");

    let Some(source_csv) = find_latest_csv(dir)? else {
        error!(action = "discover", component = "input_discovery", dir = ?dir, "No collector CSV found");
        return Ok(None);
    };
    info!(action = "discover", component = "input_discovery", file_path = ?source_csv, "Using latest collector CSV");

    let domains = read_domains(&source_csv)?;
    let items = score_all(&domains, cfg);
    let premium = premium_items(&items, cfg.premium_threshold);
    info!(
        action = "score",
        component = "feed_scorer",
        total = items.len(),
        premium = premium.len(),
        threshold = cfg.premium_threshold,
        "Scored domains"
    );

    let mut niche_counts: BTreeMap<Niche, NicheCount> = BTreeMap::new();
    for item in &items {
        niche_counts.entry(item.niche).or_default().all += 1;
    }
    for item in &premium {
        niche_counts.entry(item.niche).or_default().premium += 1;
    }

    let mut files = Vec::new();

    let feed_path = dir.join(FEED_FILE);
    write_feed_json(&feed_path, &Feed::new(items.clone()))?;
    info!(action = "write", component = "feed_json", item_count = items.len(), file_path = ?feed_path, "Wrote feed");
    files.push(feed_path);

    let premium_path = dir.join(PREMIUM_FEED_FILE);
    write_feed_json(&premium_path, &Feed::new(premium.clone()))?;
    info!(action = "write", component = "feed_json", item_count = premium.len(), file_path = ?premium_path, "Wrote premium feed");
    files.push(premium_path);

    files.extend(write_niche_csvs(dir, "fresh", &items, cfg.csv_schema)?);
    files.extend(write_niche_csvs(dir, "premium", &premium, cfg.csv_schema)?);

    info!(
        action = "complete",
        component = "feed_scorer",
        file_count = files.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Feed generation completed"
    );

    Ok(Some(FeedReport {
        source_csv,
        total: items.len(),
        premium: premium.len(),
        premium_threshold: cfg.premium_threshold,
        niche_counts,
        files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn latest_csv_is_picked_by_timestamp() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "fresh_domains_2025-12-31_2359.csv", "domain\n");
        let newest = touch(dir.path(), "fresh_domains_2026-01-01_0005.csv", "domain\n");
        touch(dir.path(), "fresh_domains_2025-06-01_1200.csv", "domain\n");

        assert_eq!(find_latest_csv(dir.path()).unwrap(), Some(newest));
    }

    #[test]
    fn non_conforming_names_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "fresh_domains_latest.csv", "domain\n");
        touch(dir.path(), "fresh_domains_2026-13-45_9999.csv", "domain\n");
        touch(dir.path(), "fresh_domains_2026-01-01_0000.txt", "a.com\n");
        touch(dir.path(), "fresh_ecom.csv", "domain,score\n");

        assert_eq!(find_latest_csv(dir.path()).unwrap(), None);
    }

    #[test]
    fn reads_domain_column_and_skips_empty_rows() {
        let dir = TempDir::new().unwrap();
        let path = touch(
            dir.path(),
            "input.csv",
            "score,domain\n10,PayBot.com\n5,\n7, cloud.io \n",
        );
        assert_eq!(read_domains(&path).unwrap(), vec!["paybot.com", "cloud.io"]);
    }

    #[test]
    fn falls_back_to_first_non_empty_value_without_domain_header() {
        let dir = TempDir::new().unwrap();
        let path = touch(dir.path(), "input.csv", "name,extra\nshop.com,x\n,data.net\n,\n");
        assert_eq!(read_domains(&path).unwrap(), vec!["shop.com", "data.net"]);
    }

    #[test]
    fn premium_is_a_filtered_view() {
        let cfg = ScoringConfig::default();
        let items = score_all(&["short.com".to_string(), "free-pay-app123.net".to_string()], &cfg);
        let premium = premium_items(&items, 60);

        assert_eq!(items.len(), 2);
        assert_eq!(premium.len(), 1);
        assert_eq!(premium[0].domain, "short.com");
        assert!(items.contains(&premium[0]));
    }

    #[test]
    fn feed_counts_its_items() {
        let feed = Feed::new(vec![ScoredDomain {
            domain: "short.com".to_string(),
            niche: Niche::Other,
            score: 60,
        }]);
        assert_eq!(feed.count, 1);
        assert!(feed.updated.ends_with('Z'));
    }

    #[test]
    fn title_schema_writes_empty_title_column() {
        let dir = TempDir::new().unwrap();
        let items = vec![ScoredDomain {
            domain: "myshop.com".to_string(),
            niche: Niche::Ecom,
            score: 75,
        }];

        let written =
            write_niche_csvs(dir.path(), "fresh", &items, CsvSchema::DomainTitleScore).unwrap();
        assert_eq!(written, vec![dir.path().join("fresh_ecom.csv")]);

        let content = fs::read_to_string(&written[0]).unwrap();
        assert_eq!(content, "domain,title,score\nmyshop.com,,75\n");
    }

    #[test]
    fn scorer_without_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let report = run_scorer(dir.path(), &ScoringConfig::default()).unwrap();

        assert!(report.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
