use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

use crate::scoring::Niche;
use crate::sources::Source;

pub const DEFAULT_CONFIG_FILE: &str = "domainfeed.json";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/117.0 Safari/537.36";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    pub sources: Vec<Source>,
    pub allowed_tlds: Vec<String>,
    pub keywords: Vec<String>,
    pub fallback: Vec<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub delay_ms: u64,
}

impl CollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                Source::new("crtsh", "https://crt.sh/?q=%25&output=json"),
                Source::new(
                    "crtsh_proxy",
                    "https://r.jina.ai/http://crt.sh/?q=%25&output=json",
                ),
                Source::new(
                    "github_list_1",
                    "https://raw.githubusercontent.com/rfc1036/whois/master/domains.txt",
                ),
                Source::new(
                    "github_list_2",
                    "https://raw.githubusercontent.com/tenable/nessus-rules/master/domains.txt",
                ),
            ],
            allowed_tlds: strings(&[".com", ".io", ".co", ".net"]),
            keywords: strings(&[
                "ai", "tech", "app", "cloud", "data", "bot", "shop", "store", "pay", "digital",
            ]),
            fallback: strings(&[
                "example-ai-startup.com",
                "fastcloud-app.com",
                "myshopdigital.com",
                "paybotcloud.com",
                "data-analytics-app.com",
            ]),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout_secs: 15,
            delay_ms: 1000,
        }
    }
}

/// Points awarded when the name ends with any of `suffixes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TldWeight {
    pub suffixes: Vec<String>,
    pub points: i32,
}

/// Points awarded when the label has at most `max_len` characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LengthTier {
    pub max_len: usize,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NicheRule {
    pub niche: Niche,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CsvSchema {
    /// `domain,score`
    #[default]
    DomainScore,
    /// `domain,title,score` with an empty title column.
    DomainTitleScore,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Checked in order; the first matching entry wins.
    pub tld_weights: Vec<TldWeight>,
    pub money_keywords: Vec<String>,
    pub keyword_bonus: i32,
    /// Checked in order; labels longer than every tier get `long_label_points`.
    pub length_tiers: Vec<LengthTier>,
    pub long_label_points: i32,
    pub hyphen_penalty: i32,
    pub digit_penalty: i32,
    pub prohibited: Vec<String>,
    pub prohibited_penalty: i32,
    pub premium_threshold: u8,
    /// Checked in order; the first group with a matching keyword wins.
    pub niches: Vec<NicheRule>,
    pub csv_schema: CsvSchema,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tld_weights: vec![
                TldWeight {
                    suffixes: strings(&[".com"]),
                    points: 40,
                },
                TldWeight {
                    suffixes: strings(&[".io", ".ai", ".app"]),
                    points: 30,
                },
                TldWeight {
                    suffixes: strings(&[".co", ".net"]),
                    points: 15,
                },
            ],
            money_keywords: strings(&[
                "ai", "pay", "paym", "wallet", "wallets", "shop", "store", "app", "cloud", "data",
                "crm", "saas", "serve", "tech", "digital", "booking", "order", "checkout",
                "crypto", "token", "market",
            ]),
            keyword_bonus: 15,
            length_tiers: vec![
                LengthTier {
                    max_len: 6,
                    points: 20,
                },
                LengthTier {
                    max_len: 10,
                    points: 10,
                },
                LengthTier {
                    max_len: 15,
                    points: 5,
                },
            ],
            long_label_points: -5,
            hyphen_penalty: 15,
            digit_penalty: 12,
            prohibited: strings(&[
                "free", "cheap", "discount", "sale", "best", "202", "2026", "download", "torrent",
                "crack", "hack", "login", "signup", "reset", "test", "sample",
            ]),
            prohibited_penalty: 30,
            premium_threshold: 80,
            niches: vec![
                NicheRule {
                    niche: Niche::Clinics,
                    keywords: strings(&[
                        "clinic",
                        "medical",
                        "dentist",
                        "odontologia",
                        "clínica",
                        "consultorio",
                        "consultório",
                    ]),
                },
                NicheRule {
                    niche: Niche::Ecom,
                    keywords: strings(&[
                        "shop",
                        "store",
                        "cart",
                        "checkout",
                        "loja",
                        "ecommerce",
                        "e-commerce",
                        "produto",
                        "product",
                    ]),
                },
                NicheRule {
                    niche: Niche::Services,
                    keywords: strings(&[
                        "agency",
                        "marketing",
                        "design",
                        "consulting",
                        "developer",
                        "dev",
                        "agência",
                        "serviços",
                        "service",
                    ]),
                },
            ],
            csv_schema: CsvSchema::DomainScore,
        }
    }
}

impl Config {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(content).context("Failed to parse configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for source in &self.collector.sources {
            Url::parse(&source.url)
                .with_context(|| format!("Invalid URL for source '{}': {}", source.name, source.url))?;
        }
        if self.collector.fallback.is_empty() {
            anyhow::bail!("collector.fallback must list at least one domain");
        }
        if let Some(idx) = self.collector.fallback.iter().position(|d| d.trim().is_empty()) {
            anyhow::bail!("collector.fallback entry {} is blank", idx);
        }
        if self.collector.timeout_secs == 0 {
            anyhow::bail!("collector.timeout_secs must be greater than 0");
        }
        if self.scoring.premium_threshold > 100 {
            anyhow::bail!(
                "premium_threshold must be between 0 and 100, got {}",
                self.scoring.premium_threshold
            );
        }
        Ok(())
    }
}

/// Resolves configuration from an explicit file, then `domainfeed.json` in
/// `dir`, then built-in defaults.
pub fn load_config(config_path: Option<&Path>, dir: &Path) -> Result<Config> {
    let start_time = Instant::now();
    info!(action = "start", component = "config_loading", "Starting configuration loading");

    let config = if let Some(path) = config_path {
        info!(action = "load", component = "config_file", file_path = ?path, "Loading configuration from specified file");
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {:?}", path);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        Config::from_json(&content).with_context(|| format!("Invalid configuration in {:?}", path))?
    } else {
        let default_file = dir.join(DEFAULT_CONFIG_FILE);
        if default_file.exists() {
            info!(action = "load", component = "default_config_file", file_path = ?default_file, "Loading configuration from default file");
            let content = fs::read_to_string(&default_file)
                .with_context(|| format!("Failed to read configuration file {:?}", default_file))?;
            Config::from_json(&content)
                .with_context(|| format!("Invalid configuration in {:?}", default_file))?
        } else {
            info!(action = "load", component = "builtin_config", "Using built-in default configuration");
            Config::default()
        }
    };

    info!(
        action = "complete",
        component = "config_loading",
        source_count = config.collector.sources.len(),
        niche_count = config.scoring.niches.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Configuration loaded"
    );
    Ok(config)
}

pub fn init_default_config(dir: &Path) -> Result<()> {
    let default_file = dir.join(DEFAULT_CONFIG_FILE);

    if default_file.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = serde_json::to_string_pretty(&Config::default())
        .context("Failed to serialize default configuration")?;
    fs::write(&default_file, content + "\n")
        .with_context(|| format!("Failed to write {:?}", default_file))?;
    println!("Created {} with default configuration", default_file.display());

    Ok(())
}
