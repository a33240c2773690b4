use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scoring::Niche;

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub name: String,
    pub found: usize,
    /// Set when the fetch failed or returned a non-success status.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct CollectionReport {
    pub sources: Vec<SourceReport>,
    pub collected: usize,
    pub filtered: usize,
    pub used_fallback: bool,
    pub domains: Vec<String>,
    pub txt_path: PathBuf,
    pub csv_path: PathBuf,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NicheCount {
    pub all: usize,
    pub premium: usize,
}

#[derive(Debug)]
pub struct FeedReport {
    pub source_csv: PathBuf,
    pub total: usize,
    pub premium: usize,
    pub premium_threshold: u8,
    pub niche_counts: BTreeMap<Niche, NicheCount>,
    pub files: Vec<PathBuf>,
}
