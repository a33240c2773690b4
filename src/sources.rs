use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::domain::looks_like_plain_domain;

/// Marker field identifying certificate-transparency search results.
const CT_MARKER: &str = "name_value";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    CertTransparency,
    PlainList,
}

#[derive(Debug, Deserialize)]
struct CtRecord {
    #[serde(default)]
    name_value: Option<String>,
    #[serde(default)]
    common_name: Option<String>,
}

pub fn classify_body(body: &str) -> BodyKind {
    let trimmed = body.trim();
    if trimmed.starts_with('[') && trimmed.contains(CT_MARKER) {
        BodyKind::CertTransparency
    } else {
        BodyKind::PlainList
    }
}

/// Extracts names from a crt.sh style JSON array. Malformed input yields an
/// empty set.
pub fn parse_ct_json(body: &str) -> BTreeSet<String> {
    let records: Vec<CtRecord> = match serde_json::from_str(body.trim()) {
        Ok(records) => records,
        Err(e) => {
            debug!(action = "parse", component = "ct_json", error = %e, "Discarding malformed certificate transparency response");
            return BTreeSet::new();
        }
    };

    let mut domains = BTreeSet::new();
    for record in records {
        let names = record
            .name_value
            .filter(|v| !v.is_empty())
            .or(record.common_name)
            .unwrap_or_default();

        for line in names.lines() {
            let domain = line.trim().to_lowercase();
            if !domain.is_empty() && !domain.starts_with("*.") {
                domains.insert(domain);
            }
        }
    }
    domains
}

pub fn parse_plain_list(body: &str) -> BTreeSet<String> {
    body.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| looks_like_plain_domain(line))
        .collect()
}

pub fn parse_body(body: &str) -> BTreeSet<String> {
    match classify_body(body) {
        BodyKind::CertTransparency => parse_ct_json(body),
        BodyKind::PlainList => parse_plain_list(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CT_BODY: &str = r#"[
        {"issuer_ca_id": 1, "common_name": "paybot.com", "name_value": "paybot.com\nwww.paybot.com\n*.paybot.com"},
        {"common_name": "CloudApp.io", "name_value": ""},
        {"common_name": "ignored.net", "name_value": "Data.Net"}
    ]"#;

    #[test]
    fn classifies_ct_json_by_marker() {
        assert_eq!(classify_body(CT_BODY), BodyKind::CertTransparency);
        assert_eq!(classify_body("[1, 2, 3]"), BodyKind::PlainList);
        assert_eq!(classify_body("a.com\nb.com"), BodyKind::PlainList);
    }

    #[test]
    fn ct_json_splits_lines_and_drops_wildcards() {
        let domains = parse_ct_json(CT_BODY);
        let expected: BTreeSet<String> = ["cloudapp.io", "data.net", "paybot.com", "www.paybot.com"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(domains, expected);
    }

    #[test]
    fn malformed_ct_json_is_empty() {
        assert!(parse_ct_json(r#"[{"name_value": "broken"#).is_empty());
        assert!(parse_body(r#"[{"name_value": "broken"#).is_empty());
    }

    #[test]
    fn plain_list_keeps_dotted_tokens_without_spaces() {
        let body = "Shop.COM\n\n  tech.io  \nnot a domain\nlocalhost\n# comment.with space\n";
        let domains = parse_plain_list(body);
        let expected: BTreeSet<String> =
            ["shop.com", "tech.io"].iter().map(|s| s.to_string()).collect();
        assert_eq!(domains, expected);
    }
}
