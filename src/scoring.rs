use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::config::ScoringConfig;
use crate::domain::{contains_any, normalize_domain, split_label};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Niche {
    Clinics,
    Ecom,
    Services,
    Other,
}

impl Niche {
    pub fn as_str(&self) -> &'static str {
        match self {
            Niche::Clinics => "clinics",
            Niche::Ecom => "ecom",
            Niche::Services => "services",
            Niche::Other => "other",
        }
    }
}

impl fmt::Display for Niche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn digit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d").expect("digit pattern is valid"))
}

/// Resale score in `0..=100`. Pure function of `domain` and `cfg`.
pub fn score_domain(domain: &str, cfg: &ScoringConfig) -> u8 {
    let name = normalize_domain(domain);
    let (label, _) = split_label(&name);

    // Weights come from user configuration; saturate instead of overflowing.
    let mut score: i32 = 0;

    if let Some(weight) = cfg
        .tld_weights
        .iter()
        .find(|w| w.suffixes.iter().any(|s| name.ends_with(s.as_str())))
    {
        score = score.saturating_add(weight.points);
    }

    if contains_any(&name, &cfg.money_keywords).is_some() {
        score = score.saturating_add(cfg.keyword_bonus);
    }

    let label_len = label.chars().count();
    score = score.saturating_add(
        cfg.length_tiers
            .iter()
            .find(|tier| label_len <= tier.max_len)
            .map_or(cfg.long_label_points, |tier| tier.points),
    );

    if label.contains('-') {
        score = score.saturating_sub(cfg.hyphen_penalty);
    }
    if digit_pattern().is_match(label) {
        score = score.saturating_sub(cfg.digit_penalty);
    }
    if contains_any(&name, &cfg.prohibited).is_some() {
        score = score.saturating_sub(cfg.prohibited_penalty);
    }

    score.clamp(0, 100) as u8
}

pub fn detect_niche(domain: &str, cfg: &ScoringConfig) -> Niche {
    let text = domain.to_lowercase();
    cfg.niches
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|kw| !kw.is_empty() && text.contains(&kw.to_lowercase()))
        })
        .map_or(Niche::Other, |rule| rule.niche)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn short_com_scores_tld_and_length_only() {
        assert_eq!(score_domain("short.com", &cfg()), 60);
    }

    #[test]
    fn stacked_penalties_clamp_to_zero() {
        assert_eq!(score_domain("free-pay-app123.net", &cfg()), 0);
    }

    #[test]
    fn keyword_bonus_is_awarded_once() {
        // .io +30, "pay"/"app"/"cloud" +15 once, label "payappcloud" (11) +5
        assert_eq!(score_domain("payappcloud.io", &cfg()), 50);
    }

    #[test]
    fn prohibited_penalty_is_applied_once() {
        // .com +40, label "freecheap" (9) +10, "free"/"cheap" -30 once
        assert_eq!(score_domain("freecheap.com", &cfg()), 20);
    }

    #[test]
    fn score_is_clamped_to_hundred() {
        let mut generous = cfg();
        generous.tld_weights[0].points = 200;
        assert_eq!(score_domain("short.com", &generous), 100);
    }

    #[test]
    fn score_ignores_scheme_path_and_www() {
        let c = cfg();
        assert_eq!(
            score_domain("https://www.short.com/landing", &c),
            score_domain("short.com", &c)
        );
    }

    #[test]
    fn co_and_net_share_a_tier_and_com_is_not_co() {
        let c = cfg();
        // label "zzqq" (4) +20
        assert_eq!(score_domain("zzqq.co", &c), 35);
        assert_eq!(score_domain("zzqq.net", &c), 35);
        assert_eq!(score_domain("zzqq.com", &c), 60);
        assert_eq!(score_domain("zzqq.org", &c), 20);
    }

    #[test]
    fn extreme_weights_saturate_instead_of_overflowing() {
        let mut extreme = cfg();
        extreme.hyphen_penalty = i32::MIN;
        extreme.tld_weights[0].points = i32::MAX;
        // saturates at i32::MAX, then clamps
        assert_eq!(score_domain("my-site.com", &extreme), 100);

        let mut harsh = cfg();
        harsh.prohibited_penalty = i32::MAX;
        harsh.digit_penalty = i32::MAX;
        assert_eq!(score_domain("free123.com", &harsh), 0);
    }

    #[test]
    fn non_ascii_decimal_digits_count_as_digits() {
        let c = cfg();
        // Arabic-Indic digit in the label: same penalty as an ASCII digit
        assert_eq!(score_domain("zzq\u{0663}.com", &c), score_domain("zzq3.com", &c));
        assert_eq!(score_domain("zzq3.com", &c), 48);
    }

    #[test]
    fn long_labels_are_penalized() {
        // label of 16 chars: -5, .org 0, clamps to 0
        assert_eq!(score_domain("qwertyuiopzxcvbn.org", &cfg()), 0);
        // .com +40 -5
        assert_eq!(score_domain("qwertyuiopzxcvbn.com", &cfg()), 35);
    }

    #[test]
    fn scores_are_in_range_and_deterministic() {
        let c = cfg();
        for domain in [
            "",
            "a",
            "ai.ai",
            "x-1.com",
            "shopcloudpaytech.app",
            "loja-do-zé.com.br",
            "https://login.example.net/reset",
        ] {
            let first = score_domain(domain, &c);
            assert!(first <= 100);
            assert_eq!(first, score_domain(domain, &c));
        }
    }

    #[test]
    fn detects_niches_in_declared_order() {
        let c = cfg();
        assert_eq!(detect_niche("bestclinic.com", &c), Niche::Clinics);
        assert_eq!(detect_niche("randomwidgets.io", &c), Niche::Other);
        assert_eq!(detect_niche("MyShop.com", &c), Niche::Ecom);
        assert_eq!(detect_niche("devagency.net", &c), Niche::Services);
        // both clinics and ecom keywords: clinics is declared first
        assert_eq!(detect_niche("clinicstore.com", &c), Niche::Clinics);
        assert_eq!(detect_niche("clínicavida.com", &c), Niche::Clinics);
    }

    #[test]
    fn niche_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Niche::Ecom).unwrap(), "\"ecom\"");
        assert_eq!(Niche::Services.to_string(), "services");
    }
}
