pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return lowered;
    }

    // Drop scheme and anything after the host
    let without_scheme = match lowered.rfind("//") {
        Some(idx) => &lowered[idx + 2..],
        None => lowered.as_str(),
    };
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);

    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Splits a normalized name into its first DNS component and the rest.
pub fn split_label(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((label, remainder)) => (label, remainder),
        None => (name, ""),
    }
}

pub fn has_suffix_in<S: AsRef<str>>(name: &str, suffixes: &[S]) -> bool {
    suffixes.iter().any(|s| name.ends_with(s.as_ref()))
}

/// Returns the first keyword that occurs anywhere in `name`.
pub fn contains_any<'a, S: AsRef<str>>(name: &str, keywords: &'a [S]) -> Option<&'a str> {
    keywords
        .iter()
        .map(|k| k.as_ref())
        .find(|k| !k.is_empty() && name.contains(k))
}

pub fn looks_like_plain_domain(line: &str) -> bool {
    !line.is_empty() && line.contains('.') && !line.chars().any(char::is_whitespace)
}
