//! Title normalization for fuzzy comparison and fallback queries.

use std::sync::OnceLock;

use regex::Regex;

fn non_word_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").unwrap())
}

fn noise_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*[(\[].*?[)\]]\s*").unwrap())
}

fn trailing_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+-\s+.*$").unwrap())
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapses a title to a lowercase token string for fuzzy equality.
/// Never used for display or queries.
pub fn normalize_for_comparison(s: &str) -> String {
    non_word_runs()
        .replace_all(&s.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Fallback cleaner: drops the first `(...)`/`[...]` span (region tags and the
/// like) and anything after a standalone " - " separator, then collapses
/// whitespace. Only used to build a second search query when the result
/// differs from the original title.
pub fn strip_noise(title: &str) -> String {
    let without_span = noise_span().replace(title, " ");
    let without_suffix = trailing_suffix().replace(&without_span, "");
    whitespace_runs()
        .replace_all(&without_suffix, " ")
        .trim()
        .to_string()
}
