//! Placeholder extraction

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Non-greedy `{...}`: a capture ends at the first `}` after its `{`.
    static ref TAG_PATTERN: Regex = Regex::new(r"\{(.*?)\}").unwrap();
}

/// Extract placeholder names from a template in order of appearance.
///
/// Duplicates are kept. An unmatched `{` contributes nothing, and a
/// capture never spans a line break.
pub fn extract_tags(template: &str) -> Vec<String> {
    TAG_PATTERN
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
