//! Plain-text normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static UNDERSCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());
static REMOVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\d\s-]+").unwrap());

/// Convert text to plain form.
///
/// - lowercases letters
/// - replaces runs of whitespace and hyphens with `_`
/// - removes every other character that is not a word character or digit
pub fn plain(text: &str) -> String {
    let lower = text.to_lowercase();
    let underscored = UNDERSCORE_RE.replace_all(&lower, "_");
    REMOVE_RE.replace_all(&underscored, "").into_owned()
}
