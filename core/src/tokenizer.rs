use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Maximal runs of alphabetic or numeric code points.
    static ref RE: Regex = Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("valid regex");
}

/// Lazily split text into lowercase terms, left to right. Punctuation and
/// whitespace are dropped; calling again restarts from the beginning.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Title terms followed by body terms.
pub fn tokenize_document<'a>(title: &'a str, body: &'a str) -> impl Iterator<Item = String> + 'a {
    tokenize(title).chain(tokenize(body))
}
