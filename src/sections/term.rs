//! Chronological ordering of term codes.
//!
//! Term codes are a four-digit year followed by a season: `WI`, `SP`, `SU`
//! or `FA`, in that order within a year. Codes that do not follow this
//! shape sort after every recognized code, by plain string order.

use std::cmp::Ordering;

const SEASONS: [&str; 4] = ["WI", "SP", "SU", "FA"];

/// Sort key for a term code: `Some((year, season rank))` when recognized.
pub fn term_key(code: &str) -> Option<(u32, usize)> {
    let code = code.trim();
    let year = code.get(..4)?;
    let season = code.get(4..)?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let season = season.to_ascii_uppercase();
    let rank = SEASONS.iter().position(|s| *s == season)?;
    Some((year.parse().ok()?, rank))
}

/// Oldest term first. Unrecognized codes go last, compared as strings.
pub fn compare_terms(a: &str, b: &str) -> Ordering {
    match (term_key(a), term_key(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
