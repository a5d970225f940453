//! Page objects for the discover application.
//!
//! The selectors here describe an external DOM we do not control. Two of
//! them are plain heuristics: a card is taken to be the parent element of a
//! poster `img`, and a card's genre is its second `span`/`p`. Expect them to
//! break first when the markup changes.

pub mod discover;
pub mod filter;
pub mod movie_card;

pub use discover::DiscoverPage;
pub use filter::FilterComponent;
pub use movie_card::MovieCard;

use chrono::Datelike;

use crate::types::YearRange;

/// Lowest year reported when a year input is empty or unparsable
pub const MIN_YEAR: i32 = 1900;

/// Pause after a filter change so the grid can re-render
pub(crate) const FILTER_SETTLE_MS: u64 = 500;

/// Pause after scrolling to the pagination controls
pub(crate) const SCROLL_SETTLE_MS: u64 = 500;

/// Longest time to wait for the first poster after a load
pub(crate) const FIRST_IMAGE_TIMEOUT_MS: u64 = 15_000;

/// Whether a `class` attribute contains any of the given markers
pub fn class_indicates(class: Option<&str>, markers: &[&str]) -> bool {
    class.is_some_and(|c| markers.iter().any(|m| c.contains(m)))
}

/// A paging control counts as enabled when it is visible and not marked
/// `aria-disabled="true"`
pub fn enabled_from(visible: bool, aria_disabled: Option<&str>) -> bool {
    visible && aria_disabled != Some("true")
}

/// Zero-based index of the rating control for `stars`, if in 1..=5
pub fn rating_index(stars: u32) -> Option<usize> {
    (1..=5).contains(&stars).then(|| stars as usize - 1)
}

/// Trimmed texts of plausible titles: non-empty and shorter than 100 chars
pub fn filter_titles(texts: Vec<String>) -> Vec<String> {
    texts
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| {
            let len = t.chars().count();
            len > 0 && len < 100
        })
        .collect()
}

/// Leading integer of an input value, like `parseInt`; zero counts as absent
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    let digits_end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..digits_end].parse::<i32>().ok().filter(|&y| y != 0)
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Year range from the two raw input values, with defaults for gaps
pub fn year_range_from(min: Option<&str>, max: Option<&str>) -> YearRange {
    YearRange {
        min: min.and_then(parse_year).unwrap_or(MIN_YEAR),
        max: max.and_then(parse_year).unwrap_or_else(current_year),
    }
}

#[cfg(test)]
#[path = "../pages_test.rs"]
mod pages_test;
