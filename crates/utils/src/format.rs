//! Display formatting shared by list views.

use chrono::{DateTime, Datelike, Utc};

/// Render an amount with the fixed "$" prefix used across list pages.
///
/// Matches the storefront's display rules: whole amounts drop the
/// fractional part ("$42"), everything else keeps its shortest
/// decimal form ("$42.5").
pub fn currency(amount: f64) -> String {
    format!("${amount}")
}

/// Render a timestamp in the long human-readable form used by the
/// order and product tables: "August 25th, 2026".
pub fn long_date(date: DateTime<Utc>) -> String {
    let day = date.day();
    format!("{} {}{}, {}", date.format("%B"), day, ordinal_suffix(day), date.year())
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
