// SPDX-License-Identifier: Apache-2.0

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:[.,]\d+)?)\s*([A-Za-zÄÖÜäöü.]*)$").expect("valid pattern")
    })
}

/// Normalises a raw `estimatedTime` value to whole minutes.
///
/// The corpus carries numbers as well as strings like `"1,5 Stunden"`
/// or `"45 min"`. Hours multiply by 60, a comma is accepted as decimal
/// separator, unknown units are read as minutes, and anything
/// unparseable becomes 0.
#[must_use]
pub fn parse_estimated_minutes(raw: &Value) -> u32 {
    match raw {
        Value::Number(n) => {
            let minutes = n.as_f64().unwrap_or(0.0);
            clamp_minutes(minutes)
        }
        Value::String(text) => parse_estimated_minutes_str(text),
        _ => 0,
    }
}

fn parse_estimated_minutes_str(text: &str) -> u32 {
    let trimmed = text.trim();
    let Some(captures) = pattern().captures(trimmed) else {
        tracing::warn!(raw = trimmed, "unparseable estimatedTime, defaulting to 0");
        return 0;
    };
    let number: f64 = captures[1].replace(',', ".").parse().unwrap_or(0.0);
    let unit = captures[2].trim_end_matches('.').to_lowercase();
    let minutes = if unit == "h" || unit.starts_with("st") {
        number * 60.0
    } else {
        number
    };
    clamp_minutes(minutes)
}

fn clamp_minutes(minutes: f64) -> u32 {
    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }
    let rounded = minutes.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}
