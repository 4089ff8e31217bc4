//! Geographic context detection
//!
//! Mines the text and its place-like entities for clues (country and major
//! city keys) used to disambiguate geocoding queries. Output is deterministic:
//! the same text and entities always yield the same ordered keys.

use crate::types::Entity;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of context keys returned by [`GeoContextDetector::detect`]
pub const MAX_CONTEXT_KEYS: usize = 3;

/// Gazetteer: context key and its lowercase aliases, in discovery order.
/// Aliases are matched as substrings, so some carry padding (`"us "`, `"la "`).
const GAZETTEER: &[(&str, &[&str])] = &[
    ("uk", &["uk", "united kingdom", "britain", "great britain"]),
    ("usa", &["usa", "united states", "america", "us "]),
    ("canada", &["canada"]),
    ("australia", &["australia"]),
    ("france", &["france"]),
    ("germany", &["germany"]),
    ("italy", &["italy"]),
    ("spain", &["spain"]),
    ("japan", &["japan"]),
    ("china", &["china"]),
    ("india", &["india"]),
    ("london", &["london"]),
    ("new york", &["new york", "nyc", "manhattan"]),
    ("paris", &["paris"]),
    ("tokyo", &["tokyo"]),
    ("sydney", &["sydney"]),
    ("toronto", &["toronto"]),
    ("berlin", &["berlin"]),
    ("rome", &["rome"]),
    ("madrid", &["madrid"]),
    ("beijing", &["beijing"]),
    ("mumbai", &["mumbai"]),
    ("los angeles", &["los angeles", "la ", " la,"]),
    ("chicago", &["chicago"]),
    ("boston", &["boston"]),
    ("edinburgh", &["edinburgh"]),
    ("glasgow", &["glasgow"]),
    ("manchester", &["manchester"]),
    ("birmingham", &["birmingham"]),
    ("liverpool", &["liverpool"]),
    ("bristol", &["bristol"]),
    ("leeds", &["leeds"]),
    ("cardiff", &["cardiff"]),
    ("belfast", &["belfast"]),
    ("dublin", &["dublin"]),
];

/// Keys that sort ahead of everything else, most specific first
const PRIORITY: &[&str] = &[
    "london", "new york", "paris", "tokyo", "sydney", "uk", "usa", "canada", "australia",
    "france", "germany",
];

/// Postal code patterns and the country key they imply (matched on the raw text)
static POSTAL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("uk", r"\b[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}\b"),
        ("uk", r"\b[A-Z]{2}\d{1,2}\s*\d[A-Z]{2}\b"),
        ("usa", r"\b\d{5}(-\d{4})?\b"),
        ("canada", r"\b[A-Z]\d[A-Z]\s*\d[A-Z]\d\b"),
    ]
    .into_iter()
    .map(|(key, pattern)| (key, Regex::new(pattern).expect("postal pattern is valid")))
    .collect()
});

/// Detects geographic context keys for a text
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoContextDetector;

impl GeoContextDetector {
    pub fn new() -> Self {
        Self
    }

    /// Up to [`MAX_CONTEXT_KEYS`] context keys, priority keys first
    pub fn detect(&self, text: &str, entities: &[Entity]) -> Vec<String> {
        let mut found: Vec<&'static str> = Vec::new();
        let mut add = |key: &'static str| {
            if !found.contains(&key) {
                found.push(key);
            }
        };

        let lowered = text.to_lowercase();
        for (key, aliases) in GAZETTEER {
            if aliases.iter().any(|alias| lowered.contains(alias)) {
                add(key);
            }
        }

        for entity in entities.iter().filter(|e| e.entity_type().is_context_source()) {
            let name = entity.text().to_lowercase();
            for (key, aliases) in GAZETTEER {
                if aliases.iter().any(|alias| name == *alias || name.contains(alias)) {
                    add(key);
                }
            }
        }

        for (key, pattern) in POSTAL_PATTERNS.iter() {
            if pattern.is_match(text) {
                add(key);
            }
        }

        prioritize(found)
    }
}

fn prioritize(found: Vec<&'static str>) -> Vec<String> {
    let mut ordered: Vec<&str> = PRIORITY
        .iter()
        .copied()
        .filter(|key| found.contains(key))
        .collect();
    ordered.extend(found.iter().copied().filter(|key| !PRIORITY.contains(key)));
    ordered.truncate(MAX_CONTEXT_KEYS);
    ordered.into_iter().map(str::to_string).collect()
}

/// Suffixes appended to an entity name for a context key
///
/// Keys without a dedicated expansion expand to themselves.
pub fn context_expansions(key: &str) -> Vec<String> {
    let expansions: &[&str] = match key {
        "uk" => &["UK", "United Kingdom", "England", "Britain"],
        "usa" => &["USA", "United States", "US"],
        "canada" => &["Canada"],
        "australia" => &["Australia"],
        "france" => &["France"],
        "germany" => &["Germany"],
        "london" => &["London, UK", "London, England"],
        "new york" => &["New York, USA", "New York, NY"],
        "paris" => &["Paris, France"],
        "tokyo" => &["Tokyo, Japan"],
        "sydney" => &["Sydney, Australia"],
        other => return vec![other.to_string()],
    };
    expansions.iter().map(|s| s.to_string()).collect()
}
