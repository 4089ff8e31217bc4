//! Street address extraction
//!
//! Taggers rarely label house-number addresses as a single span, so two
//! regexes run over the raw text independently of the tagger:
//! ranged house numbers (`123-125 Elm Street`) and single house numbers
//! (`123 Elm Street`). Both require a street-suffix keyword. Matches may
//! overlap each other or tagger spans; the overlap resolver reconciles them.

use crate::types::{Entity, EntityType};
use once_cell::sync::Lazy;
use regex::Regex;

const STREET_SUFFIXES: &str = "Road|Street|Avenue|Lane|Drive|Way|Place|Square|Gardens";

static RANGED_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,4}}[-–]\d{{1,4}}\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:{})\b",
        STREET_SUFFIXES
    ))
    .expect("ranged address pattern is valid")
});

static SINGLE_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d{{1,4}}\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:{})\b",
        STREET_SUFFIXES
    ))
    .expect("single address pattern is valid")
});

/// Label recorded as `original_label` on address entities
pub const ADDRESS_LABEL: &str = "ADDRESS";

/// Find every address match in `text`, ranged pattern first
pub fn extract_addresses(text: &str) -> Vec<Entity> {
    [&*RANGED_ADDRESS, &*SINGLE_ADDRESS]
        .into_iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| {
            Entity::new(
                m.as_str(),
                EntityType::Address,
                m.start(),
                m.end(),
                ADDRESS_LABEL,
            )
        })
        .collect()
}
