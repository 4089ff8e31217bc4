//! Tagger label normalization
//!
//! Maps the label vocabularies of common sequence taggers (CoNLL-03 with or
//! without BIO/BIOES prefixes, OntoNotes-style names) onto the canonical
//! entity types. Labels without a mapping pass through unchanged.

use crate::types::EntityType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Tagger classes that never become entities
pub const EXCLUDED_LABELS: [&str; 7] = [
    "DATE", "TIME", "PERCENT", "MONEY", "QUANTITY", "ORDINAL", "CARDINAL",
];

const LABEL_TABLE: &[(&str, &str)] = &[
    // CoNLL-03
    ("PER", "PERSON"),
    ("ORG", "ORGANIZATION"),
    ("LOC", "LOCATION"),
    ("MISC", "MISC"),
    ("B-PER", "PERSON"),
    ("I-PER", "PERSON"),
    ("B-ORG", "ORGANIZATION"),
    ("I-ORG", "ORGANIZATION"),
    ("B-LOC", "LOCATION"),
    ("I-LOC", "LOCATION"),
    ("B-MISC", "MISC"),
    ("I-MISC", "MISC"),
    // OntoNotes and other broad tagsets
    ("PERSON", "PERSON"),
    ("ORGANIZATION", "ORGANIZATION"),
    ("GPE", "LOCATION"),
    ("LOCATION", "LOCATION"),
    ("FACILITY", "LOCATION"),
    ("PRODUCT", "MISC"),
    ("EVENT", "MISC"),
    ("WORK_OF_ART", "MISC"),
    ("LANGUAGE", "MISC"),
];

static LABEL_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| LABEL_TABLE.iter().copied().collect());

/// Strip a BIO/BIOES position prefix (`B-`, `I-`, `E-`, `S-`)
fn strip_position_prefix(label: &str) -> &str {
    match label.split_once('-') {
        Some((prefix, rest)) if matches!(prefix, "B" | "I" | "E" | "S") && !rest.is_empty() => {
            rest
        }
        _ => label,
    }
}

/// Map a raw tagger label to its canonical type name
///
/// Total over strings: `map_label("B-PER") == "PERSON"`,
/// `map_label("GPE") == "LOCATION"`, `map_label("UNKNOWN_XYZ") == "UNKNOWN_XYZ"`.
pub fn map_label(label: &str) -> String {
    if let Some(canonical) = LABEL_MAP.get(label) {
        return (*canonical).to_string();
    }

    let base = strip_position_prefix(label);
    match LABEL_MAP.get(base) {
        Some(canonical) => (*canonical).to_string(),
        None => label.to_string(),
    }
}

/// Map a raw tagger label to an [`EntityType`]
pub fn map_entity_type(label: &str) -> EntityType {
    EntityType::from_canonical(&map_label(label))
}

/// Whether a label (raw or mapped, with or without position prefix) is an excluded class
pub fn is_excluded(label: &str) -> bool {
    let base = strip_position_prefix(label);
    EXCLUDED_LABELS.contains(&label) || EXCLUDED_LABELS.contains(&base)
}
