//! Entity validation strategies
//!
//! Validators decide whether a tagged span is trustworthy enough to keep.
//! The pipeline holds a `dyn EntityValidator` so alternative heuristics
//! (script-aware capitalization, dictionary lookups) can be swapped in.

use crate::types::EntityType;

/// Pluggable validation strategy, parameterized by entity type
pub trait EntityValidator: Send + Sync {
    /// Validator name for logging
    fn name(&self) -> &'static str;

    /// Return `false` to drop the span
    fn is_valid(&self, text: &str, entity_type: &EntityType) -> bool;
}

/// Default heuristic validator
///
/// - Rejects spans whose trimmed text is at most one character.
/// - PERSON: every purely alphabetic token must start with an uppercase letter.
///   This rejects lowercase and caseless-script names; that is a known
///   limitation of the heuristic.
/// - Every other type is accepted as tagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizationValidator;

impl EntityValidator for CapitalizationValidator {
    fn name(&self) -> &'static str {
        "capitalization"
    }

    fn is_valid(&self, text: &str, entity_type: &EntityType) -> bool {
        if text.trim().chars().count() <= 1 {
            return false;
        }

        match entity_type {
            EntityType::Person => text
                .split_whitespace()
                .filter(|token| token.chars().all(char::is_alphabetic))
                .all(|token| token.chars().next().is_some_and(char::is_uppercase)),
            _ => true,
        }
    }
}
