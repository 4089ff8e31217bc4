//! Overlap consolidation
//!
//! Longest-span-wins, greedy in start order. Candidates are stably sorted by
//! `start` (discovery order breaks ties). A candidate that overlaps an accepted
//! entity replaces it only when its text is strictly longer in characters;
//! otherwise the candidate is dropped, so equal lengths keep the incumbent.
//!
//! Because accepted entities never overlap and all start at or before the
//! candidate, a candidate can overlap at most one of them.

use crate::types::Entity;
use tracing::debug;

/// Reduce candidates to a non-overlapping set, sorted by start offset
pub fn resolve_overlaps(mut candidates: Vec<Entity>) -> Vec<Entity> {
    candidates.sort_by_key(|e| e.start());

    let mut accepted: Vec<Entity> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match accepted.iter().position(|existing| candidate.overlaps(existing)) {
            None => accepted.push(candidate),
            Some(idx) if candidate.char_len() > accepted[idx].char_len() => {
                let evicted = accepted.remove(idx);
                debug!(
                    evicted = %evicted.text(),
                    winner = %candidate.text(),
                    "Overlap eviction: longer span wins"
                );
                accepted.push(candidate);
            }
            Some(idx) => {
                debug!(
                    dropped = %candidate.text(),
                    kept = %accepted[idx].text(),
                    "Overlap eviction: incumbent kept"
                );
            }
        }
    }

    accepted.sort_by_key(|e| e.start());
    accepted
}
