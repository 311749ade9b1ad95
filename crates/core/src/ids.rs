//! Identifier generation for stories, scenes and choices.
//!
//! Identifiers are opaque strings of the form `<prefix>-<32 lowercase hex>`, for example
//! `node-550e8400e29b41d4a716446655440000`. The hex part is a v4 UUID in simple form, the same
//! value `Uuid::new_v4().simple().to_string()` produces.
//!
//! The model never validates ids it receives: imported stories may carry any string as an id.
//! These helpers only guarantee that ids *minted here* are fresh.

use crate::constants::{CHOICE_ID_PREFIX, NODE_ID_PREFIX, STORY_ID_PREFIX};
use uuid::Uuid;

/// Generates a fresh scene id.
pub fn new_node_id() -> String {
    prefixed(NODE_ID_PREFIX)
}

/// Generates a fresh choice id.
///
/// Choice ids only need to be unique within their owning node, but a random id makes that
/// trivially true.
pub fn new_choice_id() -> String {
    prefixed(CHOICE_ID_PREFIX)
}

/// Generates a fresh story id.
pub fn new_story_id() -> String {
    prefixed(STORY_ID_PREFIX)
}

/// Returns true if `input` has the shape produced by this module for `prefix`.
///
/// This is a purely syntactic check: `<prefix>-` followed by exactly 32 lowercase hex
/// characters.
pub fn is_generated(prefix: &str, input: &str) -> bool {
    input
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| {
            hex.len() == 32
                && hex
                    .bytes()
                    .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
}

fn prefixed(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_have_expected_shape() {
        assert!(is_generated(NODE_ID_PREFIX, &new_node_id()));
        assert!(is_generated(CHOICE_ID_PREFIX, &new_choice_id()));
        assert!(is_generated(STORY_ID_PREFIX, &new_story_id()));
    }

    #[test]
    fn is_generated_rejects_foreign_ids() {
        assert!(!is_generated(NODE_ID_PREFIX, "node-1700000000000"));
        assert!(!is_generated(NODE_ID_PREFIX, "choice-550e8400e29b41d4a716446655440000"));
        assert!(!is_generated(NODE_ID_PREFIX, "node550e8400e29b41d4a716446655440000"));
        assert!(!is_generated(NODE_ID_PREFIX, "node-550E8400E29B41D4A716446655440000"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..500).map(|_| new_node_id()).collect();
        assert_eq!(ids.len(), 500);
    }
}
