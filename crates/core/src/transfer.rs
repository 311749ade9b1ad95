//! JSON import and export of whole stories.
//!
//! The file format is the serde representation of [`Story`], pretty printed. There is no format
//! version field; imports accept anything that deserializes.

use crate::constants::EXPORT_EXTENSION;
use crate::error::{StoryError, StoryResult};
use crate::story::Story;
use std::fs;
use std::path::Path;

/// Serializes a story as indented JSON.
///
/// # Errors
///
/// Returns [`StoryError::InvalidInput`] if a scene position is NaN or infinite (serde_json would
/// write those as `null`, which does not import), and [`StoryError::Serialization`] if serde
/// fails.
pub fn export_json(story: &Story) -> StoryResult<String> {
    ensure_finite_positions(story)?;
    serde_json::to_string_pretty(story).map_err(StoryError::Serialization)
}

/// Checks that every scene position can be written as JSON numbers.
///
/// # Errors
///
/// Returns [`StoryError::InvalidInput`] naming the first scene with a non-finite coordinate.
pub fn ensure_finite_positions(story: &Story) -> StoryResult<()> {
    match story.nodes.iter().find(|n| !n.position.is_finite()) {
        Some(node) => Err(StoryError::InvalidInput(format!(
            "scene {} has a non-finite position ({}, {})",
            node.id, node.position.x, node.position.y
        ))),
        None => Ok(()),
    }
}

/// Derives a download file name from a story title.
///
/// Each run of whitespace becomes a single underscore, e.g. `"My  First Story"` becomes
/// `"My_First_Story.json"`.
pub fn export_file_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + EXPORT_EXTENSION.len() + 1);
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(ch);
            in_space = false;
        }
    }
    name.push('.');
    name.push_str(EXPORT_EXTENSION);
    name
}

/// Parses a story previously produced by [`export_json`].
///
/// # Errors
///
/// Returns [`StoryError::MalformedImport`] if the text is not a valid story document.
pub fn import_json(text: &str) -> StoryResult<Story> {
    let story: Story = serde_json::from_str(text).map_err(StoryError::MalformedImport)?;
    tracing::debug!(story_id = %story.id, nodes = story.nodes.len(), "imported story");
    Ok(story)
}

/// Reads and parses a story file.
///
/// # Errors
///
/// Returns [`StoryError::FileRead`] on I/O failure and [`StoryError::MalformedImport`] on bad
/// content.
pub fn read_story_file(path: &Path) -> StoryResult<Story> {
    let text = fs::read_to_string(path).map_err(StoryError::FileRead)?;
    import_json(&text)
}

/// Writes `story` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`StoryError::FileWrite`] on I/O failure.
pub fn write_story_file(path: &Path, story: &Story) -> StoryResult<()> {
    let text = export_json(story)?;
    fs::write(path, text).map_err(StoryError::FileWrite)
}
