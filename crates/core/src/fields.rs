//! Template field engine — extraction and substitution of fillable slots.
//!
//! A template marks each fillable slot with a block delimited by a marker of
//! thirteen `#` characters:
//!
//! ```text
//! #############
//! title: Topic
//! description: subject of the memo,
//! may span several lines
//! #############
//! ```
//!
//! # Grammar
//!
//! ```text
//! block       := MARKER ws* "title:" ws* title ws* "description:" ws* description MARKER
//! title       := non-empty run of non-newline chars containing no MARKER; if
//!                that run itself contains "description:", the title may end
//!                before any such occurrence (rightmost valid one wins)
//! description := non-empty run of chars that contains no '#'
//! ```
//!
//! Labels are case-sensitive and captured values are whitespace-trimmed.
//! Blocks are matched left to right and never span a marker pair. Anything
//! that does not fit the grammar is ordinary template text: malformed or
//! unterminated blocks are skipped, not reported.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The block delimiter.
pub const MARKER: &str = "#############";

const TITLE_LABEL: &str = "title:";
const DESCRIPTION_LABEL: &str = "description:";

/// One fillable slot in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Positional id: `field-1`, `field-2`, ... in order of appearance.
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Positional field id for the block at `index` (zero-based).
pub fn field_id(index: usize) -> String {
    format!("field-{}", index + 1)
}

/// A matched block and its byte span in the source text.
#[derive(Debug)]
struct Block {
    start: usize,
    end: usize,
    title: String,
    description: String,
}

/// Extract the ordered field descriptors declared in `content`.
pub fn parse(content: &str) -> Vec<FieldDescriptor> {
    scan(content)
        .into_iter()
        .enumerate()
        .map(|(index, block)| FieldDescriptor {
            id: field_id(index),
            title: block.title,
            description: block.description,
        })
        .collect()
}

/// Substitute user values into `content`.
///
/// Each descriptor with a value in `values` has its block located by its
/// captured title and description and replaced, markers included, by the
/// literal value. Blocks are compared as plain text, so neither titles nor
/// values are ever interpreted as patterns. Ids that the template does not
/// declare are ignored, and blocks without a value stay byte-identical.
///
/// Two blocks with the same title and description are indistinguishable by
/// text: both receive the value of the first such field that has one.
pub fn fill(content: &str, values: &HashMap<String, String>) -> String {
    let blocks = scan(content);
    if blocks.is_empty() || values.is_empty() {
        return content.to_string();
    }

    let mut replacements: Vec<Option<&str>> = vec![None; blocks.len()];
    for (index, field) in blocks.iter().enumerate() {
        let Some(value) = values.get(&field_id(index)) else {
            continue;
        };
        for (slot, block) in replacements.iter_mut().zip(&blocks) {
            if slot.is_none() && block.title == field.title && block.description == field.description {
                *slot = Some(value.as_str());
            }
        }
    }

    let mut filled = String::with_capacity(content.len());
    let mut cursor = 0;
    for (block, replacement) in blocks.iter().zip(replacements) {
        if let Some(value) = replacement {
            filled.push_str(&content[cursor..block.start]);
            filled.push_str(value);
            cursor = block.end;
        }
    }
    filled.push_str(&content[cursor..]);
    filled
}

fn scan(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = content[cursor..].find(MARKER) {
        let start = cursor + offset;
        match parse_block(content, start) {
            Some(block) => {
                cursor = block.end;
                blocks.push(block);
            }
            // '#' is a single byte, so start + 1 is a char boundary.
            None => cursor = start + 1,
        }
    }

    blocks
}

/// Try to read one block whose opening marker begins at `start`.
fn parse_block(content: &str, start: usize) -> Option<Block> {
    let mut pos = skip_whitespace(content, start + MARKER.len());
    if !content[pos..].starts_with(TITLE_LABEL) {
        return None;
    }
    pos = skip_whitespace(content, pos + TITLE_LABEL.len());

    // A title never runs past its line or into another marker.
    let rest = &content[pos..];
    let line_end = pos + [rest.find('\n'), rest.find(MARKER)]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    let line = &content[pos..line_end];

    // Longest title first: the whole line, then each inline label right to left.
    let mut title_ends = vec![line_end];
    title_ends.extend(line.rmatch_indices(DESCRIPTION_LABEL).map(|(i, _)| pos + i));

    title_ends.into_iter().find_map(|title_end| {
        let title = content[pos..title_end].trim();
        if title.is_empty() {
            return None;
        }
        let (description, end) = parse_description(content, title_end)?;
        Some(Block {
            start,
            end,
            title: title.to_string(),
            description,
        })
    })
}

/// Read `ws* "description:" ws* description MARKER` starting at `pos`.
/// Returns the trimmed description and the byte offset just past the marker.
fn parse_description(content: &str, pos: usize) -> Option<(String, usize)> {
    let mut pos = skip_whitespace(content, pos);
    if !content[pos..].starts_with(DESCRIPTION_LABEL) {
        return None;
    }
    pos = skip_whitespace(content, pos + DESCRIPTION_LABEL.len());

    let body_end = pos + content[pos..].find('#')?;
    let description = content[pos..body_end].trim();
    if description.is_empty() || !content[body_end..].starts_with(MARKER) {
        return None;
    }
    Some((description.to_string(), body_end + MARKER.len()))
}

fn skip_whitespace(content: &str, pos: usize) -> usize {
    content[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(content.len(), |(i, _)| pos + i)
}
