//! Structural extraction of interface facts from raw IDL text
//!
//! The index resolver runs before (and independently of) the full parser,
//! over every file of the project, so it only pulls out the handful of facts
//! it needs with patterns: the interface-level extended attribute block, the
//! partial marker, `implements` statements, the callback marker, the parent
//! and `[PutForwards]` targets.

use crate::error::{IdlError, IdlResult};
use crate::ir::{ExtAttrValue, ExtendedAttributes};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();

    static ref LINE_COMMENT: Regex = Regex::new(r"//[^\n]*").unwrap();

    /// `[callback|partial] interface|exception Name [: Parent] {`
    static ref INTERFACE_HEADER: Regex = Regex::new(
        r"(?:\b(?:callback|partial)\s+)?\b(?:interface|exception)\s+\w+\s*(?::\s*\w+\s*)?\{"
    ).unwrap();

    static ref PARTIAL_INTERFACE: Regex = Regex::new(r"\bpartial\s+interface\s+(\w+)").unwrap();

    /// `Left implements Right;` at the start of a line
    static ref IMPLEMENTS: Regex = Regex::new(r"(?m)^\s*(\w+)\s+implements\s+(\w+)\s*;").unwrap();

    static ref CALLBACK_INTERFACE: Regex = Regex::new(r"\bcallback\s+interface\s+\w+\s*\{").unwrap();

    static ref PARENT_INTERFACE: Regex = Regex::new(r"\binterface\s+\w+\s*:\s*(\w+)\s*\{").unwrap();

    /// Type of a readonly attribute carrying `[PutForwards=...]`
    static ref PUT_FORWARDS: Regex = Regex::new(
        r"\[[^\]]*\bPutForwards=[^\]]*\]\s+readonly\s+attribute\s+(\w+)"
    ).unwrap();
}

/// Facts about one IDL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFacts {
    pub extended_attributes: ExtendedAttributes,
    /// Name extended by a `partial interface` declaration
    pub partial_interface: Option<String>,
    pub implemented_interfaces: Vec<String>,
    pub is_callback_interface: bool,
    pub parent: Option<String>,
    pub put_forwards_interfaces: Vec<String>,
}

/// Extract every fact from a file declaring `interface_name` (its stem)
pub fn extract_facts(path: &Path, interface_name: &str, contents: &str) -> IdlResult<FileFacts> {
    let text = strip_comments(contents);
    let partial_interface = partial_interface_name(&text);

    // A partial file names someone else's interface, so its `implements`
    // statements are not checked against the stem
    let implemented_interfaces = match partial_interface {
        Some(_) => Vec::new(),
        None => implemented_interfaces(path, interface_name, &text)?,
    };

    Ok(FileFacts {
        extended_attributes: interface_extended_attributes(&text),
        partial_interface,
        implemented_interfaces,
        is_callback_interface: is_callback_interface(&text),
        parent: parent_interface(&text),
        put_forwards_interfaces: put_forwards_interfaces(&text),
    })
}

/// Remove `/* */` and `//` comments
pub fn strip_comments(text: &str) -> String {
    let text = BLOCK_COMMENT.replace_all(text, "");
    LINE_COMMENT.replace_all(&text, "").into_owned()
}

/// Extended attributes of the bracketed block right before the interface header
pub fn interface_extended_attributes(text: &str) -> ExtendedAttributes {
    let Some(header) = INTERFACE_HEADER.find(text) else {
        return ExtendedAttributes::new();
    };
    let before = text[..header.start()].trim_end();
    let Some(block) = trailing_bracket_block(before) else {
        return ExtendedAttributes::new();
    };

    split_top_level(block, ',')
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((name, value)) => (
                name.trim().to_string(),
                ExtAttrValue::Value(value.trim().to_string()),
            ),
            None => (part.to_string(), ExtAttrValue::Flag),
        })
        .collect()
}

/// Inner text of the `[...]` block that `text` ends with
fn trailing_bracket_block(text: &str) -> Option<&str> {
    if !text.ends_with(']') {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices().rev() {
        match c {
            ']' => depth += 1,
            '[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[i + 1..text.len() - 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep`, ignoring separators nested in parentheses
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

pub fn partial_interface_name(text: &str) -> Option<String> {
    PARTIAL_INTERFACE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Right-hand sides of `implements` statements, unique and in order
///
/// The left-hand side must be the interface the file declares.
pub fn implemented_interfaces(path: &Path, interface_name: &str, text: &str) -> IdlResult<Vec<String>> {
    let mut implemented: Vec<String> = Vec::new();
    for caps in IMPLEMENTS.captures_iter(text) {
        let left = &caps[1];
        if left != interface_name {
            return Err(IdlError::Naming {
                file: path.to_path_buf(),
                expected: interface_name.to_string(),
                found: left.to_string(),
            });
        }
        let right = caps[2].to_string();
        if !implemented.contains(&right) {
            implemented.push(right);
        }
    }
    Ok(implemented)
}

pub fn is_callback_interface(text: &str) -> bool {
    CALLBACK_INTERFACE.is_match(text)
}

pub fn parent_interface(text: &str) -> Option<String> {
    PARENT_INTERFACE.captures(text).map(|caps| caps[1].to_string())
}

/// Interfaces named as the type of `[PutForwards]` attributes, unique and in order
pub fn put_forwards_interfaces(text: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for caps in PUT_FORWARDS.captures_iter(text) {
        let target = caps[1].to_string();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}
