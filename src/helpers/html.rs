//! HTML escaping for attribute values

use askama::{Html, MarkupDisplay};

/// Escape a value for a double-quoted HTML attribute
pub fn escape_attribute(value: &str) -> String {
    MarkupDisplay::new_unsafe(value, Html).to_string()
}
