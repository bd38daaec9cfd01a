//! Frame - Preview Route Attribute Mapping
//!
//! The preview route reads its query and forwards each value to the widget
//! element under the widget's attribute name.

use crate::codec::QueryMap;
use crate::constants::PREVIEW_TOKEN_KEY;
use crate::domain::ConfigField;

/// Widget attributes the preview frame would set for a preview query.
///
/// The cache-busting token and unknown keys are dropped.
pub fn frame_attributes(preview_query: &QueryMap) -> Vec<(&'static str, String)> {
    preview_query
        .iter()
        .filter(|(key, _)| *key != PREVIEW_TOKEN_KEY)
        .filter_map(|(key, value)| {
            let name = ConfigField::from_preview_key(key)?.attribute_name()?;
            Some((name, value.to_string()))
        })
        .collect()
}
