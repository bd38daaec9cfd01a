//! Codec - Configuration <-> Query String
//!
//! `encode` emits the minimal query map for a configuration, `decode`
//! rebuilds a fully defined configuration from any query map.

mod decode;
mod encode;
mod query;

pub use decode::decode;
pub use encode::encode;
pub(crate) use encode::implied_by_theme;
pub use query::{QueryMap, decode_component, encode_component};

use crate::domain::{ConfigField, WidgetConfig};

/// Whether the session is in its pristine state.
///
/// The record must equal the defaults and the query must not carry any
/// configuration key, even one that would decode to a default value.
pub fn is_clean(config: &WidgetConfig, defaults: &WidgetConfig, query: &QueryMap) -> bool {
    config == defaults
        && !query
            .keys()
            .any(|key| ConfigField::from_query_key(key).is_some())
}

/// Shareable link for a configuration: the page URL plus its minimal query
pub fn share_url(page_base: &str, config: &WidgetConfig, defaults: &WidgetConfig) -> String {
    let base = page_base.split(['?', '#']).next().unwrap_or(page_base);
    let query = encode(config, defaults);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}
