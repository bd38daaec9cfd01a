//! Encode - Configuration to Query
//!
//! Emits only the fields that differ from the default table.

use crate::codec::QueryMap;
use crate::domain::{ConfigField, WidgetConfig};

/// Whether a field is carried by the theme name instead of its own key
pub(crate) fn implied_by_theme(config: &WidgetConfig, field: ConfigField) -> bool {
    field.is_color() && config.theme.preset().is_some()
}

/// Encode a configuration into its minimal query map.
///
/// Fields equal to their default are omitted. Under a named preset every
/// colour key is omitted as well, since decoding the theme name restores them.
pub fn encode(config: &WidgetConfig, defaults: &WidgetConfig) -> QueryMap {
    let mut query = QueryMap::new();
    for field in ConfigField::all() {
        if implied_by_theme(config, field) {
            continue;
        }
        let value = config.get(field);
        if value == defaults.get(field) {
            continue;
        }
        query.insert(field.query_key(), value.to_param());
    }
    query
}
