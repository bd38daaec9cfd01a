//! Export - Preview and Snippet Generators
//!
//! Pure transforms from a configuration to the preview frame URL and the
//! paste-ready embed snippet. Both share one default-diffing policy:
//! identity fields always, colours skipped under a named preset, everything
//! else only when it differs from the default table.

mod frame;
mod preview;
mod snippet;

pub use frame::frame_attributes;
pub use preview::{PreviewEvent, PreviewGenerator, PreviewScheduler, ViewportMode};
pub use snippet::SnippetGenerator;

use serde::{Deserialize, Serialize};

use crate::codec::implied_by_theme;
use crate::domain::{ConfigField, FieldValue, WidgetConfig};

/// Switches shared by the generators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Emit non-default colours even when a named preset is active.
    ///
    /// The widget tag has no theme attribute, so with this off an embed of
    /// any preset other than the default renders in the default palette.
    pub expand_preset_colors: bool,
}

/// Fields an export carries, in emission order
pub(crate) fn exported_fields(
    config: &WidgetConfig,
    defaults: &WidgetConfig,
    options: ExportOptions,
) -> Vec<(ConfigField, FieldValue)> {
    ConfigField::all()
        .filter(|field| field.attribute_name().is_some())
        .filter_map(|field| {
            let value = config.get(field);
            let always = matches!(field, ConfigField::Api | ConfigField::Languages);
            if !always {
                if implied_by_theme(config, field) && !options.expand_preset_colors {
                    return None;
                }
                if value == defaults.get(field) {
                    return None;
                }
            }
            Some((field, value))
        })
        .collect()
}
