//! Theme Resolution
//!
//! Transitions over the (theme selection, colours) pair. A preset locks the
//! colours to catalog values; a single colour edit detaches to `custom`.

use crate::domain::{ColorField, ColorSet, Theme, ThemeSelection, WidgetConfig};

/// Named theme transitions applied to a configuration record
pub struct ThemeResolver;

impl ThemeResolver {
    /// Select a preset or `custom`.
    ///
    /// A preset overwrites every colour; `custom` keeps the current colours.
    pub fn select_theme(config: &mut WidgetConfig, selection: ThemeSelection) {
        match selection {
            ThemeSelection::Preset(theme) => Self::apply_palette(config, theme),
            ThemeSelection::Custom => config.theme = ThemeSelection::Custom,
        }
    }

    /// Single colour edit by the user; detaches from any active preset
    pub fn edit_color(config: &mut WidgetConfig, field: ColorField, value: impl Into<String>) {
        config.colors.set(field, value);
        if config.theme.preset().is_some() {
            tracing::debug!(color = field.query_key(), "Colour edit detached theme to custom");
            config.theme = ThemeSelection::Custom;
        }
    }

    /// Bulk application of a preset; never triggers detachment
    pub fn apply_palette(config: &mut WidgetConfig, theme: Theme) {
        config.colors = ColorSet::from_palette(theme.palette());
        config.theme = ThemeSelection::Preset(theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_edit_detaches_from_preset() {
        let mut config = WidgetConfig::default();
        ThemeResolver::edit_color(&mut config, ColorField::Primary, "#000000");

        assert_eq!(config.theme, ThemeSelection::Custom);
        assert_eq!(config.colors.get(ColorField::Primary), "#000000");
        let purple = Theme::Purple.palette();
        for field in ColorField::ALL.into_iter().filter(|f| *f != ColorField::Primary) {
            assert_eq!(config.colors.get(field), purple[field.index()]);
        }
    }

    #[test]
    fn selecting_preset_overwrites_colours() {
        let mut config = WidgetConfig::default();
        ThemeResolver::edit_color(&mut config, ColorField::Markers, "#111111");
        ThemeResolver::select_theme(&mut config, ThemeSelection::Preset(Theme::Red));

        assert_eq!(config.theme, ThemeSelection::Preset(Theme::Red));
        assert!(config.colors.matches(Theme::Red.palette()));
        assert!(config.theme_consistent());
    }

    #[test]
    fn selecting_custom_keeps_colours() {
        let mut config = WidgetConfig::default();
        ThemeResolver::select_theme(&mut config, ThemeSelection::Preset(Theme::Blue));
        ThemeResolver::select_theme(&mut config, ThemeSelection::Custom);

        assert_eq!(config.theme, ThemeSelection::Custom);
        assert!(config.colors.matches(Theme::Blue.palette()));
    }

    #[test]
    fn edit_under_custom_stays_custom() {
        let mut config = WidgetConfig::default();
        config.theme = ThemeSelection::Custom;
        ThemeResolver::edit_color(&mut config, ColorField::Fab, "#abcdef");
        ThemeResolver::edit_color(&mut config, ColorField::Clusters, "#fedcba");
        assert_eq!(config.theme, ThemeSelection::Custom);
        assert_eq!(config.colors.get(ColorField::Fab), "#abcdef");
    }
}
