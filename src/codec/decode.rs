//! Decode - Query to Configuration
//!
//! Never fails: absent keys take their default and malformed values fall
//! back to the default of that field.

use tracing::debug;

use crate::codec::QueryMap;
use crate::domain::{
    ColorSet, ConfigField, FieldValue, FilterResource, IdSet, LanguageList,
    ThemeSelection, WidgetConfig,
};

/// Decode a query map against the default table.
///
/// Unknown keys are ignored. A named preset in the query overwrites every
/// colour from the catalog, even when colour keys are present too.
pub fn decode(query: &QueryMap, defaults: &WidgetConfig) -> WidgetConfig {
    let mut config = defaults.clone();

    for field in ConfigField::all() {
        let Some(raw) = query.get(field.query_key()) else {
            continue;
        };
        let Some(value) = parse_field(field, raw, defaults) else {
            debug!(key = field.query_key(), value = raw, "Malformed query value, using default");
            continue;
        };
        // Kinds are produced by `field.kind()`, so this cannot mismatch
        if config.set(field, value).is_err() {
            debug!(key = field.query_key(), "Query value kind mismatch");
        }
    }

    if !query.contains_key(ConfigField::Filter(FilterResource::District).query_key())
        && query.contains_key(ConfigField::Api.query_key())
        && config.api != defaults.api
    {
        // District ids of the default instance mean nothing on another one
        config.filters.districts = IdSet::new();
    }

    if let ThemeSelection::Preset(theme) = config.theme {
        config.colors = ColorSet::from_palette(theme.palette());
    }

    config
}

fn parse_field(field: ConfigField, raw: &str, defaults: &WidgetConfig) -> Option<FieldValue> {
    match field {
        ConfigField::Api
        | ConfigField::Color(_)
        | ConfigField::LayerName
        | ConfigField::LayerUrl
        | ConfigField::LayerAttribution
            if raw.trim().is_empty() =>
        {
            // Blank means absent for fields whose default is not blank
            Some(defaults.get(field))
        }
        ConfigField::Api => Some(FieldValue::Text(raw.trim().to_string())),
        ConfigField::Languages if raw.trim().is_empty() => {
            Some(FieldValue::Languages(defaults.languages.clone()))
        }
        ConfigField::Languages => Some(FieldValue::Languages(LanguageList::parse(raw))),
        _ => field.kind().parse(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use crate::domain::{ColorField, MarkerSize, Theme};

    fn query(raw: &str) -> QueryMap {
        QueryMap::parse(raw)
    }

    #[test]
    fn empty_query_decodes_to_defaults() {
        let defaults = WidgetConfig::defaults();
        assert_eq!(&decode(&QueryMap::new(), defaults), defaults);
    }

    #[test]
    fn custom_theme_keeps_single_colour_override() {
        let defaults = WidgetConfig::defaults();
        let config = decode(&query("theme=custom&colorPrimary=%23ff0000"), defaults);

        assert_eq!(config.theme, ThemeSelection::Custom);
        assert_eq!(config.colors.get(ColorField::Primary), "#ff0000");
        for field in ColorField::ALL.into_iter().filter(|f| *f != ColorField::Primary) {
            assert_eq!(config.colors.get(field), defaults.colors.get(field));
        }
    }

    #[test]
    fn named_preset_overrides_colour_keys() {
        let defaults = WidgetConfig::defaults();
        let config = decode(&query("theme=blue&colorPrimary=%23ff0000"), defaults);
        assert_eq!(config.theme, ThemeSelection::Preset(Theme::Blue));
        assert!(config.colors.matches(Theme::Blue.palette()));
    }

    #[test]
    fn colour_keys_without_theme_are_overridden_by_default_preset() {
        let defaults = WidgetConfig::defaults();
        let config = decode(&query("colorPrimary=%23ff0000"), defaults);
        assert!(config.theme_consistent());
        assert_eq!(config.colors.get(ColorField::Primary), "#6750a4");
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let defaults = WidgetConfig::defaults();
        let config = decode(
            &query("mainMarkerSize=big&treks=yes&districts=1,x&theme=teal&themes=3,4"),
            defaults,
        );
        assert_eq!(config.sizes.get(MarkerSize::MainMarker), 32);
        assert!(config.content.treks);
        assert!(config.filters.districts.is_empty());
        assert_eq!(config.theme, defaults.theme);
        assert_eq!(config.filters.themes, IdSet::from([3, 4]));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let defaults = WidgetConfig::defaults();
        assert_eq!(&decode(&query("foo=bar&_v=123"), defaults), defaults);
    }

    #[test]
    fn empty_language_restores_default() {
        let defaults = WidgetConfig::defaults();
        let config = decode(&query("language="), defaults);
        assert_eq!(config.languages, defaults.languages);

        let config = decode(&query("language=en,es"), defaults);
        assert_eq!(config.languages.active(), "en");
        assert_eq!(config.languages.as_slice().len(), 2);
    }

    #[test]
    fn blank_text_values_restore_defaults() {
        let defaults = WidgetConfig::defaults();
        let config = decode(
            &query("api=&theme=custom&colorPrimary=&colorTrekLine=%20&nameLayer=&urlLayer=&attributionLayer="),
            defaults,
        );

        assert_eq!(config.api, defaults.api);
        assert!(crate::domain::is_valid_api_url(&config.api));
        assert_eq!(config.theme, ThemeSelection::Custom);
        assert_eq!(config.colors, defaults.colors);
        assert_eq!(config.layer, defaults.layer);
    }

    #[test]
    fn blank_bbox_stays_blank() {
        let defaults = WidgetConfig::defaults();
        assert!(decode(&query("inBbox="), defaults).in_bbox.is_empty());
    }

    #[test]
    fn district_default_depends_on_api() {
        let mut defaults = WidgetConfig::default();
        defaults.filters.districts = IdSet::from([1, 2]);

        let same_api = decode(&query("treks=false"), &defaults);
        assert_eq!(same_api.filters.districts, IdSet::from([1, 2]));

        let other_api = decode(&query("api=https%3A%2F%2Fy%2Fapi%2Fv2%2F"), &defaults);
        assert!(other_api.filters.districts.is_empty());

        let explicit = decode(&query("api=https%3A%2F%2Fy%2Fapi%2Fv2%2F&districts=9"), &defaults);
        assert_eq!(explicit.filters.districts, IdSet::from([9]));
    }

    #[test]
    fn round_trip_preserves_configuration() {
        let defaults = WidgetConfig::defaults();
        let mut config = WidgetConfig::default();
        config.api = "https://other.example/api/v2/".to_string();
        config.languages = LanguageList::new(["en", "fr"]);
        config.filters.cities = IdSet::from([38185, 38001]);
        config.filters.labels = IdSet::from([2]);
        config.in_bbox = "5.1,44.6,6.4,45.2".to_string();
        config.content.touristic_events = true;
        config.theme = ThemeSelection::Custom;
        config.colors.set(ColorField::TrekLine, "#123456");
        config.rounded = false;
        config.layer.name = "OpenStreetMap & co".to_string();
        config.sizes.set(MarkerSize::PointReferenceMarker, 30);

        assert_eq!(decode(&encode(&config, defaults), defaults), config);
    }

    #[test]
    fn round_trip_through_query_string() {
        let defaults = WidgetConfig::defaults();
        let mut config = WidgetConfig::default();
        config.theme = ThemeSelection::Preset(Theme::Orange);
        config.colors = ColorSet::from_palette(Theme::Orange.palette());
        config.filters.districts = IdSet::from([3, 1]);

        let raw = encode(&config, defaults).to_query_string();
        assert_eq!(decode(&QueryMap::parse(&raw), defaults), config);
    }
}
