//! Field Vocabulary
//!
//! Every configuration field with its three external names (configurator
//! URL key, preview frame key, embed attribute) and a dynamically typed
//! value used by the codec, the store and the generators.

use std::fmt;

use crate::domain::config::{IdSet, LanguageList, MarkerSize, WidgetConfig};
use crate::domain::resource::FilterResource;
use crate::domain::theme::{ColorField, ThemeSelection};
use crate::error::{Error, Result};

/// Shape of a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Flag,
    Size,
    Ids,
    Languages,
    Theme,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Flag => "boolean",
            FieldKind::Size => "integer",
            FieldKind::Ids => "id list",
            FieldKind::Languages => "language list",
            FieldKind::Theme => "theme",
        }
    }

    /// Parse a raw query value; `None` when malformed
    pub fn parse(self, raw: &str) -> Option<FieldValue> {
        match self {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Flag => match raw {
                "true" => Some(FieldValue::Flag(true)),
                "false" => Some(FieldValue::Flag(false)),
                _ => None,
            },
            FieldKind::Size => raw.trim().parse().ok().map(FieldValue::Size),
            FieldKind::Ids => IdSet::parse(raw).map(FieldValue::Ids),
            FieldKind::Languages => Some(FieldValue::Languages(LanguageList::parse(raw))),
            FieldKind::Theme => ThemeSelection::parse(raw.trim()).map(FieldValue::Theme),
        }
    }
}

/// A typed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Size(u32),
    Ids(IdSet),
    Languages(LanguageList),
    Theme(ThemeSelection),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Flag,
            FieldValue::Size(_) => FieldKind::Size,
            FieldValue::Ids(_) => FieldKind::Ids,
            FieldValue::Languages(_) => FieldKind::Languages,
            FieldValue::Theme(_) => FieldKind::Theme,
        }
    }

    /// Scalar form used in queries and attributes
    pub fn to_param(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Flag(flag) => flag.to_string(),
            FieldValue::Size(size) => size.to_string(),
            FieldValue::Ids(ids) => ids.to_param(),
            FieldValue::Languages(languages) => languages.to_param(),
            FieldValue::Theme(theme) => theme.name().to_string(),
        }
    }
}

/// One configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Api,
    Languages,
    Filter(FilterResource),
    InBbox,
    Treks,
    TouristicContents,
    TouristicEvents,
    Outdoor,
    Theme,
    Color(ColorField),
    Rounded,
    LayerName,
    LayerUrl,
    LayerAttribution,
    Size(MarkerSize),
}

const LEADING: [ConfigField; 2] = [ConfigField::Api, ConfigField::Languages];

const TOGGLES: [ConfigField; 6] = [
    ConfigField::InBbox,
    ConfigField::Treks,
    ConfigField::TouristicContents,
    ConfigField::TouristicEvents,
    ConfigField::Outdoor,
    ConfigField::Theme,
];

const LAYER: [ConfigField; 4] = [
    ConfigField::Rounded,
    ConfigField::LayerName,
    ConfigField::LayerUrl,
    ConfigField::LayerAttribution,
];

impl ConfigField {
    /// Every field, in serialization order
    pub fn all() -> impl Iterator<Item = ConfigField> {
        LEADING
            .into_iter()
            .chain(FilterResource::ALL.into_iter().map(ConfigField::Filter))
            .chain(TOGGLES)
            .chain(ColorField::ALL.into_iter().map(ConfigField::Color))
            .chain(LAYER)
            .chain(MarkerSize::ALL.into_iter().map(ConfigField::Size))
    }

    /// Fields the API URL change resets
    pub fn is_filter(self) -> bool {
        matches!(self, ConfigField::Filter(_) | ConfigField::InBbox)
    }

    pub fn is_color(self) -> bool {
        matches!(self, ConfigField::Color(_))
    }

    pub fn kind(self) -> FieldKind {
        match self {
            ConfigField::Api
            | ConfigField::InBbox
            | ConfigField::Color(_)
            | ConfigField::LayerName
            | ConfigField::LayerUrl
            | ConfigField::LayerAttribution => FieldKind::Text,
            ConfigField::Languages => FieldKind::Languages,
            ConfigField::Filter(_) => FieldKind::Ids,
            ConfigField::Treks
            | ConfigField::TouristicContents
            | ConfigField::TouristicEvents
            | ConfigField::Outdoor
            | ConfigField::Rounded => FieldKind::Flag,
            ConfigField::Theme => FieldKind::Theme,
            ConfigField::Size(_) => FieldKind::Size,
        }
    }

    /// camelCase key in the configurator URL
    pub fn query_key(self) -> &'static str {
        match self {
            ConfigField::Api => "api",
            ConfigField::Languages => "language",
            ConfigField::Filter(resource) => resource.query_key(),
            ConfigField::InBbox => "inBbox",
            ConfigField::Treks => "treks",
            ConfigField::TouristicContents => "touristicContents",
            ConfigField::TouristicEvents => "touristicEvents",
            ConfigField::Outdoor => "outdoor",
            ConfigField::Theme => "theme",
            ConfigField::Color(color) => color.query_key(),
            ConfigField::Rounded => "rounded",
            ConfigField::LayerName => "nameLayer",
            ConfigField::LayerUrl => "urlLayer",
            ConfigField::LayerAttribution => "attributionLayer",
            ConfigField::Size(size) => size.query_key(),
        }
    }

    /// Key in the preview frame URL; the theme name never leaves the configurator
    pub fn preview_key(self) -> Option<&'static str> {
        Some(match self {
            ConfigField::Api => "api",
            ConfigField::Languages => "languages",
            ConfigField::Filter(resource) => resource.widget_name(),
            ConfigField::InBbox => "inBbox",
            ConfigField::Treks => "treks",
            ConfigField::TouristicContents => "touristicContents",
            ConfigField::TouristicEvents => "touristicEvents",
            ConfigField::Outdoor => "outdoor",
            ConfigField::Theme => return None,
            ConfigField::Color(color) => color.attribute_name(),
            ConfigField::Rounded => "rounded",
            ConfigField::LayerName => "name-layer",
            ConfigField::LayerUrl => "url-layer",
            ConfigField::LayerAttribution => "attribution-layer",
            ConfigField::Size(size) => size.attribute_name(),
        })
    }

    /// Attribute of the embeddable widget tag
    pub fn attribute_name(self) -> Option<&'static str> {
        Some(match self {
            ConfigField::Api => "api",
            ConfigField::Languages => "languages",
            ConfigField::Filter(resource) => resource.widget_name(),
            ConfigField::InBbox => "in-bbox",
            ConfigField::Treks => "treks",
            ConfigField::TouristicContents => "touristic-contents",
            ConfigField::TouristicEvents => "touristic-events",
            ConfigField::Outdoor => "outdoor",
            ConfigField::Theme => return None,
            ConfigField::Color(color) => color.attribute_name(),
            ConfigField::Rounded => "rounded",
            ConfigField::LayerName => "name-layer",
            ConfigField::LayerUrl => "url-layer",
            ConfigField::LayerAttribution => "attribution-layer",
            ConfigField::Size(size) => size.attribute_name(),
        })
    }

    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::all().find(|field| field.query_key() == key)
    }

    pub fn from_preview_key(key: &str) -> Option<Self> {
        Self::all().find(|field| field.preview_key() == Some(key))
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_key())
    }
}

impl WidgetConfig {
    /// Read a field as a typed value
    pub fn get(&self, field: ConfigField) -> FieldValue {
        match field {
            ConfigField::Api => FieldValue::Text(self.api.clone()),
            ConfigField::Languages => FieldValue::Languages(self.languages.clone()),
            ConfigField::Filter(resource) => FieldValue::Ids(self.filters.get(resource).clone()),
            ConfigField::InBbox => FieldValue::Text(self.in_bbox.clone()),
            ConfigField::Treks => FieldValue::Flag(self.content.treks),
            ConfigField::TouristicContents => FieldValue::Flag(self.content.touristic_contents),
            ConfigField::TouristicEvents => FieldValue::Flag(self.content.touristic_events),
            ConfigField::Outdoor => FieldValue::Flag(self.content.outdoor),
            ConfigField::Theme => FieldValue::Theme(self.theme),
            ConfigField::Color(color) => FieldValue::Text(self.colors.get(color).to_string()),
            ConfigField::Rounded => FieldValue::Flag(self.rounded),
            ConfigField::LayerName => FieldValue::Text(self.layer.name.clone()),
            ConfigField::LayerUrl => FieldValue::Text(self.layer.url.clone()),
            ConfigField::LayerAttribution => FieldValue::Text(self.layer.attribution.clone()),
            ConfigField::Size(size) => FieldValue::Size(self.sizes.get(size)),
        }
    }

    /// Write a field without any derived-field rules.
    ///
    /// Theme and colour consistency is the caller's concern; see
    /// [`crate::state::ThemeResolver`].
    pub fn set(&mut self, field: ConfigField, value: FieldValue) -> Result<()> {
        match (field, value) {
            (ConfigField::Api, FieldValue::Text(text)) => self.api = text,
            (ConfigField::Languages, FieldValue::Languages(languages)) => {
                self.languages = languages
            }
            (ConfigField::Filter(resource), FieldValue::Ids(ids)) => {
                *self.filters.get_mut(resource) = ids
            }
            (ConfigField::InBbox, FieldValue::Text(text)) => self.in_bbox = text,
            (ConfigField::Treks, FieldValue::Flag(flag)) => self.content.treks = flag,
            (ConfigField::TouristicContents, FieldValue::Flag(flag)) => {
                self.content.touristic_contents = flag
            }
            (ConfigField::TouristicEvents, FieldValue::Flag(flag)) => {
                self.content.touristic_events = flag
            }
            (ConfigField::Outdoor, FieldValue::Flag(flag)) => self.content.outdoor = flag,
            (ConfigField::Theme, FieldValue::Theme(theme)) => self.theme = theme,
            (ConfigField::Color(color), FieldValue::Text(text)) => self.colors.set(color, text),
            (ConfigField::Rounded, FieldValue::Flag(flag)) => self.rounded = flag,
            (ConfigField::LayerName, FieldValue::Text(text)) => self.layer.name = text,
            (ConfigField::LayerUrl, FieldValue::Text(text)) => self.layer.url = text,
            (ConfigField::LayerAttribution, FieldValue::Text(text)) => {
                self.layer.attribution = text
            }
            (ConfigField::Size(size), FieldValue::Size(value)) => self.sizes.set(size, value),
            (field, _) => {
                return Err(Error::FieldType {
                    field: field.query_key(),
                    expected: field.kind().name(),
                });
            }
        }
        Ok(())
    }
}
