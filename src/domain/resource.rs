//! Filter Resources
//!
//! Entity lists served by the configured API that back the filter fields.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// API resource backing one filter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterResource {
    District,
    Theme,
    Practice,
    City,
    Structure,
    Portal,
    Route,
    Label,
}

impl FilterResource {
    /// Every filter resource, in form order
    pub const ALL: [FilterResource; 8] = [
        FilterResource::District,
        FilterResource::Theme,
        FilterResource::Practice,
        FilterResource::City,
        FilterResource::Structure,
        FilterResource::Portal,
        FilterResource::Route,
        FilterResource::Label,
    ];

    /// Path segment appended to the API base URL
    pub fn path(self) -> &'static str {
        match self {
            FilterResource::District => "district",
            FilterResource::Theme => "theme",
            FilterResource::Practice => "trek_practice",
            FilterResource::City => "city",
            FilterResource::Structure => "structure",
            FilterResource::Portal => "portal",
            FilterResource::Route => "trek_route",
            FilterResource::Label => "label",
        }
    }

    /// Key of the filter in the configurator URL
    pub fn query_key(self) -> &'static str {
        match self {
            FilterResource::District => "districts",
            FilterResource::Theme => "themes",
            FilterResource::Practice => "practices",
            FilterResource::City => "city",
            FilterResource::Structure => "structure",
            FilterResource::Portal => "portals",
            FilterResource::Route => "routes",
            FilterResource::Label => "labels",
        }
    }

    /// Name used by the widget (preview key and embed attribute)
    pub fn widget_name(self) -> &'static str {
        match self {
            FilterResource::District => "districts",
            FilterResource::Theme => "themes",
            FilterResource::Practice => "practices",
            FilterResource::City => "cities",
            FilterResource::Structure => "structures",
            FilterResource::Portal => "portals",
            FilterResource::Route => "routes",
            FilterResource::Label => "labels",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }
}

impl fmt::Display for FilterResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Display name of an entity: either plain or per-language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedName {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedName {
    /// Resolve for a language, falling back to the first available translation
    pub fn resolve(&self, language: &str) -> Option<&str> {
        match self {
            LocalizedName::Plain(name) => Some(name),
            LocalizedName::Localized(names) => names
                .get(language)
                .filter(|name| !name.is_empty())
                .or_else(|| names.values().find(|name| !name.is_empty()))
                .map(String::as_str),
        }
    }
}

/// One selectable entity of a filter resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: u32,
    /// Districts and cities expose `name`, themes and labels expose `label`
    #[serde(alias = "label")]
    pub name: LocalizedName,
}

impl FilterOption {
    pub fn display_name(&self, language: &str) -> String {
        self.name
            .resolve(language)
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Paginated list envelope returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionPage {
    #[serde(default)]
    pub results: Vec<FilterOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_localized_names() {
        let body = r#"{"count": 2, "results": [
            {"id": 1, "name": "Oisans"},
            {"id": 2, "label": {"fr": "Faune", "en": "Fauna"}}
        ]}"#;
        let page: OptionPage = serde_json::from_str(body).expect("valid page");
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].display_name("en"), "Oisans");
        assert_eq!(page.results[1].display_name("en"), "Fauna");
        assert_eq!(page.results[1].display_name("fr"), "Faune");
    }

    #[test]
    fn localized_name_falls_back_to_first_translation() {
        let name = LocalizedName::Localized(BTreeMap::from([
            ("de".to_string(), "Wandern".to_string()),
            ("it".to_string(), String::new()),
        ]));
        assert_eq!(name.resolve("it"), Some("Wandern"));
        assert_eq!(name.resolve("es"), Some("Wandern"));
    }

    #[test]
    fn empty_localized_name_uses_id() {
        let option = FilterOption {
            id: 42,
            name: LocalizedName::Localized(BTreeMap::new()),
        };
        assert_eq!(option.display_name("fr"), "42");
    }

    #[test]
    fn resource_paths_are_unique() {
        for resource in FilterResource::ALL {
            assert_eq!(FilterResource::from_path(resource.path()), Some(resource));
        }
    }
}
