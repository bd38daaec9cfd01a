//! Config - Widget Configuration Record
//!
//! The single source of truth edited by the configurator, plus the immutable
//! default table every serializer diffs against.

use std::sync::OnceLock;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::constants::API_PATH_SUFFIX;
use crate::domain::resource::FilterResource;
use crate::domain::theme::{COLOR_COUNT, ColorField, Palette, Theme, ThemeSelection};

/// Language selected when the list would otherwise be empty
pub const DEFAULT_LANGUAGE: &str = "fr";

/// API instance the configurator starts on
pub const DEFAULT_API: &str = "https://geotrekdemo.ecrins-parcnational.fr/api/v2/";

const DEFAULT_LAYER_NAME: &str = "IGN";
const DEFAULT_LAYER_URL: &str = "https://data.geopf.fr/wmts?SERVICE=WMTS&REQUEST=GetTile&VERSION=1.0.0&LAYER=GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2&STYLE=normal&FORMAT=image/png&TILEMATRIXSET=PM&TILEMATRIX={z}&TILEROW={y}&TILECOL={x}";
const DEFAULT_LAYER_ATTRIBUTION: &str = "<a target=\"_blank\" href=\"https://www.ign.fr/\">IGN</a>";

/// Whether an API base URL passes the required + pattern check
pub fn is_valid_api_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url.ends_with(API_PATH_SUFFIX)
}

// ==================== IdSet ====================

/// Set of opaque entity identifiers, kept in insertion order.
///
/// Equality ignores order: `{1,2}` equals `{2,1}`.
#[derive(Debug, Clone, Default, Eq)]
pub struct IdSet(Vec<u32>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier; returns false if it was already present
    pub fn insert(&mut self, id: u32) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.0.len();
        self.0.retain(|&existing| existing != id);
        self.0.len() != before
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Comma-joined, in insertion order
    pub fn to_param(&self) -> String {
        self.0
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a comma-joined list; `None` if any member is not an integer
    pub fn parse(raw: &str) -> Option<Self> {
        let mut set = IdSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            set.insert(part.parse().ok()?);
        }
        Some(set)
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|id| other.0.contains(id))
    }
}

impl FromIterator<u32> for IdSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = IdSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<const N: usize> From<[u32; N]> for IdSet {
    fn from(ids: [u32; N]) -> Self {
        ids.into_iter().collect()
    }
}

impl Serialize for IdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

// ==================== LanguageList ====================

/// Ordered, never-empty list of language codes; the first is the active one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageList(Vec<String>);

impl LanguageList {
    /// Build from codes, dropping blanks and duplicates; empty input restores the default
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into().trim().to_string();
            if !code.is_empty() && !list.contains(&code) {
                list.push(code);
            }
        }
        if list.is_empty() {
            list.push(DEFAULT_LANGUAGE.to_string());
        }
        Self(list)
    }

    /// Parse the stored comma-joined form
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Display language of the widget
    pub fn active(&self) -> &str {
        // Never empty by construction
        self.0.first().map(String::as_str).unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_param(&self) -> String {
        self.0.join(",")
    }

    /// Remove a language; removing the last one restores the default
    pub fn without(&self, code: &str) -> Self {
        Self::new(self.0.iter().filter(|c| c.as_str() != code).cloned())
    }
}

impl Default for LanguageList {
    fn default() -> Self {
        Self(vec![DEFAULT_LANGUAGE.to_string()])
    }
}

// ==================== ColorSet ====================

/// Values of every colour field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSet([String; COLOR_COUNT]);

impl ColorSet {
    pub fn from_palette(palette: &Palette) -> Self {
        Self((*palette).map(str::to_string))
    }

    pub fn get(&self, field: ColorField) -> &str {
        &self.0[field.index()]
    }

    pub fn set(&mut self, field: ColorField, value: impl Into<String>) {
        self.0[field.index()] = value.into();
    }

    /// Whether every colour equals the given palette
    pub fn matches(&self, palette: &Palette) -> bool {
        self.0.iter().zip(palette.iter()).all(|(a, b)| a == b)
    }
}

impl Default for ColorSet {
    fn default() -> Self {
        Self::from_palette(Theme::default().palette())
    }
}

impl Serialize for ColorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COLOR_COUNT))?;
        for field in ColorField::ALL {
            map.serialize_entry(field.query_key(), self.get(field))?;
        }
        map.end()
    }
}

// ==================== Groups ====================

/// Selected entity identifiers per filter resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub districts: IdSet,
    pub themes: IdSet,
    pub practices: IdSet,
    pub cities: IdSet,
    pub structures: IdSet,
    pub portals: IdSet,
    pub routes: IdSet,
    pub labels: IdSet,
}

impl FilterSelection {
    pub fn get(&self, resource: FilterResource) -> &IdSet {
        match resource {
            FilterResource::District => &self.districts,
            FilterResource::Theme => &self.themes,
            FilterResource::Practice => &self.practices,
            FilterResource::City => &self.cities,
            FilterResource::Structure => &self.structures,
            FilterResource::Portal => &self.portals,
            FilterResource::Route => &self.routes,
            FilterResource::Label => &self.labels,
        }
    }

    pub fn get_mut(&mut self, resource: FilterResource) -> &mut IdSet {
        match resource {
            FilterResource::District => &mut self.districts,
            FilterResource::Theme => &mut self.themes,
            FilterResource::Practice => &mut self.practices,
            FilterResource::City => &mut self.cities,
            FilterResource::Structure => &mut self.structures,
            FilterResource::Portal => &mut self.portals,
            FilterResource::Route => &mut self.routes,
            FilterResource::Label => &mut self.labels,
        }
    }

    pub fn clear(&mut self) {
        for resource in FilterResource::ALL {
            self.get_mut(resource).clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        FilterResource::ALL.iter().all(|r| self.get(*r).is_empty())
    }
}

/// Content categories the widget includes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentToggles {
    pub treks: bool,
    pub touristic_contents: bool,
    pub touristic_events: bool,
    pub outdoor: bool,
}

impl Default for ContentToggles {
    fn default() -> Self {
        Self {
            treks: true,
            touristic_contents: false,
            touristic_events: false,
            outdoor: false,
        }
    }
}

/// Base map layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

impl Default for MapLayer {
    fn default() -> Self {
        Self {
            name: DEFAULT_LAYER_NAME.to_string(),
            url: DEFAULT_LAYER_URL.to_string(),
            attribution: DEFAULT_LAYER_ATTRIBUTION.to_string(),
        }
    }
}

/// Glyph variant whose pixel size is configurable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerSize {
    MainMarker,
    SelectedMainMarker,
    MainCluster,
    CommonMarker,
    DepartureArrivalMarker,
    PointReferenceMarker,
}

impl MarkerSize {
    pub const ALL: [MarkerSize; 6] = [
        MarkerSize::MainMarker,
        MarkerSize::SelectedMainMarker,
        MarkerSize::MainCluster,
        MarkerSize::CommonMarker,
        MarkerSize::DepartureArrivalMarker,
        MarkerSize::PointReferenceMarker,
    ];

    pub fn query_key(self) -> &'static str {
        match self {
            MarkerSize::MainMarker => "mainMarkerSize",
            MarkerSize::SelectedMainMarker => "selectedMainMarkerSize",
            MarkerSize::MainCluster => "mainClusterSize",
            MarkerSize::CommonMarker => "commonMarkerSize",
            MarkerSize::DepartureArrivalMarker => "departureArrivalMarkerSize",
            MarkerSize::PointReferenceMarker => "pointReferenceMarkerSize",
        }
    }

    pub fn attribute_name(self) -> &'static str {
        match self {
            MarkerSize::MainMarker => "main-marker-size",
            MarkerSize::SelectedMainMarker => "selected-main-marker-size",
            MarkerSize::MainCluster => "main-cluster-size",
            MarkerSize::CommonMarker => "common-marker-size",
            MarkerSize::DepartureArrivalMarker => "departure-arrival-marker-size",
            MarkerSize::PointReferenceMarker => "point-reference-marker-size",
        }
    }
}

/// Pixel sizes of marker and cluster glyphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerSizes {
    pub main_marker: u32,
    pub selected_main_marker: u32,
    pub main_cluster: u32,
    pub common_marker: u32,
    pub departure_arrival_marker: u32,
    pub point_reference_marker: u32,
}

impl MarkerSizes {
    pub fn get(&self, size: MarkerSize) -> u32 {
        match size {
            MarkerSize::MainMarker => self.main_marker,
            MarkerSize::SelectedMainMarker => self.selected_main_marker,
            MarkerSize::MainCluster => self.main_cluster,
            MarkerSize::CommonMarker => self.common_marker,
            MarkerSize::DepartureArrivalMarker => self.departure_arrival_marker,
            MarkerSize::PointReferenceMarker => self.point_reference_marker,
        }
    }

    pub fn set(&mut self, size: MarkerSize, value: u32) {
        let slot = match size {
            MarkerSize::MainMarker => &mut self.main_marker,
            MarkerSize::SelectedMainMarker => &mut self.selected_main_marker,
            MarkerSize::MainCluster => &mut self.main_cluster,
            MarkerSize::CommonMarker => &mut self.common_marker,
            MarkerSize::DepartureArrivalMarker => &mut self.departure_arrival_marker,
            MarkerSize::PointReferenceMarker => &mut self.point_reference_marker,
        };
        *slot = value;
    }
}

impl Default for MarkerSizes {
    fn default() -> Self {
        Self {
            main_marker: 32,
            selected_main_marker: 48,
            main_cluster: 48,
            common_marker: 48,
            departure_arrival_marker: 14,
            point_reference_marker: 24,
        }
    }
}

// ==================== WidgetConfig ====================

/// Full set of widget settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetConfig {
    /// API base URL, ends with `/api/v2/`
    pub api: String,
    pub languages: LanguageList,
    pub filters: FilterSelection,
    /// Bounding box filter, empty when unset
    pub in_bbox: String,
    pub content: ContentToggles,
    pub theme: ThemeSelection,
    pub colors: ColorSet,
    pub rounded: bool,
    pub layer: MapLayer,
    pub sizes: MarkerSizes,
}

impl WidgetConfig {
    /// The immutable default table
    pub fn defaults() -> &'static WidgetConfig {
        static DEFAULTS: OnceLock<WidgetConfig> = OnceLock::new();
        DEFAULTS.get_or_init(WidgetConfig::baseline)
    }

    fn baseline() -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            languages: LanguageList::default(),
            filters: FilterSelection::default(),
            in_bbox: String::new(),
            content: ContentToggles::default(),
            theme: ThemeSelection::default(),
            colors: ColorSet::default(),
            rounded: true,
            layer: MapLayer::default(),
            sizes: MarkerSizes::default(),
        }
    }

    /// Whether colours satisfy the theme invariant
    pub fn theme_consistent(&self) -> bool {
        match self.theme {
            ThemeSelection::Preset(theme) => self.colors.matches(theme.palette()),
            ThemeSelection::Custom => true,
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::defaults().clone()
    }
}
