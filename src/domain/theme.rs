//! Theme Catalog
//!
//! Named colour presets for the widget. Each preset defines every colour
//! field; the `custom` selection means colours are edited independently.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::CUSTOM_THEME;

/// Number of individually editable colour fields
pub const COLOR_COUNT: usize = 21;

/// One editable colour of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorField {
    PrimaryApp,
    Primary,
    OnPrimary,
    Surface,
    OnSurface,
    SurfaceVariant,
    OnSurfaceVariant,
    PrimaryContainer,
    OnPrimaryContainer,
    SecondaryContainer,
    OnSecondaryContainer,
    Background,
    SurfaceContainerHigh,
    SurfaceContainerLow,
    FabBackground,
    Fab,
    TrekLine,
    SensitiveArea,
    OutdoorArea,
    Markers,
    Clusters,
}

impl ColorField {
    /// All colour fields, in palette order
    pub const ALL: [ColorField; COLOR_COUNT] = [
        ColorField::PrimaryApp,
        ColorField::Primary,
        ColorField::OnPrimary,
        ColorField::Surface,
        ColorField::OnSurface,
        ColorField::SurfaceVariant,
        ColorField::OnSurfaceVariant,
        ColorField::PrimaryContainer,
        ColorField::OnPrimaryContainer,
        ColorField::SecondaryContainer,
        ColorField::OnSecondaryContainer,
        ColorField::Background,
        ColorField::SurfaceContainerHigh,
        ColorField::SurfaceContainerLow,
        ColorField::FabBackground,
        ColorField::Fab,
        ColorField::TrekLine,
        ColorField::SensitiveArea,
        ColorField::OutdoorArea,
        ColorField::Markers,
        ColorField::Clusters,
    ];

    /// Position inside a palette
    pub fn index(self) -> usize {
        self as usize
    }

    /// camelCase key used in the configurator URL
    pub fn query_key(self) -> &'static str {
        match self {
            ColorField::PrimaryApp => "colorPrimaryApp",
            ColorField::Primary => "colorPrimary",
            ColorField::OnPrimary => "colorOnPrimary",
            ColorField::Surface => "colorSurface",
            ColorField::OnSurface => "colorOnSurface",
            ColorField::SurfaceVariant => "colorSurfaceVariant",
            ColorField::OnSurfaceVariant => "colorOnSurfaceVariant",
            ColorField::PrimaryContainer => "colorPrimaryContainer",
            ColorField::OnPrimaryContainer => "colorOnPrimaryContainer",
            ColorField::SecondaryContainer => "colorSecondaryContainer",
            ColorField::OnSecondaryContainer => "colorOnSecondaryContainer",
            ColorField::Background => "colorBackground",
            ColorField::SurfaceContainerHigh => "colorSurfaceContainerHigh",
            ColorField::SurfaceContainerLow => "colorSurfaceContainerLow",
            ColorField::FabBackground => "fabBackgroundColor",
            ColorField::Fab => "fabColor",
            ColorField::TrekLine => "colorTrekLine",
            ColorField::SensitiveArea => "colorSensitiveArea",
            ColorField::OutdoorArea => "colorOutdoorArea",
            ColorField::Markers => "colorMarkers",
            ColorField::Clusters => "colorClusters",
        }
    }

    /// kebab-case attribute of the embeddable widget
    pub fn attribute_name(self) -> &'static str {
        match self {
            ColorField::PrimaryApp => "color-primary-app",
            ColorField::Primary => "color-primary",
            ColorField::OnPrimary => "color-on-primary",
            ColorField::Surface => "color-surface",
            ColorField::OnSurface => "color-on-surface",
            ColorField::SurfaceVariant => "color-surface-variant",
            ColorField::OnSurfaceVariant => "color-on-surface-variant",
            ColorField::PrimaryContainer => "color-primary-container",
            ColorField::OnPrimaryContainer => "color-on-primary-container",
            ColorField::SecondaryContainer => "color-secondary-container",
            ColorField::OnSecondaryContainer => "color-on-secondary-container",
            ColorField::Background => "color-background",
            ColorField::SurfaceContainerHigh => "color-surface-container-high",
            ColorField::SurfaceContainerLow => "color-surface-container-low",
            ColorField::FabBackground => "fab-background-color",
            ColorField::Fab => "fab-color",
            ColorField::TrekLine => "color-trek-line",
            ColorField::SensitiveArea => "color-sensitive-area",
            ColorField::OutdoorArea => "color-outdoor-area",
            ColorField::Markers => "color-markers",
            ColorField::Clusters => "color-clusters",
        }
    }
}

/// A static palette, indexed by [`ColorField::index`]
pub type Palette = [&'static str; COLOR_COUNT];

const PURPLE: Palette = [
    "#6750a4", "#6750a4", "#ffffff", "#1c1b1f", "#49454e", "#fef7ff", "#1c1b1f", "#eaddff",
    "#21005e", "#e8def8", "#1d192b", "#fef7ff", "#ece6f0", "#f7f2fa", "#eaddff", "#21005d",
    "#6b0030", "#4974a5", "#ffb700", "#6750a4", "#6750a4",
];

const BLUE: Palette = [
    "#1565c0", "#1565c0", "#ffffff", "#1a1c1e", "#43474e", "#f8f9ff", "#1a1c1e", "#d3e4ff",
    "#001c38", "#d7e3f8", "#101c2b", "#f8f9ff", "#e6e8ee", "#f2f3fa", "#d3e4ff", "#001c38",
    "#003f7d", "#4974a5", "#ffb700", "#1565c0", "#1565c0",
];

const GREEN: Palette = [
    "#2e7d32", "#2e7d32", "#ffffff", "#1a1c19", "#42493f", "#f7fbf2", "#1a1c19", "#b7f1b0",
    "#002204", "#d4e8cf", "#101f0f", "#f7fbf2", "#e5eae0", "#f1f5ec", "#b7f1b0", "#002204",
    "#1b5e20", "#4974a5", "#ffb700", "#2e7d32", "#2e7d32",
];

const ORANGE: Palette = [
    "#e65100", "#e65100", "#ffffff", "#201a17", "#52443c", "#fff8f5", "#201a17", "#ffdbcb",
    "#341000", "#f5ded3", "#2c160c", "#fff8f5", "#f3e6e0", "#fdf1eb", "#ffdbcb", "#341000",
    "#9a3c00", "#4974a5", "#ffb700", "#e65100", "#e65100",
];

const RED: Palette = [
    "#c62828", "#c62828", "#ffffff", "#201a19", "#534341", "#fff8f7", "#201a19", "#ffdad6",
    "#410002", "#f7dcd9", "#2c1513", "#fff8f7", "#f1e5e3", "#fcf0ee", "#ffdad6", "#410002",
    "#8c0009", "#4974a5", "#ffb700", "#c62828", "#c62828",
];

/// Named colour preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    /// Baseline preset; its palette is the default colour set
    #[default]
    Purple,
    Blue,
    Green,
    Orange,
    Red,
}

impl Theme {
    /// Every preset in catalog order
    pub const ALL: [Theme; 5] = [
        Theme::Purple,
        Theme::Blue,
        Theme::Green,
        Theme::Orange,
        Theme::Red,
    ];

    /// Catalog name, as carried in the `theme` query key
    pub fn name(self) -> &'static str {
        match self {
            Theme::Purple => "purple",
            Theme::Blue => "blue",
            Theme::Green => "green",
            Theme::Orange => "orange",
            Theme::Red => "red",
        }
    }

    /// Look up a preset by catalog name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.name() == name)
    }

    /// Colours defined by this preset
    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Purple => &PURPLE,
            Theme::Blue => &BLUE,
            Theme::Green => &GREEN,
            Theme::Orange => &ORANGE,
            Theme::Red => &RED,
        }
    }

    /// Whether this is the baseline preset
    pub fn is_baseline(self) -> bool {
        self == Theme::Purple
    }
}

/// Theme selector state: colours locked to a preset, or free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSelection {
    Preset(Theme),
    Custom,
}

impl ThemeSelection {
    /// Parse a catalog name or the `custom` sentinel
    pub fn parse(value: &str) -> Option<Self> {
        if value == CUSTOM_THEME {
            return Some(ThemeSelection::Custom);
        }
        Theme::from_name(value).map(ThemeSelection::Preset)
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemeSelection::Preset(theme) => theme.name(),
            ThemeSelection::Custom => CUSTOM_THEME,
        }
    }

    /// The active preset, if colours are locked
    pub fn preset(self) -> Option<Theme> {
        match self {
            ThemeSelection::Preset(theme) => Some(theme),
            ThemeSelection::Custom => None,
        }
    }

    pub fn is_custom(self) -> bool {
        matches!(self, ThemeSelection::Custom)
    }
}

impl Default for ThemeSelection {
    fn default() -> Self {
        ThemeSelection::Preset(Theme::default())
    }
}

impl fmt::Display for ThemeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ThemeSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_index_matches_catalog_order() {
        for (i, field) in ColorField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
            assert_eq!(
                ThemeSelection::parse(theme.name()),
                Some(ThemeSelection::Preset(theme))
            );
        }
        assert_eq!(ThemeSelection::parse("custom"), Some(ThemeSelection::Custom));
        assert_eq!(ThemeSelection::parse("teal"), None);
    }

    #[test]
    fn palettes_are_hex_colours() {
        for theme in Theme::ALL {
            for value in theme.palette() {
                assert_eq!(value.len(), 7, "{theme:?} has malformed colour {value}");
                assert!(value.starts_with('#'));
                assert!(value[1..].chars().all(|c| c.is_ascii_hexdigit()));
            }
        }
    }

    #[test]
    fn presets_differ_from_baseline() {
        for theme in Theme::ALL.into_iter().filter(|t| !t.is_baseline()) {
            assert_ne!(theme.palette(), Theme::Purple.palette());
        }
    }
}
