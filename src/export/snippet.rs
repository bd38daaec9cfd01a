//! Snippet - Embed Code Generation

use std::fmt::Write as _;

use crate::constants::{WIDGET_BUNDLE, WIDGET_TAG};
use crate::domain::WidgetConfig;
use crate::export::{ExportOptions, exported_fields};
use crate::helpers::escape_attribute;

/// Renders the paste-ready embed document for a configuration
#[derive(Debug, Clone)]
pub struct SnippetGenerator {
    asset_base: String,
    options: ExportOptions,
}

impl SnippetGenerator {
    pub fn new(asset_base: impl Into<String>, options: ExportOptions) -> Self {
        Self {
            asset_base: asset_base.into().trim_end_matches('/').to_string(),
            options,
        }
    }

    /// Widget attributes, kebab-case names and raw values
    pub fn attributes(&self, config: &WidgetConfig, defaults: &WidgetConfig) -> Vec<(&'static str, String)> {
        exported_fields(config, defaults, self.options)
            .into_iter()
            .filter_map(|(field, value)| Some((field.attribute_name()?, value.to_param())))
            .collect()
    }

    /// Full snippet: dependency tags then the widget element, one attribute per line
    pub fn render(&self, config: &WidgetConfig, defaults: &WidgetConfig) -> String {
        let base = &self.asset_base;
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "<!-- Geotrek Rando Widget Dependencies -->");
        let _ = writeln!(out, r#"<link rel="stylesheet" href="{base}/{WIDGET_BUNDLE}.css" />"#);
        let _ = writeln!(
            out,
            r#"<script type="module" src="{base}/{WIDGET_BUNDLE}.esm.js"></script>"#
        );
        let _ = writeln!(out, r#"<script nomodule src="{base}/{WIDGET_BUNDLE}.js"></script>"#);
        let _ = writeln!(out);
        let _ = writeln!(out, "<!-- Widget Container -->");
        let _ = writeln!(out, "<{WIDGET_TAG}");
        for (name, value) in self.attributes(config, defaults) {
            let _ = writeln!(out, r#"  {name}="{}""#, escape_attribute(&value));
        }
        let _ = write!(out, "></{WIDGET_TAG}>");
        out
    }
}
