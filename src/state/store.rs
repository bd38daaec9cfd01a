//! Configuration State Store
//!
//! Owns the authoritative configuration. Every mutation goes through
//! [`ConfigStore::merge`] or [`ConfigStore::reset`], and each accepted change
//! is announced exactly once to every subscriber.

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::domain::{ConfigField, FieldValue, WidgetConfig, is_valid_api_url};
use crate::error::{Error, Result};
use crate::state::ThemeResolver;

/// Who produced a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Form edit; derived-field rules apply
    User,
    /// Decoded from an inbound URL; applied verbatim
    Navigation,
    /// Restore of the default table
    Reset,
}

/// Partial edit: an ordered list of field assignments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch(Vec<(ConfigField, FieldValue)>);

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment
    pub fn with(mut self, field: ConfigField, value: FieldValue) -> Self {
        self.push(field, value);
        self
    }

    pub fn push(&mut self, field: ConfigField, value: FieldValue) {
        self.0.push((field, value));
    }

    /// Patch assigning every field of a full record
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self(
            ConfigField::all()
                .map(|field| (field, config.get(field)))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ConfigField, FieldValue)> {
        self.0.iter()
    }
}

impl IntoIterator for ConfigPatch {
    type Item = (ConfigField, FieldValue);
    type IntoIter = std::vec::IntoIter<(ConfigField, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Notification sent after an accepted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    /// Monotonic change counter
    pub revision: u64,
    pub origin: ChangeOrigin,
    /// Fields whose value differs from the previous snapshot
    pub fields: Vec<ConfigField>,
    pub snapshot: WidgetConfig,
}

impl ConfigChange {
    pub fn touches(&self, field: ConfigField) -> bool {
        self.fields.contains(&field)
    }
}

/// Authoritative in-memory configuration
pub struct ConfigStore {
    config: WidgetConfig,
    defaults: WidgetConfig,
    revision: u64,
    skip_next_sync: bool,
    subscribers: Vec<Sender<ConfigChange>>,
}

impl ConfigStore {
    /// Start from the default table
    pub fn new(defaults: WidgetConfig) -> Self {
        Self::with_config(defaults.clone(), defaults)
    }

    /// Start from an already decoded record
    pub fn with_config(config: WidgetConfig, defaults: WidgetConfig) -> Self {
        Self {
            config,
            defaults,
            revision: 0,
            skip_next_sync: false,
            subscribers: Vec::new(),
        }
    }

    /// Current snapshot
    pub fn get(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn defaults(&self) -> &WidgetConfig {
        &self.defaults
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a change listener
    pub fn subscribe(&mut self) -> Receiver<ConfigChange> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Apply a partial edit.
    ///
    /// User edits are validated first: an invalid API URL rejects the whole
    /// patch and leaves the record untouched. Returns the change that was
    /// announced, or `None` when the record did not change.
    pub fn merge(&mut self, patch: ConfigPatch, origin: ChangeOrigin) -> Result<Option<ConfigChange>> {
        let mut next = self.config.clone();
        for (field, value) in patch {
            if value.kind() != field.kind() {
                return Err(Error::FieldType {
                    field: field.query_key(),
                    expected: field.kind().name(),
                });
            }
            match origin {
                ChangeOrigin::User => apply_user_edit(&mut next, field, value)?,
                ChangeOrigin::Navigation | ChangeOrigin::Reset => next.set(field, value)?,
            }
        }
        Ok(self.commit(next, origin, false))
    }

    /// Restore the default table and arm the one-shot sync skip flag.
    ///
    /// Always announces a change so listeners can drop stale query keys.
    pub fn reset(&mut self) -> ConfigChange {
        info!("Resetting configuration to defaults");
        self.skip_next_sync = true;
        let defaults = self.defaults.clone();
        // Forced commit always yields a change
        self.commit(defaults, ChangeOrigin::Reset, true)
            .unwrap_or_else(|| self.change(ChangeOrigin::Reset, Vec::new()))
    }

    /// Consume the flag armed by [`reset`](Self::reset)
    pub fn take_skip_next_sync(&mut self) -> bool {
        std::mem::take(&mut self.skip_next_sync)
    }

    fn commit(&mut self, next: WidgetConfig, origin: ChangeOrigin, force: bool) -> Option<ConfigChange> {
        let fields: Vec<ConfigField> = ConfigField::all()
            .filter(|field| self.config.get(*field) != next.get(*field))
            .collect();
        if fields.is_empty() && !force {
            debug!(?origin, "Merge produced no change");
            return None;
        }

        self.config = next;
        self.revision += 1;
        let change = self.change(origin, fields);
        self.subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
        debug!(revision = change.revision, ?origin, fields = change.fields.len(), "Configuration changed");
        Some(change)
    }

    fn change(&self, origin: ChangeOrigin, fields: Vec<ConfigField>) -> ConfigChange {
        ConfigChange {
            revision: self.revision,
            origin,
            fields,
            snapshot: self.config.clone(),
        }
    }
}

fn apply_user_edit(config: &mut WidgetConfig, field: ConfigField, value: FieldValue) -> Result<()> {
    match (field, value) {
        (ConfigField::Api, FieldValue::Text(url)) => {
            let url = url.trim();
            if !is_valid_api_url(url) {
                return Err(Error::InvalidApiUrl { url: url.to_string() });
            }
            if url != config.api {
                info!(api = url, "API changed, clearing filters");
                config.api = url.to_string();
                config.filters.clear();
                config.in_bbox.clear();
            }
            Ok(())
        }
        (ConfigField::Theme, FieldValue::Theme(selection)) => {
            ThemeResolver::select_theme(config, selection);
            Ok(())
        }
        (ConfigField::Color(color), FieldValue::Text(value)) => {
            ThemeResolver::edit_color(config, color, value);
            Ok(())
        }
        (field, value) => config.set(field, value),
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorField, FilterResource, IdSet, Theme, ThemeSelection};

    fn ids(field: FilterResource, set: IdSet) -> (ConfigField, FieldValue) {
        (ConfigField::Filter(field), FieldValue::Ids(set))
    }

    fn patch(items: impl IntoIterator<Item = (ConfigField, FieldValue)>) -> ConfigPatch {
        let mut patch = ConfigPatch::new();
        for (field, value) in items {
            patch.push(field, value);
        }
        patch
    }

    #[test]
    fn merge_notifies_once_per_call() {
        let mut store = ConfigStore::default();
        let rx = store.subscribe();

        let change = store
            .merge(
                patch([
                    (ConfigField::Treks, FieldValue::Flag(false)),
                    (ConfigField::Outdoor, FieldValue::Flag(true)),
                ]),
                ChangeOrigin::User,
            )
            .expect("valid patch")
            .expect("record changed");

        assert_eq!(change.fields, vec![ConfigField::Treks, ConfigField::Outdoor]);
        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn no_op_merge_is_silent() {
        let mut store = ConfigStore::default();
        let rx = store.subscribe();
        let change = store
            .merge(
                ConfigPatch::new().with(ConfigField::Rounded, FieldValue::Flag(true)),
                ChangeOrigin::User,
            )
            .expect("valid patch");
        assert!(change.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn api_change_clears_filters_and_bbox() {
        let mut store = ConfigStore::default();
        store
            .merge(
                patch([
                    ids(FilterResource::District, IdSet::from([1, 2, 3])),
                    ids(FilterResource::Label, IdSet::from([7])),
                    (ConfigField::InBbox, FieldValue::Text("1,2,3,4".into())),
                ]),
                ChangeOrigin::User,
            )
            .expect("valid patch");

        store
            .merge(
                ConfigPatch::new().with(
                    ConfigField::Api,
                    FieldValue::Text(" https://other.example/api/v2/ ".into()),
                ),
                ChangeOrigin::User,
            )
            .expect("valid api");

        let config = store.get();
        assert_eq!(config.api, "https://other.example/api/v2/");
        assert!(config.filters.is_empty());
        assert_eq!(config.in_bbox, "");
    }

    #[test]
    fn invalid_api_rejects_whole_patch() {
        let mut store = ConfigStore::default();
        let err = store
            .merge(
                patch([
                    (ConfigField::Treks, FieldValue::Flag(false)),
                    (ConfigField::Api, FieldValue::Text("https://x/api/v1/".into())),
                ]),
                ChangeOrigin::User,
            )
            .expect_err("invalid api");

        assert!(matches!(err, Error::InvalidApiUrl { .. }));
        assert_eq!(store.get(), WidgetConfig::defaults());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn user_colour_edit_detaches_theme() {
        let mut store = ConfigStore::default();
        let change = store
            .merge(
                ConfigPatch::new().with(
                    ConfigField::Color(ColorField::Primary),
                    FieldValue::Text("#000000".into()),
                ),
                ChangeOrigin::User,
            )
            .expect("valid patch")
            .expect("changed");

        assert_eq!(store.get().theme, ThemeSelection::Custom);
        assert!(change.touches(ConfigField::Theme));
        assert!(change.touches(ConfigField::Color(ColorField::Primary)));
    }

    #[test]
    fn navigation_applies_verbatim() {
        let mut store = ConfigStore::default();
        let mut target = WidgetConfig::default();
        target.api = "https://other.example/api/v2/".into();
        target.filters.districts = IdSet::from([4]);
        target.theme = ThemeSelection::Preset(Theme::Green);
        target.colors = crate::domain::ColorSet::from_palette(Theme::Green.palette());

        store
            .merge(ConfigPatch::from_config(&target), ChangeOrigin::Navigation)
            .expect("navigation patch");

        assert_eq!(store.get(), &target);
    }

    #[test]
    fn reset_restores_defaults_and_arms_skip() {
        let mut store = ConfigStore::default();
        store
            .merge(
                ConfigPatch::new().with(ConfigField::Theme, FieldValue::Theme(ThemeSelection::Preset(Theme::Red))),
                ChangeOrigin::User,
            )
            .expect("valid patch");

        let rx = store.subscribe();
        let change = store.reset();
        assert_eq!(change.origin, ChangeOrigin::Reset);
        assert_eq!(store.get(), WidgetConfig::defaults());
        assert_eq!(rx.try_iter().count(), 1);
        assert!(store.take_skip_next_sync());
        assert!(!store.take_skip_next_sync());
    }

    #[test]
    fn reset_of_pristine_store_still_notifies() {
        let mut store = ConfigStore::default();
        let rx = store.subscribe();
        let change = store.reset();
        assert!(change.fields.is_empty());
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn mismatched_value_kind_is_rejected() {
        let mut store = ConfigStore::default();
        let err = store
            .merge(
                ConfigPatch::new().with(ConfigField::Treks, FieldValue::Size(3)),
                ChangeOrigin::Navigation,
            )
            .expect_err("kind mismatch");
        assert!(matches!(err, Error::FieldType { field: "treks", .. }));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut store = ConfigStore::default();
        drop(store.subscribe());
        let kept = store.subscribe();
        store
            .merge(
                ConfigPatch::new().with(ConfigField::Outdoor, FieldValue::Flag(true)),
                ChangeOrigin::User,
            )
            .expect("valid patch");
        assert_eq!(kept.try_iter().count(), 1);
        assert_eq!(store.subscribers.len(), 1);
    }
}
