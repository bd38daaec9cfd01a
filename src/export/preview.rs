//! Preview - Frame URL Generation and Reload Scheduling
//!
//! Every regeneration tears the frame down before pointing it at the new
//! URL, so the embedded widget always starts as a fresh instance.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::QueryMap;
use crate::constants::{PREVIEW_ROUTE, PREVIEW_TOKEN_KEY};
use crate::domain::WidgetConfig;
use crate::export::{ExportOptions, exported_fields};
use crate::helpers::Debouncer;

// ==================== Viewport ====================

/// Width constraint applied to the preview frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportMode {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl ViewportMode {
    pub const ALL: [ViewportMode; 3] = [
        ViewportMode::Mobile,
        ViewportMode::Tablet,
        ViewportMode::Desktop,
    ];

    /// CSS max-width of the frame
    pub fn max_width(self) -> &'static str {
        match self {
            ViewportMode::Mobile => "375px",
            ViewportMode::Tablet => "768px",
            ViewportMode::Desktop => "100%",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewportMode::Mobile => "mobile",
            ViewportMode::Tablet => "tablet",
            ViewportMode::Desktop => "desktop",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }
}

impl fmt::Display for ViewportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==================== Generator ====================

/// Builds preview frame URLs with a strictly increasing cache-busting token
#[derive(Debug, Clone)]
pub struct PreviewGenerator {
    base_href: String,
    options: ExportOptions,
    last_token: u64,
}

impl PreviewGenerator {
    pub fn new(base_href: impl Into<String>, options: ExportOptions) -> Self {
        Self {
            base_href: base_href.into(),
            options,
            last_token: 0,
        }
    }

    /// Preview query without the token, keyed by preview names
    pub fn preview_query(&self, config: &WidgetConfig, defaults: &WidgetConfig) -> QueryMap {
        exported_fields(config, defaults, self.options)
            .into_iter()
            .filter_map(|(field, value)| Some((field.preview_key()?, value.to_param())))
            .collect()
    }

    /// Token derived from wall-clock milliseconds, bumped when the clock stalls
    pub fn next_token(&mut self, now_ms: u64) -> u64 {
        self.last_token = now_ms.max(self.last_token + 1);
        self.last_token
    }

    /// Full preview URL, stamped with a fresh token
    pub fn generate(&mut self, config: &WidgetConfig, defaults: &WidgetConfig, now_ms: u64) -> String {
        let mut query = self.preview_query(config, defaults);
        query.insert(PREVIEW_TOKEN_KEY, self.next_token(now_ms).to_string());
        format!("{}{}?{}", self.base_href, PREVIEW_ROUTE, query)
    }
}

fn wall_clock_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

// ==================== Scheduler ====================

/// Preview frame transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    /// Frame target removed
    Cleared,
    /// Frame pointed at a new URL
    Loaded(String),
}

/// Debounced clear-then-load sequencing of the preview frame
#[derive(Debug)]
pub struct PreviewScheduler {
    generator: PreviewGenerator,
    debouncer: Debouncer,
    reload_delay: Duration,
    pending: Option<(Instant, String)>,
    current: Option<String>,
    viewport: ViewportMode,
}

impl PreviewScheduler {
    pub fn new(generator: PreviewGenerator, debounce: Duration, reload_delay: Duration) -> Self {
        Self {
            generator,
            debouncer: Debouncer::new(debounce),
            reload_delay,
            pending: None,
            current: None,
            viewport: ViewportMode::default(),
        }
    }

    /// Configuration changed; reschedule regeneration
    pub fn on_change(&mut self, now: Instant) {
        self.debouncer.trigger(now);
    }

    /// Advance timers, returning the frame transitions that are due
    pub fn poll(&mut self, now: Instant, config: &WidgetConfig, defaults: &WidgetConfig) -> Vec<PreviewEvent> {
        let mut events = Vec::new();

        if self.debouncer.fire(now) {
            let url = self.generator.generate(config, defaults, wall_clock_ms());
            debug!(url = %url, "Regenerating preview");
            self.current = None;
            self.pending = Some((now + self.reload_delay, url));
            events.push(PreviewEvent::Cleared);
        }

        if let Some((_, url)) = self.pending.take_if(|(at, _)| now >= *at) {
            self.current = Some(url.clone());
            events.push(PreviewEvent::Loaded(url));
        }

        events
    }

    /// Earliest instant at which `poll` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let reload = self.pending.as_ref().map(|(at, _)| *at);
        match (self.debouncer.deadline(), reload) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop every scheduled transition
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
        self.pending = None;
    }

    /// URL the frame currently shows
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn viewport(&self) -> ViewportMode {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportMode) {
        self.viewport = viewport;
    }

    pub fn generator(&self) -> &PreviewGenerator {
        &self.generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColorField, FilterResource, IdSet, ThemeSelection};

    fn generator() -> PreviewGenerator {
        PreviewGenerator::new("./", ExportOptions::default())
    }

    #[test]
    fn preview_query_uses_widget_names() {
        let defaults = WidgetConfig::defaults();
        let mut config = WidgetConfig::default();
        config.filters.cities = IdSet::from([12, 7]);
        config.in_bbox = "1,2,3,4".into();
        config.content.touristic_events = true;
        config.theme = ThemeSelection::Custom;
        config.colors.set(ColorField::PrimaryContainer, "#000000");

        let query = generator().preview_query(&config, defaults);
        assert_eq!(query.get("api"), Some(defaults.api.as_str()));
        assert_eq!(query.get("languages"), Some("fr"));
        assert_eq!(query.get("cities"), Some("12,7"));
        assert_eq!(query.get("inBbox"), Some("1,2,3,4"));
        assert_eq!(query.get("touristicEvents"), Some("true"));
        assert_eq!(query.get("color-primary-container"), Some("#000000"));
        assert_eq!(query.get(FilterResource::City.query_key()), None);
        assert_eq!(query.get("theme"), None);
    }

    #[test]
    fn url_carries_route_and_token() {
        let defaults = WidgetConfig::defaults();
        let url = generator().generate(defaults, defaults, 1_700_000_000_000);
        assert!(url.starts_with("./#/preview?api=https%3A%2F%2F"));
        assert!(url.ends_with("&_v=1700000000000"));
    }

    #[test]
    fn token_is_strictly_increasing() {
        let mut generator = generator();
        assert_eq!(generator.next_token(100), 100);
        assert_eq!(generator.next_token(100), 101);
        assert_eq!(generator.next_token(50), 102);
        assert_eq!(generator.next_token(500), 500);
    }

    #[test]
    fn scheduler_clears_then_loads() {
        let defaults = WidgetConfig::defaults();
        let start = Instant::now();
        let mut scheduler = PreviewScheduler::new(
            generator(),
            Duration::from_millis(300),
            Duration::from_millis(10),
        );

        scheduler.on_change(start);
        scheduler.on_change(start + Duration::from_millis(100));
        assert!(scheduler.poll(start + Duration::from_millis(300), defaults, defaults).is_empty());

        let events = scheduler.poll(start + Duration::from_millis(400), defaults, defaults);
        assert_eq!(events, vec![PreviewEvent::Cleared]);
        assert_eq!(scheduler.current(), None);
        assert_eq!(
            scheduler.next_deadline(),
            Some(start + Duration::from_millis(410))
        );

        let events = scheduler.poll(start + Duration::from_millis(410), defaults, defaults);
        assert!(matches!(events.as_slice(), [PreviewEvent::Loaded(url)] if url.contains("#/preview?")));
        assert!(scheduler.current().is_some());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn zero_reload_delay_emits_both_in_order() {
        let defaults = WidgetConfig::defaults();
        let start = Instant::now();
        let mut scheduler = PreviewScheduler::new(generator(), Duration::ZERO, Duration::ZERO);
        scheduler.on_change(start);
        let events = scheduler.poll(start, defaults, defaults);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PreviewEvent::Cleared);
    }

    #[test]
    fn cancel_drops_pending_reload() {
        let defaults = WidgetConfig::defaults();
        let start = Instant::now();
        let mut scheduler = PreviewScheduler::new(generator(), Duration::ZERO, Duration::from_secs(1));
        scheduler.on_change(start);
        scheduler.poll(start, defaults, defaults);
        scheduler.cancel();
        assert!(scheduler.poll(start + Duration::from_secs(2), defaults, defaults).is_empty());
    }

    #[test]
    fn viewport_widths() {
        assert_eq!(ViewportMode::Mobile.max_width(), "375px");
        assert_eq!(ViewportMode::Tablet.max_width(), "768px");
        assert_eq!(ViewportMode::default().max_width(), "100%");
        assert_eq!(ViewportMode::parse("tablet"), Some(ViewportMode::Tablet));
    }
}
