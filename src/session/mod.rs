//! Editing Session
//!
//! Wires the store, the URL synchronizer, the preview scheduler and the
//! option catalog behind one command channel. Commands are handled one at a
//! time; timers fire between them.
//!
//! ## Event flow
//!
//! ```text
//! SessionCommand ──▶ ConfigStore::merge ──▶ ConfigChange
//!                                              │
//!        ┌─────────────────────┬───────────────┼──────────────────┐
//!        ▼                     ▼               ▼                  ▼
//!  UrlSynchronizer      PreviewScheduler   OptionCatalog     SessionEvent
//!  (debounced write)    (clear, reload)    (api changed)     (crossbeam)
//! ```

use std::str::FromStr;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::codec::QueryMap;
use crate::domain::{ColorField, ConfigField, FieldValue, FilterResource, ThemeSelection, WidgetConfig};
use crate::error::{Error, Result};
use crate::export::{PreviewEvent, PreviewGenerator, PreviewScheduler, ViewportMode};
use crate::services::{OptionCatalog, OptionSource};
use crate::settings::ConfiguratorSettings;
use crate::state::{ChangeOrigin, ConfigChange, ConfigPatch, ConfigStore};
use crate::sync::{InboundOutcome, Location, MemoryLocation, OutboundOutcome, UrlSynchronizer};

/// Input of the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// User edit of one or more fields
    Edit(ConfigPatch),
    SelectTheme(ThemeSelection),
    EditColor(ColorField, String),
    /// Navigate to a new query, like opening a shared link
    Navigate(QueryMap),
    /// Step back one history entry
    Back,
    Reset,
    SetViewport(ViewportMode),
    Shutdown,
}

/// Line syntax of the interactive front end:
/// `set <query key> <value>`, `theme <name>`, `color <query key> <value>`,
/// `open <query or link>`, `back`, `reset`, `viewport <mode>`, `quit`.
impl FromStr for SessionCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (verb, rest) = split_word(line.trim());
        match verb {
            "set" => {
                let (key, raw) = split_word(rest);
                let field = ConfigField::from_query_key(key).ok_or_else(|| Error::UnknownField {
                    name: key.to_string(),
                })?;
                let value = field.kind().parse(raw).ok_or(Error::FieldType {
                    field: field.query_key(),
                    expected: field.kind().name(),
                })?;
                Ok(SessionCommand::Edit(ConfigPatch::new().with(field, value)))
            }
            "theme" => ThemeSelection::parse(rest)
                .map(SessionCommand::SelectTheme)
                .ok_or_else(|| Error::Invalid {
                    message: format!("unknown theme '{rest}'"),
                }),
            "color" => {
                let (key, value) = split_word(rest);
                match ConfigField::from_query_key(key) {
                    Some(ConfigField::Color(color)) => Ok(SessionCommand::EditColor(color, value.to_string())),
                    _ => Err(Error::UnknownField { name: key.to_string() }),
                }
            }
            "open" => {
                let query = rest.split_once('?').map_or(rest, |(_, query)| query);
                Ok(SessionCommand::Navigate(QueryMap::parse(query)))
            }
            "back" => Ok(SessionCommand::Back),
            "reset" => Ok(SessionCommand::Reset),
            "viewport" => ViewportMode::parse(rest)
                .map(SessionCommand::SetViewport)
                .ok_or_else(|| Error::Invalid {
                    message: format!("unknown viewport '{rest}'"),
                }),
            "quit" | "exit" => Ok(SessionCommand::Shutdown),
            _ => Err(Error::Invalid {
                message: format!("unknown command '{verb}'"),
            }),
        }
    }
}

fn split_word(text: &str) -> (&str, &str) {
    text.split_once(char::is_whitespace)
        .map_or((text, ""), |(word, rest)| (word, rest.trim()))
}

/// Output of the session loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConfigChanged(ConfigChange),
    UrlReplaced(QueryMap),
    PreviewCleared,
    PreviewLoaded(String),
    OptionsUpdated(FilterResource),
    /// An edit was rejected; the store is unchanged
    ValidationFailed(String),
}

/// Channel pair for driving a session from another task
pub fn command_channel() -> (
    mpsc::UnboundedSender<SessionCommand>,
    mpsc::UnboundedReceiver<SessionCommand>,
) {
    mpsc::unbounded_channel()
}

/// Current instant on tokio's clock, so paused-time tests drive the timers
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => futures::future::pending().await,
    }
}

/// One configurator editing session
pub struct Session<S: OptionSource> {
    store: ConfigStore,
    sync: UrlSynchronizer<MemoryLocation>,
    preview: PreviewScheduler,
    catalog: OptionCatalog<S>,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
}

impl<S: OptionSource> Session<S> {
    /// Session over the built-in default table
    pub fn new(settings: &ConfiguratorSettings, source: S, initial: QueryMap) -> Self {
        Self::with_defaults(WidgetConfig::default(), settings, source, initial)
    }

    pub fn with_defaults(
        defaults: WidgetConfig,
        settings: &ConfiguratorSettings,
        source: S,
        initial: QueryMap,
    ) -> Self {
        let timing = &settings.timing;
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            store: ConfigStore::new(defaults),
            sync: UrlSynchronizer::new(MemoryLocation::new(initial), timing.sync_debounce()),
            preview: PreviewScheduler::new(
                PreviewGenerator::new(settings.preview_base_href.clone(), settings.export),
                timing.preview_debounce(),
                timing.preview_reload_delay(),
            ),
            catalog: OptionCatalog::new(source, timing.options_debounce()),
            tx,
            rx,
        }
    }

    /// Receiver for session events
    ///
    /// Every receiver clone competes for the same events.
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.rx.clone()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn location(&self) -> &MemoryLocation {
        self.sync.location()
    }

    pub fn preview(&self) -> &PreviewScheduler {
        &self.preview
    }

    pub fn catalog(&self) -> &OptionCatalog<S> {
        &self.catalog
    }

    /// Process commands until `Shutdown` or until every sender is dropped
    pub async fn run(&mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) -> Result<()> {
        self.start()?;

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command, now()),
                },
                Some(update) = self.catalog.next_update() => {
                    let resource = update.resource;
                    if self.catalog.apply(update) {
                        self.emit(SessionEvent::OptionsUpdated(resource));
                    }
                }
                () = wait_until(deadline) => self.fire_timers(now()),
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Initial load of the page query, then the first preview and option fetch
    pub fn start(&mut self) -> Result<()> {
        let now = now();
        if let InboundOutcome::Applied(change) = self.sync.load(&mut self.store)? {
            self.handle_change(change, now);
        }
        self.preview.on_change(now);
        let api = self.store.get().api.clone();
        self.catalog.request(&api, now);
        info!(query = %self.sync.location().query(), "Session started");
        Ok(())
    }

    /// Cancel every timer and in-flight fetch
    pub fn shutdown(&mut self) {
        self.sync.cancel();
        self.preview.cancel();
        self.catalog.shutdown();
        info!(revision = self.store.revision(), "Session stopped");
    }

    fn handle(&mut self, command: SessionCommand, now: Instant) {
        debug!(?command, "Handling session command");
        let result = match command {
            SessionCommand::Edit(patch) => self.store.merge(patch, ChangeOrigin::User),
            SessionCommand::SelectTheme(selection) => self.store.merge(
                ConfigPatch::new().with(ConfigField::Theme, FieldValue::Theme(selection)),
                ChangeOrigin::User,
            ),
            SessionCommand::EditColor(color, value) => self.store.merge(
                ConfigPatch::new().with(ConfigField::Color(color), FieldValue::Text(value)),
                ChangeOrigin::User,
            ),
            SessionCommand::Navigate(query) => {
                self.sync.location_mut().navigate(query);
                self.on_navigation()
            }
            SessionCommand::Back => {
                if !self.sync.location_mut().back() {
                    debug!("Already at the start of history");
                    return;
                }
                self.on_navigation()
            }
            SessionCommand::Reset => Ok(Some(self.store.reset())),
            SessionCommand::SetViewport(viewport) => {
                info!(%viewport, "Preview viewport changed");
                self.preview.set_viewport(viewport);
                return;
            }
            SessionCommand::Shutdown => return,
        };

        match result {
            Ok(Some(change)) => self.handle_change(change, now),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Edit rejected");
                self.emit(SessionEvent::ValidationFailed(e.to_string()));
            }
        }
    }

    fn on_navigation(&mut self) -> Result<Option<ConfigChange>> {
        match self.sync.on_navigation(&mut self.store)? {
            InboundOutcome::Applied(change) => Ok(Some(change)),
            InboundOutcome::Suppressed | InboundOutcome::Unchanged => Ok(None),
        }
    }

    fn handle_change(&mut self, change: ConfigChange, now: Instant) {
        let written = match self.sync.on_store_change(&change, &mut self.store, now) {
            OutboundOutcome::Written(query) => Some(query),
            OutboundOutcome::Scheduled | OutboundOutcome::Suppressed => None,
        };
        self.preview.on_change(now);
        if change.touches(ConfigField::Api) {
            self.catalog.request(&change.snapshot.api, now);
        }

        self.emit(SessionEvent::ConfigChanged(change));
        if let Some(query) = written {
            self.emit(SessionEvent::UrlReplaced(query));
        }
    }

    fn fire_timers(&mut self, now: Instant) {
        if let Some(query) = self.sync.poll(&self.store, now) {
            self.emit(SessionEvent::UrlReplaced(query));
        }
        for event in self.preview.poll(now, self.store.get(), self.store.defaults()) {
            self.emit(match event {
                PreviewEvent::Cleared => SessionEvent::PreviewCleared,
                PreviewEvent::Loaded(url) => SessionEvent::PreviewLoaded(url),
            });
        }
        self.catalog.poll(now);
    }

    fn next_deadline(&self) -> Option<Instant> {
        [
            self.sync.next_deadline(),
            self.preview.next_deadline(),
            self.catalog.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn emit(&self, event: SessionEvent) {
        // The session holds a receiver, so the channel never disconnects
        let _ = self.tx.send(event);
    }
}
