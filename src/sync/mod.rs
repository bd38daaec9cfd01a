//! URL Synchronizer
//!
//! Keeps the configuration store and the page query mutually consistent
//! without the two directions re-triggering each other.
//!
//! ```text
//!  navigation ──decode──▶ store.merge(Navigation) ──▶ SuppressNextOutbound
//!  user edit ──▶ debounce ──encode──▶ replace_query ──▶ SuppressNextInbound
//! ```

mod location;

pub use location::{Location, MemoryLocation};

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::codec::{QueryMap, decode, encode};
use crate::error::Result;
use crate::helpers::Debouncer;
use crate::state::{ChangeOrigin, ConfigChange, ConfigPatch, ConfigStore};

/// Echo-avoidance state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// The next inbound event is our own URL write
    SuppressNextInbound,
    /// The next store change is the navigation we just applied
    SuppressNextOutbound,
}

/// Result of processing an inbound URL change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Echo of our own write
    Suppressed,
    /// Decoded record already matches the store
    Unchanged,
    Applied(ConfigChange),
}

/// Result of processing a store change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundOutcome {
    /// Change came from navigation, nothing to write
    Suppressed,
    /// Write scheduled behind the debounce timer
    Scheduled,
    Written(QueryMap),
}

/// Bidirectional store <-> URL synchronizer
pub struct UrlSynchronizer<L: Location> {
    location: L,
    state: SyncState,
    last_written: Option<QueryMap>,
    debouncer: Debouncer,
}

impl<L: Location> UrlSynchronizer<L> {
    pub fn new(location: L, debounce: Duration) -> Self {
        Self {
            location,
            state: SyncState::Idle,
            last_written: None,
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Initial load: decode the current query into the store
    pub fn load(&mut self, store: &mut ConfigStore) -> Result<InboundOutcome> {
        self.state = SyncState::Idle;
        self.on_navigation(store)
    }

    /// Inbound path: the page query changed
    pub fn on_navigation(&mut self, store: &mut ConfigStore) -> Result<InboundOutcome> {
        let query = self.location.query();

        if self.state == SyncState::SuppressNextInbound {
            self.state = SyncState::Idle;
            if self.last_written.as_ref() == Some(&query) {
                debug!(query = %query, "Suppressed echo of own URL write");
                return Ok(InboundOutcome::Suppressed);
            }
        }

        let decoded = decode(&query, store.defaults());
        if &decoded == store.get() {
            return Ok(InboundOutcome::Unchanged);
        }

        match store.merge(ConfigPatch::from_config(&decoded), ChangeOrigin::Navigation)? {
            Some(change) => {
                // A pending user write would overwrite the navigated state
                self.debouncer.cancel();
                self.state = SyncState::SuppressNextOutbound;
                info!(revision = change.revision, fields = change.fields.len(), "Applied configuration from URL");
                Ok(InboundOutcome::Applied(change))
            }
            None => Ok(InboundOutcome::Unchanged),
        }
    }

    /// Outbound path: the store announced a change
    pub fn on_store_change(
        &mut self,
        change: &ConfigChange,
        store: &mut ConfigStore,
        now: Instant,
    ) -> OutboundOutcome {
        match change.origin {
            ChangeOrigin::Navigation => {
                if self.state == SyncState::SuppressNextOutbound {
                    self.state = SyncState::Idle;
                }
                debug!(revision = change.revision, "Navigation change not written back");
                OutboundOutcome::Suppressed
            }
            ChangeOrigin::Reset if store.take_skip_next_sync() => {
                self.debouncer.cancel();
                let query = encode(store.get(), store.defaults());
                self.write(query.clone());
                OutboundOutcome::Written(query)
            }
            ChangeOrigin::Reset | ChangeOrigin::User => {
                // A newer edit supersedes the last write; no echo of it is awaited
                if self.state == SyncState::SuppressNextInbound {
                    self.state = SyncState::Idle;
                }
                self.debouncer.trigger(now);
                OutboundOutcome::Scheduled
            }
        }
    }

    /// Fire the debounced write if its deadline has passed
    pub fn poll(&mut self, store: &ConfigStore, now: Instant) -> Option<QueryMap> {
        if !self.debouncer.fire(now) {
            return None;
        }
        let query = encode(store.get(), store.defaults());
        self.write(query.clone()).then_some(query)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Drop any pending write
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    fn write(&mut self, query: QueryMap) -> bool {
        if self.location.query() == query {
            debug!("URL already up to date");
            return false;
        }
        info!(query = %query, "Replacing URL query");
        self.location.replace_query(&query);
        self.last_written = Some(query);
        self.state = SyncState::SuppressNextInbound;
        true
    }
}
