//! Rando Widget Configurator Library
//!
//! Configuration state sync engine for the Geotrek rando widget
//! configurator: the configuration record and its query-string codec, the
//! state store, URL synchronization, theme resolution, and the preview and
//! embed snippet generators.

pub mod codec;
pub mod constants;
pub mod domain;
pub mod error;
pub mod export;
pub mod helpers;
pub mod i18n;
pub mod logging;
pub mod services;
pub mod session;
pub mod settings;
pub mod state;
pub mod sync;
