//! State Management
//!
//! The configuration store and the theme transitions it applies to user edits.

pub mod store;
pub mod theme;

pub use store::{ChangeOrigin, ConfigChange, ConfigPatch, ConfigStore};
pub use theme::ThemeResolver;
