//! Domain - Pure Data Structures
//!
//! Configuration record, field vocabulary, theme catalog and filter
//! resources. Nothing here performs I/O.

pub mod config;
pub mod fields;
pub mod resource;
pub mod theme;

pub use config::*;
pub use fields::*;
pub use resource::*;
pub use theme::*;
