//! Helper Utilities
//!
//! Common utilities used across the application.

mod debounce;
mod fs;
mod html;

pub use debounce::*;
pub use fs::*;
pub use html::*;
