//! Service Layer
//!
//! External collaborators of the editing session and the async runtime
//! they run on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      OptionCatalog                          │
//! │  ┌───────────────┐  ┌─────────────┐  ┌──────────────────┐   │
//! │  │ GeotrekClient │  │  Debouncer  │  │  fetch tasks     │   │
//! │  │ (HTTP lists)  │  │  (API edit) │  │  (per resource)  │   │
//! │  └───────────────┘  └─────────────┘  └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼ OptionsUpdate
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Session loop                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod options;
mod runtime;

pub use options::*;
pub use runtime::*;
