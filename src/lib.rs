pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod types;

// Catalog loading
pub mod inline;
pub mod loader;
pub mod render;
pub mod slot;
pub mod source;

// Producing the catalog
pub mod forum;
pub mod store;

pub use loader::{CatalogLoader, LoadMode, LoadOutcome};
pub use render::{RenderHook, RenderHookSlot};
pub use slot::{ProblemsSlot, PROBLEMS};
pub use types::{Catalog, ProblemRecord};
