//! Runtime-mutable capture settings
//!
//! Settings are loaded once at startup, replaced or merged through the
//! controller's settings endpoint, and rewritten atomically after every
//! accepted update.

mod model;
mod store;

pub use model::{Settings, SettingsPatch};
pub use store::SettingsStore;
