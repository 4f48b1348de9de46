//! Project-level settings.

pub mod settings;

pub use settings::Settings;
