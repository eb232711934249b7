//! Configuration management for pw-toggle
//!
//! - **options**: the full option set a controller runs with (JSON, camelCase keys)
//! - **update**: partial updates applied by `update_config`

pub mod options;
pub mod update;

// Re-export commonly used types
pub use options::{ClassNames, Options, ToggleMode};
pub use update::OptionsUpdate;
