#![forbid(unsafe_code)]
//! Password visibility toggling for a headless element tree.
//!
//! Marked password inputs get a wrapper, an optional eye button and a
//! shortcut tooltip. A keyboard shortcut or the button flips them between
//! hidden and visible, and every flip is announced with a bubbling
//! `passwordToggle` event.

pub mod config;
pub mod constants;
pub mod decoration;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod icons;
pub mod key_combo;
pub mod registry;
mod router;
pub mod script;
pub mod style;
pub mod toggle;
pub mod visibility;

pub use config::{ClassNames, Options, OptionsUpdate, ToggleMode};
pub use dom::{Document, ElementId, Event, EventKind, KeyboardEvent, ListenerTarget};
pub use error::{Result, ToggleError};
pub use key_combo::{KeyDescriptor, Modifier, Platform};
pub use registry::{FieldKind, FieldState, Visibility};
pub use toggle::PasswordToggle;
pub use visibility::{ToggleEvent, ToggleTarget};
