//! Error types for pw-toggle

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, ToggleError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToggleError {
    /// Key combo is not `<modifier>+<key>`
    #[error("invalid key combo '{0}': expected exactly one '+' between a modifier and a key")]
    InvalidFormat(String),

    /// Left-hand token of the combo names no known modifier
    #[error("unsupported modifier '{modifier}' in key combo '{combo}'")]
    UnsupportedModifier { combo: String, modifier: String },

    /// Marker attribute found on an element that is not a text or password input.
    /// Reported as a diagnostic, never returned from public operations.
    #[error("field '{field}' has kind '{kind}', expected password or text")]
    InvalidFieldKind { field: String, kind: String },

    /// Controller was called from inside one of its own notifications
    #[error("controller is busy handling another toggle")]
    Reentrant,
}

impl ToggleError {
    /// Check if this error came from parsing a key combo
    pub fn is_key_combo_error(&self) -> bool {
        matches!(
            self,
            ToggleError::InvalidFormat(_) | ToggleError::UnsupportedModifier { .. }
        )
    }
}
