//! Application-wide constants
//!
//! This module contains the default option values and the fixed names used
//! throughout the crate, providing a single source of truth for them.

/// Default option values
pub mod defaults {
    /// Shortcut that toggles visibility
    pub const KEY_COMBO: &str = "ctrl+8";

    /// Shortcut on macOS
    pub const KEY_COMBO_MAC: &str = "meta+8";

    /// Marker attribute that opts a field into management
    pub const TOGGLE_ATTRIBUTE: &str = "data-pw-toggle";

    /// CSS class of the injected toggle button
    pub const BUTTON_CLASS: &str = "pw-toggle-btn";

    /// CSS class set on the button while its field is visible
    pub const ACTIVE_CLASS: &str = "active";

    /// CSS class of the wrapper container around a field
    pub const WRAPPER_CLASS: &str = "pw-toggle-wrapper";

    /// CSS class of the tooltip element
    pub const TOOLTIP_CLASS: &str = "pw-toggle-tooltip";
}

/// Field and accessibility attribute names
pub mod attrs {
    pub const TYPE: &str = "type";
    pub const ID: &str = "id";
    pub const ROLE: &str = "role";
    pub const ARIA_LABEL: &str = "aria-label";
    pub const ARIA_PRESSED: &str = "aria-pressed";

    /// Label used when a field carries no aria-label of its own
    pub const FALLBACK_LABEL: &str = "Password";
}

/// Input kinds
pub mod kinds {
    pub const PASSWORD: &str = "password";
    pub const TEXT: &str = "text";
}

/// Domain event constants
pub mod events {
    /// Name of the bubbling notification dispatched from a toggled field
    pub const PASSWORD_TOGGLE: &str = "passwordToggle";

    /// Field name reported when the toggled element has no id
    pub const ANONYMOUS_FIELD: &str = "anonymous";
}

/// Injected style block constants
pub mod style {
    /// Stable element id guarding against duplicate style blocks
    pub const STYLE_ELEMENT_ID: &str = "pw-toggle-styles";

    /// Attribute counting the controllers sharing the style block
    pub const REFCOUNT_ATTRIBUTE: &str = "data-pw-toggle-users";
}

/// Options file location
pub mod config {
    /// Directory name under the platform config dir
    pub const APP_DIR: &str = "pw-toggle";

    /// Options filename
    pub const FILENAME: &str = "options.json";
}
