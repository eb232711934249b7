//! Toggle button icons
//!
//! The markup is opaque to the rest of the crate: it is copied verbatim into
//! the button when the field's visibility changes.

/// Supplies the default open/closed icon markup
pub trait IconProvider {
    /// Shown while the field is visible
    fn open(&self) -> &str;
    /// Shown while the field is hidden
    fn closed(&self) -> &str;
}

pub const EYE_OPEN: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M1 12s4-8 11-8 11 8 11 8-4 8-11 8-11-8-11-8z"></path><circle cx="12" cy="12" r="3"></circle></svg>"#;

pub const EYE_CLOSED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M17.94 17.94A10.07 10.07 0 0 1 12 20c-7 0-11-8-11-8a18.45 18.45 0 0 1 5.06-5.94M9.9 4.24A9.12 9.12 0 0 1 12 4c7 0 11 8 11 8a18.5 18.5 0 0 1-2.16 3.19m-6.72-1.07a3 3 0 1 1-4.24-4.24"></path><line x1="1" y1="1" x2="23" y2="23"></line></svg>"#;

/// Feather-style eye icons
#[derive(Debug, Clone, Copy, Default)]
pub struct EyeIcons;

impl IconProvider for EyeIcons {
    fn open(&self) -> &str {
        EYE_OPEN
    }

    fn closed(&self) -> &str {
        EYE_CLOSED
    }
}

/// Icon pair resolved from options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSet {
    pub open: String,
    pub closed: String,
}

impl IconSet {
    pub fn from_provider(provider: &dyn IconProvider) -> Self {
        Self {
            open: provider.open().to_string(),
            closed: provider.closed().to_string(),
        }
    }
}

impl IconProvider for IconSet {
    fn open(&self) -> &str {
        &self.open
    }

    fn closed(&self) -> &str {
        &self.closed
    }
}
