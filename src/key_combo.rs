//! Key combo parsing
//!
//! Turns a textual shortcut like `ctrl+8` into a [`KeyDescriptor`] that can be
//! matched against keydown events and rendered as a platform-aware label
//! (`⌘+8` on macOS, `Ctrl+8` elsewhere).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::defaults;
use crate::dom::KeyboardEvent;
use crate::error::{Result, ToggleError};

/// Canonical modifier kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Meta,
    Alt,
    Shift,
}

impl Modifier {
    /// Map a (lower-cased) modifier token to its canonical kind
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ctrl" => Some(Modifier::Ctrl),
            "cmd" | "command" | "meta" => Some(Modifier::Meta),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Meta => "meta",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
        }
    }

    /// Whether this modifier's flag is set on the event
    pub fn is_held(self, event: &KeyboardEvent) -> bool {
        match self {
            Modifier::Ctrl => event.ctrl,
            Modifier::Meta => event.meta,
            Modifier::Alt => event.alt,
            Modifier::Shift => event.shift,
        }
    }

    fn label(self, platform: Platform) -> &'static str {
        match (self, platform) {
            (Modifier::Meta, Platform::MacOS) => "⌘",
            (Modifier::Meta, Platform::Windows) => "Win",
            (Modifier::Meta, Platform::Linux) => "Meta",
            (Modifier::Ctrl, _) => "Ctrl",
            (Modifier::Alt, _) => "Alt",
            (Modifier::Shift, _) => "Shift",
        }
    }
}

/// Platform used for tooltip labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }
}

impl Platform {
    /// Shortcut used when none is configured
    pub fn default_key_combo(self) -> &'static str {
        match self {
            Platform::MacOS => defaults::KEY_COMBO_MAC,
            Platform::Windows | Platform::Linux => defaults::KEY_COMBO,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// A parsed shortcut: exactly one modifier plus one key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyDescriptor {
    pub modifier: Modifier,
    /// Lower-cased key name as it appears in keydown events
    pub key: String,
}

impl KeyDescriptor {
    /// Parse `<modifier>+<key>`, case-insensitively
    pub fn parse(combo: &str) -> Result<Self> {
        let normalized = combo.trim().to_lowercase();
        let parts: Vec<&str> = normalized.split('+').collect();

        let [modifier, key] = parts.as_slice() else {
            return Err(ToggleError::InvalidFormat(combo.to_string()));
        };
        let (modifier, key) = (modifier.trim(), key.trim());
        if modifier.is_empty() || key.is_empty() {
            return Err(ToggleError::InvalidFormat(combo.to_string()));
        }

        let modifier = Modifier::from_token(modifier).ok_or_else(|| {
            ToggleError::UnsupportedModifier {
                combo: combo.to_string(),
                modifier: modifier.to_string(),
            }
        })?;

        Ok(Self {
            modifier,
            key: key.to_string(),
        })
    }

    /// Required modifier held and key equal (ASCII case ignored).
    /// Extra modifiers do not prevent a match.
    pub fn matches(&self, event: &KeyboardEvent) -> bool {
        self.modifier.is_held(event) && event.key.eq_ignore_ascii_case(&self.key)
    }

    /// Human-readable label for tooltips, e.g. `Ctrl+8` or `⌘+K`
    pub fn label(&self, platform: Platform) -> String {
        format!("{}+{}", self.modifier.label(platform), self.key.to_uppercase())
    }
}

impl FromStr for KeyDescriptor {
    type Err = ToggleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.modifier.as_str(), self.key)
    }
}
