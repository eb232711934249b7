//! Controller options
//!
//! Loaded from JSON (keys match the public option names, e.g. `keyCombo`),
//! overridden by environment variables, then validated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::defaults;
use crate::icons::{EyeIcons, IconProvider, IconSet};
use crate::key_combo::{KeyDescriptor, Platform};

/// Whether a trigger affects the focused field or every managed field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    All,
    Focused,
}

impl ToggleMode {
    pub fn from_toggle_all(toggle_all: bool) -> Self {
        if toggle_all { ToggleMode::All } else { ToggleMode::Focused }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToggleMode::All => "all",
            ToggleMode::Focused => "focused",
        }
    }
}

/// CSS class names used for decoration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    pub button: String,
    pub active: String,
    pub wrapper: String,
    pub tooltip: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            button: defaults::BUTTON_CLASS.to_string(),
            active: defaults::ACTIVE_CLASS.to_string(),
            wrapper: defaults::WRAPPER_CLASS.to_string(),
            tooltip: defaults::TOOLTIP_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Unset means the platform default, see [`Options::key_combo`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_combo: Option<String>,
    #[serde(default = "default_toggle_attribute")]
    pub toggle_attribute: String,
    #[serde(default)]
    pub toggle_all_fields: bool,
    #[serde(default = "default_show_toggle_button")]
    pub show_toggle_button: bool,
    #[serde(default = "default_button_class")]
    pub toggle_button_class: String,
    #[serde(default = "default_active_class")]
    pub active_class: String,
    #[serde(default = "default_wrapper_class")]
    pub wrapper_class: String,
    #[serde(default = "default_tooltip_class")]
    pub tooltip_class: String,
    #[serde(default = "default_eye_open_icon")]
    pub eye_open_icon: String,
    #[serde(default = "default_eye_closed_icon")]
    pub eye_closed_icon: String,
    /// Platform used for the tooltip shortcut label
    #[serde(default)]
    pub platform: Platform,
}

// Default value functions
fn default_toggle_attribute() -> String {
    defaults::TOGGLE_ATTRIBUTE.to_string()
}

fn default_show_toggle_button() -> bool {
    true
}

fn default_button_class() -> String {
    defaults::BUTTON_CLASS.to_string()
}

fn default_active_class() -> String {
    defaults::ACTIVE_CLASS.to_string()
}

fn default_wrapper_class() -> String {
    defaults::WRAPPER_CLASS.to_string()
}

fn default_tooltip_class() -> String {
    defaults::TOOLTIP_CLASS.to_string()
}

fn default_eye_open_icon() -> String {
    EyeIcons.open().to_string()
}

fn default_eye_closed_icon() -> String {
    EyeIcons.closed().to_string()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            key_combo: None,
            toggle_attribute: default_toggle_attribute(),
            toggle_all_fields: false,
            show_toggle_button: default_show_toggle_button(),
            toggle_button_class: default_button_class(),
            active_class: default_active_class(),
            wrapper_class: default_wrapper_class(),
            tooltip_class: default_tooltip_class(),
            eye_open_icon: default_eye_open_icon(),
            eye_closed_icon: default_eye_closed_icon(),
            platform: Platform::default(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl Options {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Configured shortcut, or `meta+8` on macOS and `ctrl+8` elsewhere
    pub fn key_combo(&self) -> String {
        self.key_combo
            .clone()
            .unwrap_or_else(|| self.platform.default_key_combo().to_string())
    }

    pub fn mode(&self) -> ToggleMode {
        ToggleMode::from_toggle_all(self.toggle_all_fields)
    }

    pub fn class_names(&self) -> ClassNames {
        ClassNames {
            button: self.toggle_button_class.clone(),
            active: self.active_class.clone(),
            wrapper: self.wrapper_class.clone(),
            tooltip: self.tooltip_class.clone(),
        }
    }

    pub fn icons(&self) -> IconSet {
        IconSet {
            open: self.eye_open_icon.clone(),
            closed: self.eye_closed_icon.clone(),
        }
    }

    /// Load options from a JSON file, then apply env overrides and validate
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    fn load_with(path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read options from {}", path.display()))?;
        let mut options: Options = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;

        options.apply_overrides(var);
        options.validate();
        info!(path = %path.display(), key_combo = %options.key_combo(), "Loaded options");
        Ok(options)
    }

    /// Load from the default location, falling back to built-in defaults
    /// when no file exists there
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_at(&Self::default_path(), env_var)
    }

    fn load_or_default_at(path: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if path.exists() {
            return Self::load_with(path, var);
        }

        info!(path = %path.display(), "No options file found, using defaults");
        let mut options = Self::default();
        options.apply_overrides(var);
        options.validate();
        Ok(options)
    }

    /// Apply `PW_TOGGLE_*` overrides looked up through `var`
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(combo) = var("PW_TOGGLE_KEY_COMBO") {
            self.key_combo = Some(combo);
        }
        if let Some(attribute) = var("PW_TOGGLE_ATTRIBUTE") {
            self.toggle_attribute = attribute;
        }
        if let Some(all) = var("PW_TOGGLE_ALL_FIELDS") {
            match all.parse() {
                Ok(all) => self.toggle_all_fields = all,
                Err(_) => warn!(value = %all, "Ignoring PW_TOGGLE_ALL_FIELDS, expected true or false"),
            }
        }
    }

    /// Replace unusable values with defaults
    /// Called after loading JSON, applying env overrides, or a runtime update
    pub(crate) fn validate(&mut self) {
        if let Some(combo) = &self.key_combo
            && let Err(e) = KeyDescriptor::parse(combo)
        {
            warn!(key_combo = %combo, error = %e, using = self.platform.default_key_combo(), "Invalid keyCombo, using default");
            self.key_combo = None;
        }

        if self.toggle_attribute.trim().is_empty() {
            warn!(using = defaults::TOGGLE_ATTRIBUTE, "Empty toggleAttribute, using default");
            self.toggle_attribute = default_toggle_attribute();
        }

        for (name, value, fallback) in [
            ("toggleButtonClass", &mut self.toggle_button_class, defaults::BUTTON_CLASS),
            ("activeClass", &mut self.active_class, defaults::ACTIVE_CLASS),
            ("wrapperClass", &mut self.wrapper_class, defaults::WRAPPER_CLASS),
            ("tooltipClass", &mut self.tooltip_class, defaults::TOOLTIP_CLASS),
        ] {
            if value.trim().is_empty() || value.contains(char::is_whitespace) {
                warn!(option = name, value = %value, using = fallback, "Unusable class name, using default");
                *value = fallback.to_string();
            }
        }
    }
}
