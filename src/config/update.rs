//! Partial option updates

use serde::{Deserialize, Serialize};

use super::options::Options;
use crate::key_combo::Platform;

/// Subset of [`Options`]; `None` leaves the current value untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_combo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_all_fields: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_toggle_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_button_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_open_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_closed_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl OptionsUpdate {
    /// Copy every present value into `options`
    pub fn apply_to(&self, options: &mut Options) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        if let Some(combo) = &self.key_combo {
            options.key_combo = Some(combo.clone());
        }
        set(&mut options.toggle_attribute, &self.toggle_attribute);
        set(&mut options.toggle_all_fields, &self.toggle_all_fields);
        set(&mut options.show_toggle_button, &self.show_toggle_button);
        set(&mut options.toggle_button_class, &self.toggle_button_class);
        set(&mut options.active_class, &self.active_class);
        set(&mut options.wrapper_class, &self.wrapper_class);
        set(&mut options.tooltip_class, &self.tooltip_class);
        set(&mut options.eye_open_icon, &self.eye_open_icon);
        set(&mut options.eye_closed_icon, &self.eye_closed_icon);
        set(&mut options.platform, &self.platform);
    }
}
