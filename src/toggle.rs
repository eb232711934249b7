//! The password toggle controller
//!
//! [`PasswordToggle`] owns one configuration and everything derived from it:
//! the parsed shortcut, the field registry, the decorations and the
//! listeners it installed. Several controllers can share a [`Document`].
//! Each keeps its own state but they will all act on fields whose marker
//! attributes overlap.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::{Options, OptionsUpdate, ToggleMode};
use crate::decoration::{self, DecorationContext};
use crate::dom::{Document, ListenerId};
use crate::error::{Result, ToggleError};
use crate::key_combo::KeyDescriptor;
use crate::registry::{FieldRegistry, FieldState, ManagedField};
use crate::router;
use crate::style::{self, DefaultStyles, StyleProvider};
use crate::visibility::{self, ToggleEvent, ToggleTarget};

/// Mutable controller state shared with the installed listeners
pub struct ControllerState {
    pub(crate) options: Options,
    pub(crate) descriptor: KeyDescriptor,
    pub(crate) registry: FieldRegistry,
    pub(crate) key_listener: Option<ListenerId>,
    pub(crate) style: Box<dyn StyleProvider>,
    pub(crate) style_acquired: bool,
    pub(crate) destroyed: bool,
}

impl ControllerState {
    fn shortcut_label(&self) -> String {
        self.descriptor.label(self.options.platform)
    }
}

/// One toggle instance bound to a document.
///
/// `passwordToggle` notifications are dispatched after the controller has
/// released its state, so listeners may read from or reconfigure the same
/// instance. [`ToggleError::Reentrant`] is returned only when a call arrives
/// while the state is still held.
pub struct PasswordToggle {
    state: Rc<RefCell<ControllerState>>,
}

impl PasswordToggle {
    /// Initialize with the default style provider
    pub fn new(doc: &mut Document, options: Options) -> Result<Self> {
        Self::with_style_provider(doc, options, Box::new(DefaultStyles))
    }

    /// Parse the shortcut, inject styles, bind the keydown handler and
    /// register/decorate every marked field on the page
    pub fn with_style_provider(doc: &mut Document, options: Options, style: Box<dyn StyleProvider>) -> Result<Self> {
        let descriptor = KeyDescriptor::parse(&options.key_combo())?;

        let state = Rc::new(RefCell::new(ControllerState {
            options,
            descriptor,
            registry: FieldRegistry::new(),
            key_listener: None,
            style,
            style_acquired: false,
            destroyed: false,
        }));

        {
            let mut s = state.borrow_mut();
            style::acquire(doc, s.style.as_ref(), &s.options.class_names());
            s.style_acquired = true;
            s.key_listener = Some(router::bind_key_listener(doc, &state));
            info!(combo = %s.descriptor, attribute = %s.options.toggle_attribute, "PasswordToggle initialized");
        }

        let toggle = Self { state };
        toggle.refresh(doc)?;
        Ok(toggle)
    }

    fn state_mut(&self) -> Result<RefMut<'_, ControllerState>> {
        self.state.try_borrow_mut().map_err(|_| ToggleError::Reentrant)
    }

    pub fn mode(&self) -> ToggleMode {
        self.state.borrow().options.mode()
    }

    pub fn set_mode(&self, mode: ToggleMode) -> Result<()> {
        let mut state = self.state_mut()?;
        state.options.toggle_all_fields = mode == ToggleMode::All;
        info!(mode = mode.as_str(), "Mode changed");
        Ok(())
    }

    pub fn key_combo(&self) -> KeyDescriptor {
        self.state.borrow().descriptor.clone()
    }

    /// Copy of the active options
    pub fn options(&self) -> Options {
        self.state.borrow().options.clone()
    }

    /// Replace the shortcut. On a parse error the previous shortcut stays
    /// active and nothing is changed.
    pub fn set_key_combo(&self, doc: &mut Document, combo: &str) -> Result<()> {
        self.update_config(
            doc,
            &OptionsUpdate {
                key_combo: Some(combo.to_string()),
                ..OptionsUpdate::default()
            },
        )
    }

    /// Apply a partial update. The merged key combo is parsed before anything
    /// is committed; other unusable values fall back to their defaults the
    /// same way loaded options do. Class and attribute changes take effect on
    /// the next refresh or toggle.
    pub fn update_config(&self, doc: &mut Document, update: &OptionsUpdate) -> Result<()> {
        let mut state = self.state_mut()?;
        let mut merged = state.options.clone();
        update.apply_to(&mut merged);

        let descriptor = KeyDescriptor::parse(&merged.key_combo())
            .inspect_err(|e| warn!(error = %e, "Rejected key combo, keeping previous"))?;
        merged.validate();
        if merged.key_combo.is_some() {
            // Keep the stored text in canonical form
            merged.key_combo = Some(descriptor.to_string());
        }

        let relabel = descriptor != state.descriptor || merged.platform != state.options.platform;
        if descriptor != state.descriptor {
            info!(old = %state.descriptor, new = %descriptor, "Key combo changed");
            state.descriptor = descriptor;
        }
        state.options = merged;
        if relabel {
            relabel_fields(doc, &state);
        }
        debug!(update = ?update, "Options updated");
        Ok(())
    }

    /// Register and decorate fields added since the last scan, and forget
    /// fields the page removed. Returns the number of newly registered fields.
    pub fn refresh(&self, doc: &mut Document) -> Result<usize> {
        let mut state = self.state_mut()?;
        if state.destroyed {
            warn!("refresh called on a destroyed PasswordToggle");
            return Ok(0);
        }

        for mut gone in state.registry.prune(doc) {
            release_field(doc, &mut gone);
        }

        let shortcut = state.shortcut_label();
        let attribute = state.options.toggle_attribute.clone();
        let added = state.registry.discover(doc, &attribute, &shortcut);

        let classes = state.options.class_names();
        let icons = state.options.icons();
        let show_button = state.options.show_toggle_button;
        let ctx = DecorationContext {
            classes: &classes,
            icons: &icons,
            show_button,
            shortcut: &shortcut,
        };

        let mut buttons = Vec::new();
        for element in &added {
            let Some(field) = state.registry.get_mut(*element) else {
                continue;
            };
            if !decoration::decorate(doc, field, &ctx) {
                debug!(field = %field.name(doc), "Left undecorated");
                continue;
            }
            if let Some(button) = field.decoration.as_ref().and_then(|d| d.button) {
                buttons.push((*element, button));
            }
        }
        drop(state);

        // Listeners capture the shared state, so bind them outside the borrow
        for (element, button) in buttons {
            let listener = router::bind_button_listener(doc, button, &classes.wrapper, &self.state);
            let mut state = self.state_mut()?;
            if let Some(decoration) = state.registry.get_mut(element).and_then(|f| f.decoration.as_mut()) {
                decoration.click_listener = Some(listener);
            }
        }

        Ok(added.len())
    }

    /// Toggle programmatically, as if triggered in the given target mode
    pub fn toggle(&self, doc: &mut Document, target: ToggleTarget) -> Result<Vec<ToggleEvent>> {
        let pending = {
            let mut state = self.state_mut()?;
            if state.destroyed {
                return Ok(Vec::new());
            }
            let mode = match target {
                ToggleTarget::All => ToggleMode::All,
                ToggleTarget::Field(_) => ToggleMode::Focused,
            };
            let icons = state.options.icons();
            visibility::flip(doc, &mut state.registry, target, mode, &icons)
        };
        // Listeners may call back into this controller
        Ok(visibility::announce(doc, &pending))
    }

    pub fn fields(&self) -> Vec<FieldState> {
        self.state.borrow().registry.states()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    /// Remove every listener, decoration and style reference this controller
    /// added and restore the fields. Safe to call repeatedly.
    pub fn destroy(&self, doc: &mut Document) -> Result<()> {
        let mut state = self.state_mut()?;
        if state.destroyed {
            debug!("PasswordToggle already destroyed");
            return Ok(());
        }

        if let Some(listener) = state.key_listener.take() {
            doc.remove_listener(listener);
        }
        let fields = state.registry.drain();
        let count = fields.len();
        for mut field in fields {
            release_field(doc, &mut field);
        }
        if state.style_acquired {
            style::release(doc, state.style.as_ref());
            state.style_acquired = false;
        }
        state.destroyed = true;

        info!(fields = count, "PasswordToggle destroyed");
        Ok(())
    }
}

/// Unbind, undecorate and restore one field
fn release_field(doc: &mut Document, field: &mut ManagedField) {
    if let Some(listener) = field.decoration.as_mut().and_then(|d| d.click_listener.take()) {
        doc.remove_listener(listener);
    }
    decoration::undecorate(doc, field);
    FieldRegistry::restore(doc, field);
}

fn relabel_fields(doc: &mut Document, state: &ControllerState) {
    let shortcut = state.shortcut_label();
    state.registry.relabel(doc, &shortcut);
    for decoration in state.registry.iter().filter_map(|f| f.decoration.as_ref()) {
        decoration::set_tooltip(doc, decoration, &shortcut);
    }
}
