//! Trigger handling
//!
//! Two sources can toggle fields: the document-level keydown handler and a
//! click handler on each toggle button. Both resolve their target set from
//! the current mode and hand it to the visibility controller. Handlers are
//! stored as [`ListenerId`]s so teardown can remove exactly what was added.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

use crate::config::ToggleMode;
use crate::dom::{Document, ElementId, Event, EventKind, ListenerId, ListenerTarget};
use crate::toggle::ControllerState;
use crate::visibility::{self, PendingToggle, ToggleTarget};

/// Fields a keydown applies to, or `None` when it should do nothing
pub fn resolve_key_target(doc: &Document, state: &ControllerState) -> Option<ToggleTarget> {
    match state.options.mode() {
        ToggleMode::All => Some(ToggleTarget::All),
        ToggleMode::Focused => {
            let focused = doc.active_element()?;
            if !doc.has_attribute(focused, &state.options.toggle_attribute) {
                return None;
            }
            if !state.registry.contains(focused) {
                debug!(field = %focused, "Focused field is not registered yet");
                return None;
            }
            Some(ToggleTarget::Field(focused))
        }
    }
}

/// Fields a button click applies to. The owning field is found through the
/// button's enclosing wrapper, not through focus.
pub fn resolve_click_target(
    doc: &Document,
    state: &ControllerState,
    button: ElementId,
    wrapper_class: &str,
) -> Option<ToggleTarget> {
    let wrapper = doc.closest_with_class(button, wrapper_class)?;
    let field = state.registry.find_by_wrapper(wrapper)?;
    match state.options.mode() {
        ToggleMode::All => Some(ToggleTarget::All),
        ToggleMode::Focused => Some(ToggleTarget::Field(field.element)),
    }
}

fn on_key_down(doc: &mut Document, event: &mut Event, state: &mut ControllerState) -> Vec<PendingToggle> {
    let Some(key) = event.keyboard() else {
        return Vec::new();
    };
    if !state.descriptor.matches(key) {
        return Vec::new();
    }
    event.prevent_default();

    match resolve_key_target(doc, state) {
        Some(target) => run_toggle(doc, state, target),
        None => {
            debug!(combo = %state.descriptor, "Shortcut pressed without a managed field focused");
            Vec::new()
        }
    }
}

fn on_button_click(
    doc: &mut Document,
    event: &mut Event,
    state: &mut ControllerState,
    wrapper_class: &str,
) -> Vec<PendingToggle> {
    event.prevent_default();
    match resolve_click_target(doc, state, event.target, wrapper_class) {
        Some(target) => run_toggle(doc, state, target),
        None => {
            debug!(button = %event.target, "Toggle button no longer belongs to a managed field");
            Vec::new()
        }
    }
}

fn run_toggle(doc: &mut Document, state: &mut ControllerState, target: ToggleTarget) -> Vec<PendingToggle> {
    let mode = state.options.mode();
    let icons = state.options.icons();
    visibility::flip(doc, &mut state.registry, target, mode, &icons)
}

/// Run `f` against the controller if it is still alive and not already busy.
/// The returned changes are announced by the caller once the state is released.
fn with_state(
    weak: &Weak<RefCell<ControllerState>>,
    f: impl FnOnce(&mut ControllerState) -> Vec<PendingToggle>,
) -> Vec<PendingToggle> {
    let Some(state) = weak.upgrade() else {
        return Vec::new();
    };
    let Ok(mut state) = state.try_borrow_mut() else {
        warn!("Ignoring trigger raised while the controller is busy");
        return Vec::new();
    };
    if state.destroyed {
        return Vec::new();
    }
    f(&mut state)
}

pub fn bind_key_listener(doc: &mut Document, state: &Rc<RefCell<ControllerState>>) -> ListenerId {
    let weak = Rc::downgrade(state);
    doc.add_listener(
        ListenerTarget::Document,
        EventKind::KeyDown,
        Rc::new(move |doc: &mut Document, event: &mut Event| {
            let pending = with_state(&weak, |state| on_key_down(doc, event, state));
            visibility::announce(doc, &pending);
        }),
    )
}

pub fn bind_button_listener(
    doc: &mut Document,
    button: ElementId,
    wrapper_class: &str,
    state: &Rc<RefCell<ControllerState>>,
) -> ListenerId {
    let weak = Rc::downgrade(state);
    let wrapper_class = wrapper_class.to_string();
    doc.add_listener(
        ListenerTarget::Element(button),
        EventKind::Click,
        Rc::new(move |doc: &mut Document, event: &mut Event| {
            let pending = with_state(&weak, |state| on_button_click(doc, event, state, &wrapper_class));
            visibility::announce(doc, &pending);
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::dom::KeyboardEvent;
    use crate::key_combo::{KeyDescriptor, Platform};
    use crate::registry::FieldRegistry;
    use crate::style::DefaultStyles;

    fn state(doc: &mut Document, toggle_all: bool) -> Rc<RefCell<ControllerState>> {
        let options = Options {
            toggle_all_fields: toggle_all,
            platform: Platform::Linux,
            ..Options::default()
        };
        let mut registry = FieldRegistry::new();
        registry.discover(doc, &options.toggle_attribute, "Ctrl+8");
        Rc::new(RefCell::new(ControllerState {
            descriptor: KeyDescriptor::parse(&options.key_combo()).unwrap(),
            options,
            registry,
            key_listener: None,
            style: Box::new(DefaultStyles),
            style_acquired: false,
            destroyed: false,
        }))
    }

    fn input(doc: &mut Document, id: &str, marked: bool) -> ElementId {
        let body = doc.body();
        let el = doc.create_element("input");
        doc.set_attribute(el, "id", id);
        doc.set_attribute(el, "type", "password");
        if marked {
            doc.set_attribute(el, "data-pw-toggle", "");
        }
        doc.append_child(body, el);
        el
    }

    fn ctrl_8() -> KeyboardEvent {
        KeyboardEvent {
            key: "8".to_string(),
            ctrl: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_key_target_follows_mode_and_focus() {
        let mut doc = Document::new();
        let marked = input(&mut doc, "a", true);
        let plain = input(&mut doc, "b", false);

        let focused = state(&mut doc, false);
        assert_eq!(resolve_key_target(&doc, &focused.borrow()), None);
        doc.focus(plain);
        assert_eq!(resolve_key_target(&doc, &focused.borrow()), None);
        doc.focus(marked);
        assert_eq!(resolve_key_target(&doc, &focused.borrow()), Some(ToggleTarget::Field(marked)));

        let all = state(&mut doc, true);
        doc.blur();
        assert_eq!(resolve_key_target(&doc, &all.borrow()), Some(ToggleTarget::All));
    }

    #[test]
    fn test_marked_but_unregistered_field_is_ignored() {
        let mut doc = Document::new();
        let state = state(&mut doc, false);
        let late = input(&mut doc, "late", true);
        doc.focus(late);
        assert_eq!(resolve_key_target(&doc, &state.borrow()), None);
    }

    #[test]
    fn test_key_listener_prevents_default_only_on_match() {
        let mut doc = Document::new();
        let field = input(&mut doc, "a", true);
        let state = state(&mut doc, false);
        bind_key_listener(&mut doc, &state);
        doc.focus(field);

        let other = doc.key_down(KeyboardEvent {
            key: "9".to_string(),
            ctrl: true,
            ..Default::default()
        });
        assert!(!other.default_prevented);
        assert_eq!(doc.get_attribute(field, "type"), Some("password"));

        let hit = doc.key_down(ctrl_8());
        assert!(hit.default_prevented);
        assert_eq!(doc.get_attribute(field, "type"), Some("text"));
    }

    #[test]
    fn test_destroyed_or_dropped_state_ignores_triggers() {
        let mut doc = Document::new();
        let field = input(&mut doc, "a", true);
        let state = state(&mut doc, true);
        bind_key_listener(&mut doc, &state);

        state.borrow_mut().destroyed = true;
        doc.key_down(ctrl_8());
        assert_eq!(doc.get_attribute(field, "type"), Some("password"));

        drop(state);
        let event = doc.key_down(ctrl_8());
        assert!(!event.default_prevented);
    }
}
