//! Visibility transitions
//!
//! Flips fields between hidden (password) and visible (text), keeps the
//! pressed state and button in sync, and announces each change with a
//! bubbling `passwordToggle` event dispatched from the field itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ToggleMode;
use crate::constants::{attrs, events};
use crate::decoration;
use crate::dom::{Document, ElementId, Event};
use crate::icons::IconProvider;
use crate::registry::{FieldKind, FieldRegistry, ManagedField, Visibility, bool_attr};

/// Notification emitted for every toggled field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleEvent {
    pub is_visible: bool,
    /// Element id, or "anonymous"
    pub field: String,
    pub mode: ToggleMode,
}

impl ToggleEvent {
    /// Decode the detail of a dispatched `passwordToggle` event
    pub fn from_event(event: &Event) -> Option<Self> {
        serde_json::from_value(event.detail()?.clone()).ok()
    }
}

/// Which fields a toggle applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Field(ElementId),
    All,
}

/// A flipped field whose notification has not been dispatched yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub element: ElementId,
    pub event: ToggleEvent,
}

/// Toggle the targeted fields and dispatch their notifications
pub fn toggle(
    doc: &mut Document,
    registry: &mut FieldRegistry,
    target: ToggleTarget,
    mode: ToggleMode,
    icons: &dyn IconProvider,
) -> Vec<ToggleEvent> {
    let pending = flip(doc, registry, target, mode, icons);
    announce(doc, &pending)
}

/// Flip the targeted fields in registry order without notifying anyone.
/// Detached or unknown fields are skipped without error.
pub fn flip(
    doc: &mut Document,
    registry: &mut FieldRegistry,
    target: ToggleTarget,
    mode: ToggleMode,
    icons: &dyn IconProvider,
) -> Vec<PendingToggle> {
    let mut flipped = Vec::new();
    for field in registry.iter_mut() {
        if let ToggleTarget::Field(element) = target
            && field.element != element
        {
            continue;
        }
        if !doc.is_connected(field.element) {
            debug!(field = %field.element, "Skipping detached field");
            continue;
        }
        flipped.push(flip_field(doc, field, mode, icons));
    }

    if !flipped.is_empty() {
        info!(count = flipped.len(), mode = mode.as_str(), "Toggled visibility");
    }
    flipped
}

/// Dispatch a bubbling `passwordToggle` from each flipped field, in order
pub fn announce(doc: &mut Document, pending: &[PendingToggle]) -> Vec<ToggleEvent> {
    pending
        .iter()
        .map(|p| {
            let detail = serde_json::to_value(&p.event).unwrap_or_default();
            doc.dispatch(Event::custom(events::PASSWORD_TOGGLE, p.element, detail));
            p.event.clone()
        })
        .collect()
}

fn flip_field(doc: &mut Document, field: &mut ManagedField, mode: ToggleMode, icons: &dyn IconProvider) -> PendingToggle {
    // The page may have changed the type behind our back; flip what is shown
    let current = doc
        .get_attribute(field.element, attrs::TYPE)
        .and_then(FieldKind::from_type)
        .map(Visibility::of_kind)
        .unwrap_or(field.visibility);
    let next = current.flipped();

    field.visibility = next;
    doc.set_attribute(field.element, attrs::TYPE, next.kind().as_str());
    doc.set_attribute(field.element, attrs::ARIA_PRESSED, bool_attr(next.is_visible()));
    if let Some(decoration) = &field.decoration {
        decoration::sync_button(doc, decoration, next, icons);
    }

    let event = ToggleEvent {
        is_visible: next.is_visible(),
        field: field.name(doc),
        mode,
    };
    debug!(field = %event.field, visible = event.is_visible, "Field toggled");
    PendingToggle {
        element: field.element,
        event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassNames;
    use crate::decoration::{DecorationContext, decorate};
    use crate::dom::{EventKind, ListenerTarget};
    use crate::icons::{EYE_CLOSED, EYE_OPEN, EyeIcons};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Page {
        doc: Document,
        registry: FieldRegistry,
        fields: Vec<ElementId>,
        seen: Rc<RefCell<Vec<ToggleEvent>>>,
    }

    fn page(count: usize, decorated: bool) -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let mut fields = Vec::new();
        for i in 0..count {
            let el = doc.create_element("input");
            doc.set_attribute(el, "id", &format!("pw{i}"));
            doc.set_attribute(el, "type", "password");
            doc.set_attribute(el, "data-pw-toggle", "");
            doc.append_child(body, el);
            fields.push(el);
        }

        let mut registry = FieldRegistry::new();
        registry.discover(&mut doc, "data-pw-toggle", "Ctrl+8");
        if decorated {
            let classes = ClassNames::default();
            let ctx = DecorationContext {
                classes: &classes,
                icons: &EyeIcons,
                show_button: true,
                shortcut: "Ctrl+8",
            };
            for field in registry.iter_mut() {
                decorate(&mut doc, field, &ctx);
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.add_listener(
            ListenerTarget::Document,
            EventKind::Custom("passwordToggle".to_string()),
            Rc::new(move |_: &mut Document, event: &mut Event| {
                if let Some(toggle) = ToggleEvent::from_event(event) {
                    sink.borrow_mut().push(toggle);
                }
            }),
        );

        Page {
            doc,
            registry,
            fields,
            seen,
        }
    }

    #[test]
    fn test_toggle_hidden_field_and_back() {
        let mut p = page(1, true);
        let field = p.fields[0];
        let button = p.registry.get(field).unwrap().decoration.as_ref().unwrap().button.unwrap();

        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::Field(field), ToggleMode::Focused, &EyeIcons);
        assert_eq!(
            events,
            vec![ToggleEvent {
                is_visible: true,
                field: "pw0".to_string(),
                mode: ToggleMode::Focused,
            }]
        );
        assert_eq!(p.doc.get_attribute(field, "type"), Some("text"));
        assert_eq!(p.doc.get_attribute(field, "aria-pressed"), Some("true"));
        assert_eq!(p.doc.inner_html(button), EYE_OPEN);
        assert!(p.doc.has_class(button, "active"));
        assert_eq!(*p.seen.borrow(), events);

        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::Field(field), ToggleMode::Focused, &EyeIcons);
        assert!(!events[0].is_visible);
        assert_eq!(p.doc.get_attribute(field, "type"), Some("password"));
        assert_eq!(p.doc.get_attribute(field, "aria-pressed"), Some("false"));
        assert_eq!(p.doc.inner_html(button), EYE_CLOSED);
        assert!(!p.doc.has_class(button, "active"));
        assert_eq!(p.seen.borrow().len(), 2);
    }

    #[test]
    fn test_toggle_all_emits_one_event_per_field_in_order() {
        let mut p = page(3, true);
        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::All, ToggleMode::All, &EyeIcons);

        let names: Vec<_> = events.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(names, vec!["pw0", "pw1", "pw2"]);
        assert!(events.iter().all(|e| e.is_visible && e.mode == ToggleMode::All));
        assert_eq!(p.seen.borrow().len(), 3);
    }

    #[test]
    fn test_undecorated_field_still_flips() {
        let mut p = page(1, false);
        let field = p.fields[0];
        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::All, ToggleMode::All, &EyeIcons);
        assert_eq!(events.len(), 1);
        assert_eq!(p.doc.get_attribute(field, "type"), Some("text"));
        assert_eq!(p.doc.get_attribute(field, "aria-pressed"), Some("true"));
        assert_eq!(p.registry.get(field).unwrap().visibility, Visibility::Visible);
    }

    #[test]
    fn test_detached_and_unknown_fields_are_skipped() {
        let mut p = page(2, true);
        let gone = p.fields[0];
        let wrapper = p.registry.get(gone).unwrap().decoration.as_ref().unwrap().wrapper;
        p.doc.remove(wrapper);

        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::All, ToggleMode::All, &EyeIcons);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field, "pw1");

        let stranger = p.doc.create_element("input");
        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::Field(stranger), ToggleMode::Focused, &EyeIcons);
        assert!(events.is_empty());
    }

    #[test]
    fn test_external_type_change_is_respected() {
        let mut p = page(1, false);
        let field = p.fields[0];
        p.doc.set_attribute(field, "type", "text");
        let events = toggle(&mut p.doc, &mut p.registry, ToggleTarget::Field(field), ToggleMode::Focused, &EyeIcons);
        assert!(!events[0].is_visible);
        assert_eq!(p.doc.get_attribute(field, "type"), Some("password"));
    }

    #[test]
    fn test_event_detail_shape() {
        let event = ToggleEvent {
            is_visible: true,
            field: "anonymous".to_string(),
            mode: ToggleMode::All,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "isVisible": true, "field": "anonymous", "mode": "all" })
        );
    }

    #[test]
    fn test_flip_defers_notifications() {
        let mut p = page(2, true);
        let pending = flip(&mut p.doc, &mut p.registry, ToggleTarget::All, ToggleMode::All, &EyeIcons);
        assert_eq!(pending.len(), 2);
        assert_eq!(p.doc.get_attribute(p.fields[0], "type"), Some("text"));
        assert!(p.seen.borrow().is_empty());

        let events = announce(&mut p.doc, &pending);
        assert_eq!(events[1].field, "pw1");
        assert_eq!(*p.seen.borrow(), events);
    }
}
