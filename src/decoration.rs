//! Auxiliary UI around managed fields
//!
//! Each decorated field is moved into a wrapper container that takes its old
//! place in the tree. The wrapper also holds an optional toggle button and a
//! tooltip naming the shortcut. Decoration happens at most once per field and
//! is fully reversible.

use tracing::{debug, trace};

use crate::config::ClassNames;
use crate::constants::attrs;
use crate::dom::{Document, ElementId, ListenerId};
use crate::icons::IconProvider;
use crate::registry::{FieldRegistry, ManagedField, Visibility, bool_attr};

/// Elements owned by one decorated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub wrapper: ElementId,
    pub button: Option<ElementId>,
    pub tooltip: ElementId,
    /// Class names in effect when the decoration was created
    pub classes: ClassNames,
    /// Click handler bound to `button`
    pub click_listener: Option<ListenerId>,
}

/// Inputs needed to build a decoration
pub struct DecorationContext<'a> {
    pub classes: &'a ClassNames,
    pub icons: &'a dyn IconProvider,
    pub show_button: bool,
    /// Human-readable shortcut, e.g. `Ctrl+8`
    pub shortcut: &'a str,
}

pub fn tooltip_text(shortcut: &str) -> String {
    format!("Press {shortcut} to toggle visibility")
}

fn button_label(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Hidden => "Show password",
        Visibility::Visible => "Hide password",
    }
}

/// Wrap `field` and attach button and tooltip. Returns false (and changes
/// nothing) when the field is already decorated, detached, or parentless.
pub fn decorate(doc: &mut Document, field: &mut ManagedField, ctx: &DecorationContext<'_>) -> bool {
    let element = field.element;
    if field.decoration.is_some() || FieldRegistry::is_decorated(doc, element, &ctx.classes.wrapper) {
        trace!(field = %element, "already decorated");
        return false;
    }
    if !doc.is_connected(element) {
        return false;
    }
    let Some(parent) = doc.parent(element) else {
        return false;
    };

    let wrapper = doc.create_element("div");
    doc.add_class(wrapper, &ctx.classes.wrapper);
    doc.insert_before(parent, wrapper, Some(element));
    doc.append_child(wrapper, element);

    let button = ctx.show_button.then(|| {
        let button = doc.create_element("button");
        doc.set_attribute(button, attrs::TYPE, "button");
        doc.add_class(button, &ctx.classes.button);
        doc.append_child(wrapper, button);
        button
    });

    let tooltip = doc.create_element("span");
    doc.add_class(tooltip, &ctx.classes.tooltip);
    doc.set_attribute(tooltip, attrs::ROLE, "tooltip");
    doc.set_text(tooltip, &tooltip_text(ctx.shortcut));
    doc.append_child(wrapper, tooltip);

    let decoration = Decoration {
        wrapper,
        button,
        tooltip,
        classes: ctx.classes.clone(),
        click_listener: None,
    };
    sync_button(doc, &decoration, field.visibility, ctx.icons);
    field.decoration = Some(decoration);

    debug!(field = %field.name(doc), button = button.is_some(), "Decorated field");
    true
}

/// Bring the button's icon, active class and pressed state in line with
/// `visibility`. No-op without a button.
pub fn sync_button(doc: &mut Document, decoration: &Decoration, visibility: Visibility, icons: &dyn IconProvider) {
    let Some(button) = decoration.button else {
        return;
    };
    let icon = match visibility {
        Visibility::Visible => icons.open(),
        Visibility::Hidden => icons.closed(),
    };
    doc.set_inner_html(button, icon);
    doc.set_class(button, &decoration.classes.active, visibility.is_visible());
    doc.set_attribute(button, attrs::ARIA_PRESSED, bool_attr(visibility.is_visible()));
    doc.set_attribute(button, attrs::ARIA_LABEL, button_label(visibility));
}

pub fn set_tooltip(doc: &mut Document, decoration: &Decoration, shortcut: &str) {
    doc.set_text(decoration.tooltip, &tooltip_text(shortcut));
}

/// Move the field back to the wrapper's place and drop the owned elements.
/// Tolerates wrappers or fields the page has already moved or detached.
pub fn undecorate(doc: &mut Document, field: &mut ManagedField) {
    let Some(decoration) = field.decoration.take() else {
        return;
    };
    let element = field.element;

    if let Some(button) = decoration.button {
        doc.remove(button);
    }
    doc.remove(decoration.tooltip);

    if doc.parent(element) == Some(decoration.wrapper) {
        match doc.parent(decoration.wrapper) {
            Some(parent) => doc.insert_before(parent, element, Some(decoration.wrapper)),
            None => doc.remove(element),
        }
    }
    doc.remove(decoration.wrapper);

    debug!(field = %field.name(doc), "Removed decoration");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::EyeIcons;

    fn page() -> (Document, FieldRegistry, ElementId, ElementId) {
        let mut doc = Document::new();
        let body = doc.body();
        let form = doc.create_element("form");
        let before = doc.create_element("label");
        let field = doc.create_element("input");
        let after = doc.create_element("input");
        doc.set_attribute(field, "id", "pw");
        doc.set_attribute(field, "type", "password");
        doc.set_attribute(field, "data-pw-toggle", "");
        doc.append_child(body, form);
        doc.append_child(form, before);
        doc.append_child(form, field);
        doc.append_child(form, after);

        let mut registry = FieldRegistry::new();
        registry.discover(&mut doc, "data-pw-toggle", "Ctrl+8");
        (doc, registry, form, field)
    }

    fn context(classes: &ClassNames, show_button: bool) -> DecorationContext<'_> {
        DecorationContext {
            classes,
            icons: &EyeIcons,
            show_button,
            shortcut: "Ctrl+8",
        }
    }

    #[test]
    fn test_decorate_wraps_in_place() {
        let (mut doc, mut registry, form, field) = page();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        assert!(decorate(&mut doc, managed, &context(&classes, true)));

        let decoration = managed.decoration.clone().unwrap();
        assert_eq!(doc.children(form)[1], decoration.wrapper);
        assert_eq!(doc.parent(field), Some(decoration.wrapper));
        assert_eq!(
            doc.children(decoration.wrapper),
            &[field, decoration.button.unwrap(), decoration.tooltip]
        );
        assert_eq!(doc.text(decoration.tooltip), "Press Ctrl+8 to toggle visibility");

        let button = decoration.button.unwrap();
        assert_eq!(doc.inner_html(button), crate::icons::EYE_CLOSED);
        assert!(!doc.has_class(button, "active"));
        assert_eq!(doc.get_attribute(button, "type"), Some("button"));
    }

    #[test]
    fn test_decorate_twice_is_idempotent() {
        let (mut doc, mut registry, form, field) = page();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        assert!(decorate(&mut doc, managed, &context(&classes, true)));
        assert!(!decorate(&mut doc, managed, &context(&classes, true)));

        let wrappers: Vec<_> = doc
            .descendants(form)
            .into_iter()
            .filter(|id| doc.has_class(*id, "pw-toggle-wrapper"))
            .collect();
        assert_eq!(wrappers.len(), 1);
        let buttons = doc.descendants(form).into_iter().filter(|id| doc.tag(*id) == "button").count();
        let tooltips = doc.descendants(form).into_iter().filter(|id| doc.tag(*id) == "span").count();
        assert_eq!((buttons, tooltips), (1, 1));
    }

    #[test]
    fn test_decorate_without_button() {
        let (mut doc, mut registry, _, field) = page();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        assert!(decorate(&mut doc, managed, &context(&classes, false)));

        let decoration = managed.decoration.as_ref().unwrap();
        assert_eq!(decoration.button, None);
        assert_eq!(doc.children(decoration.wrapper), &[field, decoration.tooltip]);
    }

    #[test]
    fn test_sync_button_swaps_icon_and_active_class() {
        let (mut doc, mut registry, _, field) = page();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        decorate(&mut doc, managed, &context(&classes, true));
        let decoration = managed.decoration.clone().unwrap();
        let button = decoration.button.unwrap();

        sync_button(&mut doc, &decoration, Visibility::Visible, &EyeIcons);
        assert_eq!(doc.inner_html(button), crate::icons::EYE_OPEN);
        assert!(doc.has_class(button, "active"));
        assert_eq!(doc.get_attribute(button, "aria-label"), Some("Hide password"));

        sync_button(&mut doc, &decoration, Visibility::Hidden, &EyeIcons);
        assert_eq!(doc.inner_html(button), crate::icons::EYE_CLOSED);
        assert!(!doc.has_class(button, "active"));
    }

    #[test]
    fn test_undecorate_restores_position() {
        let (mut doc, mut registry, form, field) = page();
        let original = doc.children(form).to_vec();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        decorate(&mut doc, managed, &context(&classes, true));

        undecorate(&mut doc, managed);
        assert_eq!(doc.children(form), original.as_slice());
        assert!(managed.decoration.is_none());
        // Second call has nothing to undo
        undecorate(&mut doc, managed);
        assert_eq!(doc.children(form), original.as_slice());
    }

    #[test]
    fn test_undecorate_tolerates_detached_wrapper() {
        let (mut doc, mut registry, form, field) = page();
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        decorate(&mut doc, managed, &context(&classes, true));
        let wrapper = managed.decoration.as_ref().unwrap().wrapper;

        doc.remove(wrapper);
        undecorate(&mut doc, managed);
        assert!(!doc.is_connected(field));
        assert_eq!(doc.children(form).len(), 2);
        assert!(doc.children(wrapper).is_empty());
    }

    #[test]
    fn test_detached_field_is_not_decorated() {
        let (mut doc, mut registry, _, field) = page();
        doc.remove(field);
        let classes = ClassNames::default();
        let managed = registry.get_mut(field).unwrap();
        assert!(!decorate(&mut doc, managed, &context(&classes, true)));
    }
}
