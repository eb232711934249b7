//! Field discovery and tracking
//!
//! Fields opt in by carrying the marker attribute. The registry remembers
//! every field it has accepted, in the order it first saw them, together
//! with what it needs to restore the field on teardown.

use tracing::{debug, info, warn};

use crate::constants::{attrs, kinds};
use crate::decoration::Decoration;
use crate::dom::{Document, ElementId};
use crate::error::{Result, ToggleError};

/// Input kinds that may be managed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Password,
    Text,
}

impl FieldKind {
    pub fn from_type(input_type: &str) -> Option<Self> {
        match input_type.to_ascii_lowercase().as_str() {
            kinds::PASSWORD => Some(FieldKind::Password),
            kinds::TEXT => Some(FieldKind::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Password => kinds::PASSWORD,
            FieldKind::Text => kinds::TEXT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    /// Visibility implied by an input's current kind
    pub fn of_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Password => Visibility::Hidden,
            FieldKind::Text => Visibility::Visible,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Visibility::Hidden => Visibility::Visible,
            Visibility::Visible => Visibility::Hidden,
        }
    }

    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }

    /// Input kind that renders this visibility
    pub fn kind(self) -> FieldKind {
        match self {
            Visibility::Hidden => FieldKind::Password,
            Visibility::Visible => FieldKind::Text,
        }
    }
}

/// One registered input
#[derive(Debug, Clone)]
pub struct ManagedField {
    pub element: ElementId,
    pub visibility: Visibility,
    pub decoration: Option<Decoration>,
    original_kind: FieldKind,
    original_label: Option<String>,
}

impl ManagedField {
    pub fn is_decorated(&self) -> bool {
        self.decoration.is_some()
    }

    /// Identifier reported in toggle events
    pub fn name(&self, doc: &Document) -> String {
        field_name(doc, self.element)
    }
}

/// Read-only view of a managed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldState {
    pub element: ElementId,
    pub visibility: Visibility,
    pub decorated: bool,
}

/// Element id attribute, or "anonymous"
pub fn field_name(doc: &Document, element: ElementId) -> String {
    doc.get_attribute(element, attrs::ID)
        .filter(|id| !id.is_empty())
        .unwrap_or(crate::constants::events::ANONYMOUS_FIELD)
        .to_string()
}

fn accessible_label(original: Option<&str>, shortcut: &str) -> String {
    format!(
        "{} (Press {shortcut} to toggle visibility)",
        original.unwrap_or(attrs::FALLBACK_LABEL)
    )
}

#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<ManagedField>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connected elements carrying the marker attribute, in document order
    pub fn scan(doc: &Document, attribute: &str) -> Vec<ElementId> {
        doc.query_by_attribute(attribute)
    }

    /// Accept only password and text inputs
    pub fn validate(doc: &Document, element: ElementId) -> Result<FieldKind> {
        let tag = doc.tag(element);
        if tag != "input" {
            return Err(ToggleError::InvalidFieldKind {
                field: field_name(doc, element),
                kind: tag.to_string(),
            });
        }

        // An input without a type attribute is a text input
        let input_type = doc.get_attribute(element, attrs::TYPE).unwrap_or(kinds::TEXT);
        FieldKind::from_type(input_type).ok_or_else(|| ToggleError::InvalidFieldKind {
            field: field_name(doc, element),
            kind: input_type.to_string(),
        })
    }

    /// Whether the field already sits inside a wrapper with this class
    pub fn is_decorated(doc: &Document, element: ElementId, wrapper_class: &str) -> bool {
        doc.parent(element)
            .is_some_and(|parent| doc.has_class(parent, wrapper_class))
    }

    /// Scan, validate and register every new field. Invalid fields are
    /// skipped with a warning. Returns the newly registered elements.
    pub fn discover(&mut self, doc: &mut Document, attribute: &str, shortcut: &str) -> Vec<ElementId> {
        let mut added = Vec::new();
        for element in Self::scan(doc, attribute) {
            if self.contains(element) {
                continue;
            }
            match Self::validate(doc, element) {
                Ok(kind) => {
                    self.register(doc, element, kind, shortcut);
                    added.push(element);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping field");
                }
            }
        }
        if !added.is_empty() {
            info!(count = added.len(), total = self.fields.len(), "Registered fields");
        }
        added
    }

    fn register(&mut self, doc: &mut Document, element: ElementId, kind: FieldKind, shortcut: &str) {
        let original_label = doc.get_attribute(element, attrs::ARIA_LABEL).map(str::to_string);
        let visibility = Visibility::of_kind(kind);

        doc.set_attribute(
            element,
            attrs::ARIA_LABEL,
            &accessible_label(original_label.as_deref(), shortcut),
        );
        doc.set_attribute(element, attrs::ARIA_PRESSED, bool_attr(visibility.is_visible()));

        debug!(field = %field_name(doc, element), kind = kind.as_str(), "Registered field");
        self.fields.push(ManagedField {
            element,
            visibility,
            decoration: None,
            original_kind: kind,
            original_label,
        });
    }

    /// Rewrite aria-labels after the shortcut changed
    pub fn relabel(&self, doc: &mut Document, shortcut: &str) {
        for field in &self.fields {
            doc.set_attribute(
                field.element,
                attrs::ARIA_LABEL,
                &accessible_label(field.original_label.as_deref(), shortcut),
            );
        }
    }

    /// Put back the field's original kind and aria-label
    pub fn restore(doc: &mut Document, field: &ManagedField) {
        doc.set_attribute(field.element, attrs::TYPE, field.original_kind.as_str());
        doc.remove_attribute(field.element, attrs::ARIA_PRESSED);
        match &field.original_label {
            Some(label) => doc.set_attribute(field.element, attrs::ARIA_LABEL, label),
            None => doc.remove_attribute(field.element, attrs::ARIA_LABEL),
        }
    }

    /// Remove entries whose element was detached from the page
    pub fn prune(&mut self, doc: &Document) -> Vec<ManagedField> {
        let (kept, gone): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|f| doc.is_connected(f.element));
        self.fields = kept;
        if !gone.is_empty() {
            debug!(count = gone.len(), "Pruned detached fields");
        }
        gone
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.get(element).is_some()
    }

    pub fn get(&self, element: ElementId) -> Option<&ManagedField> {
        self.fields.iter().find(|f| f.element == element)
    }

    pub fn get_mut(&mut self, element: ElementId) -> Option<&mut ManagedField> {
        self.fields.iter_mut().find(|f| f.element == element)
    }

    /// Field whose decoration uses this wrapper
    pub fn find_by_wrapper(&self, wrapper: ElementId) -> Option<&ManagedField> {
        self.fields
            .iter()
            .find(|f| f.decoration.as_ref().is_some_and(|d| d.wrapper == wrapper))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManagedField> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ManagedField> {
        self.fields.iter_mut()
    }

    pub fn states(&self) -> Vec<FieldState> {
        self.fields
            .iter()
            .map(|f| FieldState {
                element: f.element,
                visibility: f.visibility,
                decorated: f.is_decorated(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove and return every entry
    pub fn drain(&mut self) -> Vec<ManagedField> {
        std::mem::take(&mut self.fields)
    }
}

pub(crate) fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
