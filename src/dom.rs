//! Headless element tree
//!
//! A minimal page model: elements with a tag, ordered attributes, text or
//! opaque markup, parent/child links, a focused element, and listeners that
//! receive events dispatched target-first and then bubbling up through the
//! ancestors to the document.
//!
//! Elements live in an arena owned by the [`Document`] and are addressed by
//! [`ElementId`]. Removing an element only detaches it; ids stay valid, and
//! callers check [`Document::is_connected`] to tell stale references apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Handle to an element owned by a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Element(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    KeyDown,
    Click,
    Custom(String),
}

/// Keydown payload: key name plus modifier flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Key(KeyboardEvent),
    Click,
    Custom(serde_json::Value),
}

/// An event travelling through the tree
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub target: ElementId,
    pub payload: EventPayload,
    pub bubbles: bool,
    pub default_prevented: bool,
}

impl Event {
    pub fn custom(name: &str, target: ElementId, detail: serde_json::Value) -> Self {
        Self {
            kind: EventKind::Custom(name.to_string()),
            target,
            payload: EventPayload::Custom(detail),
            bubbles: true,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn keyboard(&self) -> Option<&KeyboardEvent> {
        match &self.payload {
            EventPayload::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&serde_json::Value> {
        match &self.payload {
            EventPayload::Custom(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Listener callback. Receives the document so it can mutate the tree.
pub type Handler = Rc<dyn Fn(&mut Document, &mut Event)>;

struct Listener {
    id: ListenerId,
    target: ListenerTarget,
    kind: EventKind,
    handler: Handler,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    inner_html: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: Vec::new(),
            text: String::new(),
            inner_html: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

pub struct Document {
    nodes: Vec<Node>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
    active: Option<ElementId>,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.nodes.len())
            .field("listeners", &self.listeners.len())
            .field("active", &self.active)
            .finish()
    }
}

impl Document {
    /// Empty page with `<html>`, `<head>` and `<body>`
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node::new("html")],
            root: ElementId(0),
            head: ElementId(0),
            body: ElementId(0),
            active: None,
            listeners: Vec::new(),
            next_listener: 0,
        };
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn head(&self) -> ElementId {
        self.head
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    // ==========================================================================
    // Tree structure
    // ==========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.nodes.push(Node::new(tag));
        ElementId(self.nodes.len() - 1)
    }

    fn node(&self, id: ElementId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn tag(&self, id: ElementId) -> &str {
        &self.node(id).tag
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.node(id).children
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Attached (directly or transitively) to the document root
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.contains(self.root, id)
    }

    /// Detach an element from its parent. No-op if already detached.
    pub fn remove(&mut self, id: ElementId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
        if self.active.is_some_and(|active| self.contains(id, active)) {
            self.active = None;
        }
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference` (or last when
    /// `reference` is `None` or not a child of `parent`). Moving an element
    /// into its own subtree is ignored.
    pub fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: Option<ElementId>) {
        if self.contains(child, parent) {
            trace!(parent = %parent, child = %child, "refusing to insert element into itself");
            return;
        }
        self.remove(child);
        let children = &mut self.nodes[parent.0].children;
        let index = reference
            .and_then(|r| children.iter().position(|c| *c == r))
            .unwrap_or(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    // ==========================================================================
    // Attributes, classes and content
    // ==========================================================================

    pub fn get_attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let attributes = &mut self.node_mut(id).attributes;
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        self.node_mut(id).attributes.retain(|(n, _)| n != name);
    }

    pub fn attributes(&self, id: ElementId) -> &[(String, String)] {
        &self.node(id).attributes
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get_attribute(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if class.is_empty() || self.has_class(id, class) {
            return;
        }
        let classes = match self.get_attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &classes);
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        let Some(existing) = self.get_attribute(id, "class") else {
            return;
        };
        let classes: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let classes = classes.join(" ");
        self.set_attribute(id, "class", &classes);
    }

    /// Add or remove `class` depending on `on`
    pub fn set_class(&mut self, id: ElementId, class: &str, on: bool) {
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn text(&self, id: ElementId) -> &str {
        &self.node(id).text
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        self.node_mut(id).text = text.to_string();
    }

    pub fn inner_html(&self, id: ElementId) -> &str {
        &self.node(id).inner_html
    }

    /// Opaque markup rendered inside the element (icons, style rules)
    pub fn set_inner_html(&mut self, id: ElementId, markup: &str) {
        self.node_mut(id).inner_html = markup.to_string();
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Connected elements in document order
    pub fn descendants(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.get_attribute(*id, "id") == Some(element_id))
    }

    /// Connected elements carrying `attribute`, in document order
    pub fn query_by_attribute(&self, attribute: &str) -> Vec<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.has_attribute(*id, attribute))
            .collect()
    }

    /// Nearest inclusive ancestor carrying `class`
    pub fn closest_with_class(&self, id: ElementId, class: &str) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.has_class(node, class) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    // ==========================================================================
    // Focus
    // ==========================================================================

    pub fn focus(&mut self, id: ElementId) {
        if self.is_connected(id) {
            self.active = Some(id);
        }
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Focused element, if it is still attached
    pub fn active_element(&self) -> Option<ElementId> {
        self.active.filter(|id| self.is_connected(*id))
    }

    // ==========================================================================
    // Listeners and dispatch
    // ==========================================================================

    pub fn add_listener(&mut self, target: ListenerTarget, kind: EventKind, handler: Handler) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push(Listener {
            id,
            target,
            kind,
            handler,
        });
        id
    }

    /// Returns false when the listener was already gone
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        before != self.listeners.len()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|l| l.id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run listeners on the target, then (if the event bubbles) on each
    /// ancestor and finally on the document. Returns the event so callers
    /// can inspect `default_prevented`.
    pub fn dispatch(&mut self, mut event: Event) -> Event {
        let mut path = vec![ListenerTarget::Element(event.target)];
        if event.bubbles {
            let mut current = self.parent(event.target);
            while let Some(id) = current {
                path.push(ListenerTarget::Element(id));
                current = self.parent(id);
            }
            path.push(ListenerTarget::Document);
        }

        let queued: Vec<(ListenerId, Handler)> = path
            .iter()
            .flat_map(|target| {
                self.listeners
                    .iter()
                    .filter(|l| l.target == *target && l.kind == event.kind)
                    .map(|l| (l.id, Rc::clone(&l.handler)))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (id, handler) in queued {
            // A handler earlier in the path may have removed this one
            if !self.has_listener(id) {
                continue;
            }
            handler(self, &mut event);
        }
        event
    }

    /// Keydown delivered to the focused element (or body)
    pub fn key_down(&mut self, key: KeyboardEvent) -> Event {
        let target = self.active_element().unwrap_or(self.body);
        self.dispatch(Event {
            kind: EventKind::KeyDown,
            target,
            payload: EventPayload::Key(key),
            bubbles: true,
            default_prevented: false,
        })
    }

    pub fn click(&mut self, target: ElementId) -> Event {
        self.dispatch(Event {
            kind: EventKind::Click,
            target,
            payload: EventPayload::Click,
            bubbles: true,
            default_prevented: false,
        })
    }

    // ==========================================================================
    // Serialization
    // ==========================================================================

    /// Markup for `id` and its subtree
    pub fn to_html(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: ElementId, out: &mut String) {
        let node = self.node(id);
        out.push('<');
        out.push_str(&node.tag);
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
        }
        out.push('>');
        if node.tag == "input" {
            return;
        }
        out.push_str(&node.text);
        out.push_str(&node.inner_html);
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag));
    }
}
