//! Page fixtures
//!
//! JSON description of an element tree, used by the driver binary to build
//! a [`Document`] to run against.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::dom::{Document, ElementId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

/// Top-level fixture: the contents of `<body>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

impl PageSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page fixture {}", path.display()))?;
        let page: PageSpec = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse page fixture {}", path.display()))?;
        info!(path = %path.display(), elements = page.body.len(), "Loaded page fixture");
        Ok(page)
    }

    pub fn build(&self) -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        for spec in &self.body {
            build_element(&mut doc, body, spec);
        }
        doc
    }
}

/// Create `spec` and its subtree under `parent`
pub fn build_element(doc: &mut Document, parent: ElementId, spec: &ElementSpec) -> ElementId {
    let el = doc.create_element(&spec.tag);
    if let Some(id) = &spec.id {
        doc.set_attribute(el, "id", id);
    }
    for (name, value) in &spec.attrs {
        doc.set_attribute(el, name, value);
    }
    if !spec.text.is_empty() {
        doc.set_text(el, &spec.text);
    }
    doc.append_child(parent, el);
    for child in &spec.children {
        build_element(doc, el, child);
    }
    el
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_json() {
        let json = r#"{
            "body": [
                { "tag": "form", "id": "login", "children": [
                    { "tag": "label", "text": "Password" },
                    { "tag": "input", "id": "pw", "attrs": { "type": "password", "data-pw-toggle": "" } }
                ] }
            ]
        }"#;
        let page: PageSpec = serde_json::from_str(json).unwrap();
        let doc = page.build();

        let form = doc.get_element_by_id("login").unwrap();
        let pw = doc.get_element_by_id("pw").unwrap();
        assert_eq!(doc.parent(pw), Some(form));
        assert_eq!(doc.children(form).len(), 2);
        assert!(doc.has_attribute(pw, "data-pw-toggle"));
        assert_eq!(doc.text(doc.children(form)[0]), "Password");
    }
}
