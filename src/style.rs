//! Injected style rules
//!
//! One `<style>` block per page, shared by every controller on that page.
//! The block is keyed by a stable element id and carries a user count so the
//! last controller to be destroyed removes it.

use tracing::{debug, info};

use crate::config::ClassNames;
use crate::constants::style::{REFCOUNT_ATTRIBUTE, STYLE_ELEMENT_ID};
use crate::dom::Document;

/// Supplies the CSS injected for wrapper, button and tooltip
pub trait StyleProvider {
    /// Element id guarding against duplicate injection
    fn style_id(&self) -> &str {
        STYLE_ELEMENT_ID
    }

    fn stylesheet(&self, classes: &ClassNames) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyles;

impl StyleProvider for DefaultStyles {
    fn stylesheet(&self, classes: &ClassNames) -> String {
        let ClassNames {
            button,
            active,
            wrapper,
            tooltip,
        } = classes;
        format!(
            ".{wrapper} {{ position: relative; display: inline-block; }}\n\
             .{button} {{ position: absolute; right: 8px; top: 50%; transform: translateY(-50%); \
             background: none; border: none; cursor: pointer; padding: 4px; color: #666; }}\n\
             .{button}:hover {{ color: #333; }}\n\
             .{button}.{active} {{ color: #2563eb; }}\n\
             .{tooltip} {{ position: absolute; bottom: 100%; right: 0; margin-bottom: 4px; \
             padding: 4px 8px; background: #333; color: #fff; font-size: 12px; border-radius: 4px; \
             white-space: nowrap; opacity: 0; pointer-events: none; transition: opacity 0.2s; }}\n\
             .{wrapper}:hover .{tooltip} {{ opacity: 1; }}\n"
        )
    }
}

fn users(doc: &Document, style: crate::dom::ElementId) -> u32 {
    doc.get_attribute(style, REFCOUNT_ATTRIBUTE)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Inject the style block unless one with the same id exists; either way
/// count this controller as a user
pub fn acquire(doc: &mut Document, provider: &dyn StyleProvider, classes: &ClassNames) {
    let id = provider.style_id();
    if let Some(style) = doc.get_element_by_id(id) {
        let count = users(doc, style) + 1;
        doc.set_attribute(style, REFCOUNT_ATTRIBUTE, &count.to_string());
        debug!(style_id = %id, users = count, "style block already present");
        return;
    }

    let style = doc.create_element("style");
    doc.set_attribute(style, "id", id);
    doc.set_attribute(style, REFCOUNT_ATTRIBUTE, "1");
    doc.set_inner_html(style, &provider.stylesheet(classes));
    let head = doc.head();
    doc.append_child(head, style);
    info!(style_id = %id, "injected style block");
}

/// Drop one user; remove the block when none remain
pub fn release(doc: &mut Document, provider: &dyn StyleProvider) {
    let id = provider.style_id();
    let Some(style) = doc.get_element_by_id(id) else {
        return;
    };
    let count = users(doc, style).saturating_sub(1);
    if count == 0 {
        doc.remove(style);
        info!(style_id = %id, "removed style block");
    } else {
        doc.set_attribute(style, REFCOUNT_ATTRIBUTE, &count.to_string());
    }
}
