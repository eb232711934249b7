//! Scripted interaction
//!
//! A script is a JSON list of steps (focus, keydown, button clicks, option
//! changes, page mutations) replayed against one controller. Failing steps
//! are logged and skipped, the way a page would catch and carry on.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{OptionsUpdate, ToggleMode};
use crate::dom::{Document, ElementId, KeyboardEvent};
use crate::fixture::{ElementSpec, build_element};
use crate::toggle::PasswordToggle;
use crate::visibility::ToggleTarget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Focus { id: String },
    Blur,
    KeyDown(KeyboardEvent),
    /// Click the toggle button next to the field with this id
    ClickToggle { field: String },
    SetMode { mode: ToggleMode },
    SetKeyCombo { combo: String },
    UpdateConfig { options: OptionsUpdate },
    Refresh,
    /// Programmatic toggle of one field, or all when `field` is absent
    Toggle {
        #[serde(default)]
        field: Option<String>,
    },
    Append {
        #[serde(default)]
        parent: Option<String>,
        element: ElementSpec,
    },
    Remove { id: String },
    Destroy,
}

pub fn load(path: &Path) -> Result<Vec<Step>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    info!(path = %path.display(), steps = steps.len(), "Loaded script");
    Ok(steps)
}

fn element(doc: &Document, id: &str) -> Result<ElementId> {
    doc.get_element_by_id(id)
        .with_context(|| format!("No element with id '{id}'"))
}

/// Button sitting in the same wrapper as the field
fn toggle_button(doc: &Document, toggle: &PasswordToggle, field: ElementId) -> Option<ElementId> {
    let wrapper = doc.parent(field)?;
    let class = toggle.options().toggle_button_class;
    doc.children(wrapper)
        .iter()
        .copied()
        .find(|id| doc.has_class(*id, &class))
}

/// Run one step
pub fn apply(doc: &mut Document, toggle: &PasswordToggle, step: &Step) -> Result<()> {
    debug!(step = ?step, "Running step");
    match step {
        Step::Focus { id } => {
            let el = element(doc, id)?;
            doc.focus(el);
        }
        Step::Blur => doc.blur(),
        Step::KeyDown(key) => {
            let event = doc.key_down(key.clone());
            debug!(prevented = event.default_prevented, "Key dispatched");
        }
        Step::ClickToggle { field } => {
            let el = element(doc, field)?;
            let button = toggle_button(doc, toggle, el)
                .with_context(|| format!("Field '{field}' has no toggle button"))?;
            doc.click(button);
        }
        Step::SetMode { mode } => toggle.set_mode(*mode)?,
        Step::SetKeyCombo { combo } => toggle.set_key_combo(doc, combo)?,
        Step::UpdateConfig { options } => toggle.update_config(doc, options)?,
        Step::Refresh => {
            toggle.refresh(doc)?;
        }
        Step::Toggle { field } => {
            let target = match field {
                Some(id) => ToggleTarget::Field(element(doc, id)?),
                None => ToggleTarget::All,
            };
            toggle.toggle(doc, target)?;
        }
        Step::Append { parent, element: spec } => {
            let parent = match parent {
                Some(id) => element(doc, id)?,
                None => doc.body(),
            };
            build_element(doc, parent, spec);
        }
        Step::Remove { id } => {
            let el = element(doc, id)?;
            doc.remove(el);
        }
        Step::Destroy => toggle.destroy(doc)?,
    }
    Ok(())
}

/// Run every step; returns how many failed
pub fn run(doc: &mut Document, toggle: &PasswordToggle, steps: &[Step]) -> usize {
    let mut failed = 0;
    for (index, step) in steps.iter().enumerate() {
        if let Err(e) = apply(doc, toggle, step) {
            warn!(step = index, error = %format!("{e:#}"), "Step failed");
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::dom::{Event, EventKind, ListenerTarget};
    use crate::fixture::PageSpec;
    use crate::key_combo::Platform;
    use crate::visibility::ToggleEvent;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Document, PasswordToggle, Rc<RefCell<Vec<ToggleEvent>>>) {
        let page: PageSpec = serde_json::from_str(
            r#"{ "body": [ { "tag": "form", "id": "f", "children": [
                { "tag": "input", "id": "a", "attrs": { "type": "password", "data-pw-toggle": "" } },
                { "tag": "input", "id": "b", "attrs": { "type": "password", "data-pw-toggle": "" } }
            ] } ] }"#,
        )
        .unwrap();
        let mut doc = page.build();

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

        let options = Options {
            platform: Platform::Linux,
            ..Options::default()
        };
        let toggle = PasswordToggle::new(&mut doc, options).unwrap();
        (doc, toggle, seen)
    }

    #[test]
    fn test_parse_steps() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                { "action": "focus", "id": "a" },
                { "action": "key_down", "key": "8", "ctrl": true },
                { "action": "click_toggle", "field": "b" },
                { "action": "set_mode", "mode": "all" },
                { "action": "update_config", "options": { "keyCombo": "alt+p" } },
                { "action": "toggle" },
                { "action": "destroy" }
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 7);
        assert_eq!(
            steps[1],
            Step::KeyDown(KeyboardEvent {
                key: "8".to_string(),
                ctrl: true,
                ..Default::default()
            })
        );
        assert_eq!(steps[3], Step::SetMode { mode: ToggleMode::All });
        assert_eq!(steps[5], Step::Toggle { field: None });
    }

    #[test]
    fn test_run_focus_and_shortcut() {
        let (mut doc, toggle, seen) = setup();
        let steps = vec![
            Step::Focus { id: "b".to_string() },
            Step::KeyDown(KeyboardEvent {
                key: "8".to_string(),
                ctrl: true,
                ..Default::default()
            }),
            Step::ClickToggle { field: "a".to_string() },
        ];
        assert_eq!(run(&mut doc, &toggle, &steps), 0);

        let fields: Vec<_> = seen.borrow().iter().map(|e| e.field.clone()).collect();
        assert_eq!(fields, vec!["b", "a"]);
    }

    #[test]
    fn test_failed_steps_are_counted_and_skipped() {
        let (mut doc, toggle, seen) = setup();
        let steps = vec![
            Step::Focus { id: "missing".to_string() },
            Step::SetKeyCombo { combo: "nope".to_string() },
            Step::Toggle { field: None },
        ];
        assert_eq!(run(&mut doc, &toggle, &steps), 2);
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(toggle.options().key_combo(), "ctrl+8");
    }

    #[test]
    fn test_append_then_refresh_decorates() {
        let (mut doc, toggle, _) = setup();
        let spec: ElementSpec = serde_json::from_str(
            r#"{ "tag": "input", "id": "c", "attrs": { "type": "text", "data-pw-toggle": "" } }"#,
        )
        .unwrap();
        let steps = vec![
            Step::Append {
                parent: Some("f".to_string()),
                element: spec,
            },
            Step::Refresh,
            Step::ClickToggle { field: "c".to_string() },
        ];
        assert_eq!(run(&mut doc, &toggle, &steps), 0);
        assert_eq!(toggle.fields().len(), 3);

        let c = doc.get_element_by_id("c").unwrap();
        assert_eq!(doc.get_attribute(c, "type"), Some("password"));
    }
}
