use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::error::PickerError;
use crate::placement::{Rect, Viewport};

pub const DEMO_PAGE: &str = include_str!("../assets/demo_page.json");

/// One input-like element of the host page.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: Option<String>,
    pub label: Option<String>,
    /// Bare markers: valueless attributes and class names.
    pub markers: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    /// Document coordinates; subtract the page scroll for viewport coordinates.
    pub rect: Rect,
    pub value: String,
}

impl Element {
    /// True when `name` is present either as a bare marker or as an attribute.
    pub fn has_marker(&self, name: &str) -> bool {
        self.markers.iter().any(|marker| marker == name) || self.attributes.contains_key(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Human-readable name for logs and the GUI.
    pub fn describe(&self) -> String {
        match (&self.label, &self.id) {
            (Some(label), _) => label.clone(),
            (None, Some(id)) => id.clone(),
            (None, None) => format!(
                "<unnamed {}>",
                self.markers.first().map(String::as_str).unwrap_or("element")
            ),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChangeEvent {
    pub element: String,
    pub value: String,
}

/// The host document pickers bind to.
#[derive(Debug, Clone)]
pub struct Page {
    title: String,
    viewport: Viewport,
    elements: Vec<Element>,
    scroll_y: f32,
    changes: Vec<ChangeEvent>,
}

impl Page {
    pub fn new(title: impl Into<String>, viewport: Viewport, elements: Vec<Element>) -> Self {
        Self {
            title: title.into(),
            viewport,
            elements,
            scroll_y: 0.0,
            changes: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|element| element.id.as_deref() == Some(id))
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.element(id).map(|element| element.value.as_str())
    }

    /// Writes an input's value, recording a change notification when asked.
    pub fn set_value(&mut self, id: &str, value: &str, notify: bool) -> Result<(), PickerError> {
        let element = self
            .elements
            .iter_mut()
            .find(|element| element.id.as_deref() == Some(id))
            .ok_or_else(|| PickerError::MissingElement {
                kind: "page",
                id: id.to_string(),
            })?;
        element.value = value.to_string();
        if notify {
            debug!(element = id, value, "change");
            self.changes.push(ChangeEvent {
                element: id.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    pub fn changes(&self) -> &[ChangeEvent] {
        &self.changes
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, scroll_y: f32) {
        self.scroll_y = scroll_y.max(0.0);
    }

    /// Element geometry in viewport coordinates.
    pub fn anchor(&self, id: &str) -> Option<Rect> {
        self.element(id).map(|element| Rect {
            top: element.rect.top - self.scroll_y,
            ..element.rect
        })
    }
}

pub fn load_page(path: &Path) -> Result<Page> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read page file {}", path.display()))?;
    parse_page_text(&content)
}

pub fn parse_page_text(content: &str) -> Result<Page> {
    let raw = serde_json::from_str::<PageFile>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if raw.version != 1 {
        bail!(
            "unsupported page version {}; expected version 1",
            raw.version
        );
    }
    if raw.viewport.width <= 0.0 || raw.viewport.height <= 0.0 {
        bail!(
            "viewport must be larger than 0x0, got {}x{}",
            raw.viewport.width,
            raw.viewport.height
        );
    }

    let mut ids = HashSet::new();
    let mut elements = Vec::with_capacity(raw.elements.len());
    for element in raw.elements {
        if let Some(id) = &element.id {
            if id.trim().is_empty() {
                bail!("element id must not be blank");
            }
            if !ids.insert(id.clone()) {
                bail!("duplicate element id found: {id}");
            }
        }
        elements.push(Element {
            id: element.id,
            label: element.label,
            markers: element.markers,
            attributes: element.attributes,
            rect: Rect::new(
                element.rect.left,
                element.rect.top,
                element.rect.width,
                element.rect.height,
            ),
            value: element.value,
        });
    }

    Ok(Page::new(
        raw.title,
        Viewport {
            width: raw.viewport.width,
            height: raw.viewport.height,
        },
        elements,
    ))
}

#[derive(Debug, Deserialize)]
struct PageFile {
    version: u32,
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    viewport: ViewportFile,
    #[serde(default)]
    elements: Vec<ElementFile>,
}

#[derive(Debug, Deserialize)]
struct ViewportFile {
    width: f32,
    height: f32,
}

impl Default for ViewportFile {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ElementFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    markers: Vec<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    rect: RectFile,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize, Default)]
struct RectFile {
    #[serde(default)]
    left: f32,
    #[serde(default)]
    top: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
}

fn default_title() -> String {
    "Dashboard".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_page() {
        let json = r#"
{
  "version": 1,
  "title": "Billing",
  "viewport": { "width": 1024, "height": 768 },
  "elements": [
    {
      "id": "due-date",
      "label": "Due date",
      "markers": ["data-date-picker"],
      "attributes": { "data-date-format": "dd-mm-yyyy" },
      "rect": { "left": 40, "top": 120, "width": 240, "height": 40 }
    },
    {
      "markers": ["date-picker"],
      "value": "preset"
    }
  ]
}
"#;
        let page = parse_page_text(json).expect("valid page");
        assert_eq!(page.title(), "Billing");
        assert_eq!(page.viewport().width, 1024.0);
        assert_eq!(page.elements().len(), 2);

        let due = page.element("due-date").expect("due-date");
        assert!(due.has_marker("data-date-picker"));
        assert!(due.has_marker("data-date-format"));
        assert_eq!(due.attribute("data-date-format"), Some("dd-mm-yyyy"));
        assert_eq!(due.rect.bottom(), 160.0);

        let unnamed = &page.elements()[1];
        assert_eq!(unnamed.id, None);
        assert_eq!(unnamed.rect, Rect::default());
        assert_eq!(unnamed.value, "preset");
        assert_eq!(unnamed.describe(), "<unnamed date-picker>");
    }

    #[test]
    fn demo_page_is_valid() {
        let page = parse_page_text(DEMO_PAGE).expect("demo page");
        assert!(page.elements().iter().all(|element| element.id.is_some()));
    }

    #[test]
    fn reports_json_position() {
        let err = parse_page_text("{ \"version\": 1, ").expect_err("truncated JSON");
        assert!(err.to_string().contains("invalid JSON at line 1"));
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = parse_page_text(r#"{ "version": 2 }"#).expect_err("version 2");
        assert!(err.to_string().contains("unsupported page version 2"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"
{
  "version": 1,
  "elements": [ { "id": "dup" }, { "id": "dup" } ]
}
"#;
        let err = parse_page_text(json).expect_err("duplicate ids should fail");
        assert!(err.to_string().contains("duplicate element id"));
    }

    #[test]
    fn values_and_change_log() {
        let mut page = parse_page_text(DEMO_PAGE).expect("demo page");
        let id = page.elements()[0].id.clone().expect("id");
        page.set_value(&id, "draft", false).expect("known id");
        page.set_value(&id, "final", true).expect("known id");
        assert_eq!(page.value(&id), Some("final"));
        assert_eq!(
            page.changes(),
            &[ChangeEvent {
                element: id.clone(),
                value: "final".to_string(),
            }]
        );
        assert!(matches!(
            page.set_value("nope", "x", true),
            Err(PickerError::MissingElement { .. })
        ));
    }

    #[test]
    fn anchors_follow_scroll() {
        let mut page = parse_page_text(DEMO_PAGE).expect("demo page");
        let id = page.elements()[0].id.clone().expect("id");
        let before = page.anchor(&id).expect("anchor");
        page.scroll_to(100.0);
        let after = page.anchor(&id).expect("anchor");
        assert_eq!(after.top, before.top - 100.0);
        page.scroll_to(-5.0);
        assert_eq!(page.scroll_y(), 0.0);
    }
}
