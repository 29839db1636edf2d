use serde::{Deserialize, Serialize};

use super::{Document, Node};

/// A flat, serializable element. Nesting is not modeled; the selectors the
/// watcher uses only ever match on id, class or tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryElement {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Space-separated class list, as in `className`.
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl MemoryElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = Some(class_name.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_src(mut self, src: &str) -> Self {
        self.src = Some(src.to_string());
        self
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.class_name
                .as_deref()
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

impl Node for MemoryElement {
    fn id(&self) -> Option<String> {
        self.id.clone()
    }

    fn class_name(&self) -> Option<String> {
        self.class_name.clone()
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn src(&self) -> Option<String> {
        if self.tag.eq_ignore_ascii_case("img") {
            self.src.clone()
        } else {
            None
        }
    }
}

/// An in-memory page: elements in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryDocument {
    pub elements: Vec<MemoryElement>,
}

impl MemoryDocument {
    pub fn new(elements: Vec<MemoryElement>) -> Self {
        Self { elements }
    }

    pub fn push(&mut self, element: MemoryElement) {
        self.elements.push(element);
    }

    /// Drop every element matching `selector`.
    pub fn remove(&mut self, selector: &str) {
        self.elements.retain(|e| !e.matches(selector));
    }
}

impl Document for MemoryDocument {
    type Node = MemoryElement;

    fn query_selector(&self, selector: &str) -> Option<MemoryElement> {
        self.elements.iter().find(|e| e.matches(selector)).cloned()
    }
}
