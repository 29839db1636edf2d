//! The slice of the DOM the watcher reads.
//!
//! The watcher never touches a browser type directly; the wasm binding
//! implements these traits over `web-sys`, and [`memory::MemoryDocument`]
//! implements them for tests and trace replay.

pub mod memory;

pub use memory::{MemoryDocument, MemoryElement};

/// A node inserted into, or queried from, the page.
pub trait Node {
    /// The node's `id`, if it is an element with one.
    fn id(&self) -> Option<String>;

    /// The node's full `className` string.
    fn class_name(&self) -> Option<String>;

    /// Rendered text of the element.
    fn text(&self) -> String;

    /// The `src` of an image element. `None` for anything else.
    fn src(&self) -> Option<String>;

    /// Name used to recognize marker insertions: the id when non-empty,
    /// otherwise the class name.
    fn marker_name(&self) -> Option<String> {
        match self.id() {
            Some(id) if !id.is_empty() => Some(id),
            _ => self.class_name(),
        }
    }
}

/// Read-only access to the page.
pub trait Document {
    type Node: Node;

    /// First element matching `selector`, in document order.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;
}

/// One structural change delivered in a mutation batch.
#[derive(Debug, Clone)]
pub struct MutationRecord<N> {
    pub added_nodes: Vec<N>,
}

impl<N> MutationRecord<N> {
    pub fn new(added_nodes: Vec<N>) -> Self {
        Self { added_nodes }
    }
}
