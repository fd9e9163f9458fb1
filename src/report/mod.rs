//! The report tree and everything that produces or consumes it.
//!
//! A report mirrors `Assembly → Type → {Field, Method → Parameter}`:
//!
//! ```text
//! Assembly Name
//! └─ Type Namespace FullName
//!    ├─ Field Name Type
//!    └─ Method Name ReturnType
//!       └─ Parameter Name Type
//! ```
//!
//! - [`builder`] walks a [`crate::metadata::MetadataSource`] and assembles the tree
//! - [`xml`] serializes the finished tree
//!
//! A [`ReportNode`] is assembled once with its consuming builder methods and is read-only
//! afterwards.

pub mod builder;
pub mod xml;

pub use builder::ReportBuilder;

/// Tag of the root node
pub const ASSEMBLY_TAG: &str = "Assembly";
/// Tag of a type node
pub const TYPE_TAG: &str = "Type";
/// Tag of a field node
pub const FIELD_TAG: &str = "Field";
/// Tag of a method node
pub const METHOD_TAG: &str = "Method";
/// Tag of a parameter node
pub const PARAMETER_TAG: &str = "Parameter";

/// A labeled tree node: tag, ordered attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNode {
    tag: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<ReportNode>,
}

impl ReportNode {
    /// Create a node without attributes or children.
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        ReportNode {
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute. Attributes keep insertion order.
    #[must_use]
    pub fn with_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn with_child(mut self, child: ReportNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child nodes.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = ReportNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// The node's tag.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// All attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    /// Value of the attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All children in order.
    #[must_use]
    pub fn children(&self) -> &[ReportNode] {
        &self.children
    }

    /// Children carrying `tag`, in order.
    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ReportNode> {
        self.children.iter().filter(move |child| child.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_order() {
        let node = ReportNode::new(METHOD_TAG)
            .with_attribute("Name", "Move")
            .with_attribute("ReturnType", "Void")
            .with_child(
                ReportNode::new(PARAMETER_TAG)
                    .with_attribute("Name", "z")
                    .with_attribute("Type", "Single"),
            )
            .with_child(
                ReportNode::new(PARAMETER_TAG)
                    .with_attribute("Name", "a")
                    .with_attribute("Type", "Single"),
            );

        assert_eq!(node.tag(), METHOD_TAG);
        assert_eq!(node.attributes()[0], ("Name", "Move".to_string()));
        assert_eq!(node.attribute("ReturnType"), Some("Void"));
        assert_eq!(node.attribute("Missing"), None);

        let names: Vec<_> = node
            .children_tagged(PARAMETER_TAG)
            .filter_map(|p| p.attribute("Name"))
            .collect();
        assert_eq!(names, ["z", "a"]);
    }

    #[test]
    fn children_tagged_filters() {
        let node = ReportNode::new(TYPE_TAG).with_children([
            ReportNode::new(FIELD_TAG),
            ReportNode::new(METHOD_TAG),
            ReportNode::new(FIELD_TAG),
        ]);

        assert_eq!(node.children().len(), 3);
        assert_eq!(node.children_tagged(FIELD_TAG).count(), 2);
        assert_eq!(node.children_tagged(METHOD_TAG).count(), 1);
    }
}
