//! XML serialization of a [`ReportNode`] tree.
//!
//! Output is an XML 1.0 document with a UTF-8 declaration and two-space indentation. Nodes
//! without children are written as empty elements. Attribute values are escaped. The same tree
//! always serializes to the same bytes.

use std::{fs, path::Path};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};

use crate::{report::ReportNode, Result};

/// Serialize `root` into an in-memory XML document.
///
/// # Errors
/// Returns an error if the writer fails.
///
/// # Examples
///
/// ```rust
/// use asminspect::report::{xml::to_xml, ReportNode};
///
/// let root = ReportNode::new("Assembly").with_attribute("Name", "Game");
/// let bytes = to_xml(&root).unwrap();
///
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<Assembly Name=\"Game\"/>\n"
/// );
/// ```
pub fn to_xml(root: &ReportNode) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_node(&mut writer, root)?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize `root` and write it to `path` in a single call.
///
/// Serialization happens entirely in memory first, so a failure never leaves a partially
/// written document behind.
///
/// # Errors
/// Returns an error if serialization fails, or [`crate::Error::Io`] if
/// the file cannot be written.
pub fn write_xml(root: &ReportNode, path: &Path) -> Result<()> {
    let bytes = to_xml(root)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ReportNode) -> Result<()> {
    let mut start = BytesStart::new(node.tag());
    for (name, value) in node.attributes() {
        start.push_attribute((*name, value.as_str()));
    }

    if node.children().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in node.children() {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ASSEMBLY_TAG, FIELD_TAG, METHOD_TAG, PARAMETER_TAG, TYPE_TAG};

    fn sample() -> ReportNode {
        ReportNode::new(ASSEMBLY_TAG)
            .with_attribute("Name", "Game")
            .with_child(
                ReportNode::new(TYPE_TAG)
                    .with_attribute("Namespace", "Game")
                    .with_attribute("FullName", "Game.Player")
                    .with_child(
                        ReportNode::new(FIELD_TAG)
                            .with_attribute("Name", "Health")
                            .with_attribute("Type", "Int32"),
                    )
                    .with_child(
                        ReportNode::new(METHOD_TAG)
                            .with_attribute("Name", "Move")
                            .with_attribute("ReturnType", "Void")
                            .with_child(
                                ReportNode::new(PARAMETER_TAG)
                                    .with_attribute("Name", "direction")
                                    .with_attribute("Type", "Vector3"),
                            ),
                    ),
            )
    }

    #[test]
    fn document_layout() {
        let xml = String::from_utf8(to_xml(&sample()).unwrap()).unwrap();
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<Assembly Name=\"Game\">\n",
            "  <Type Namespace=\"Game\" FullName=\"Game.Player\">\n",
            "    <Field Name=\"Health\" Type=\"Int32\"/>\n",
            "    <Method Name=\"Move\" ReturnType=\"Void\">\n",
            "      <Parameter Name=\"direction\" Type=\"Vector3\"/>\n",
            "    </Method>\n",
            "  </Type>\n",
            "</Assembly>\n",
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_namespace_is_written() {
        let root = ReportNode::new(ASSEMBLY_TAG).with_attribute("Name", "Tool").with_child(
            ReportNode::new(TYPE_TAG)
                .with_attribute("Namespace", "")
                .with_attribute("FullName", "Program"),
        );

        let xml = String::from_utf8(to_xml(&root).unwrap()).unwrap();
        assert!(xml.contains("<Type Namespace=\"\" FullName=\"Program\"/>"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let root = ReportNode::new(METHOD_TAG)
            .with_attribute("Name", "op_<&>")
            .with_attribute("ReturnType", "\"quoted\"");

        let xml = String::from_utf8(to_xml(&root).unwrap()).unwrap();
        assert!(xml.contains("Name=\"op_&lt;&amp;&gt;\""));
        assert!(xml.contains("ReturnType=\"&quot;quoted&quot;\""));
    }

    #[test]
    fn serialization_is_deterministic() {
        assert_eq!(to_xml(&sample()).unwrap(), to_xml(&sample()).unwrap());
    }

    #[test]
    fn write_xml_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Game_Export.xml");

        write_xml(&sample(), &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), to_xml(&sample()).unwrap());
    }
}
