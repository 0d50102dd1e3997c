use crate::Node;
use crate::StyleTag;

/// Decide how a node's docstring is read. Nodes without docstring content
/// have no style.
pub fn classify(node: &Node) -> Option<StyleTag> {
	if !node.has_docstring() {
		return None;
	}

	if node.is_interface {
		Some(StyleTag::Interface)
	} else {
		Some(StyleTag::Conventional)
	}
}
