#![forbid(unsafe_code)]

//! In-memory reference implementation of [`FocusHost`].
//!
//! `MemoryTree` is a small arena tree used by Vigil's own tests and by
//! embeddings that want focus semantics without a real UI layer. Nodes
//! carry a role (for footer-button queries), a dialog section tag, and a
//! focusable flag.
//!
//! Detachment marks a subtree as no longer live but leaves parent and
//! child-order links in place, so a focus-restore walk can still start
//! from a detached node's last known position. A detached node is never
//! focusable and never appears in [`FocusHost::focusables`] results.

use crate::host::{FocusHost, StackLayer, SurfacePart};

/// Handle to a node in a [`MemoryTree`].
pub type NodeId = usize;

/// What kind of control a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Any non-button node (containers, inputs, links).
    Generic,

    /// A button control. Footer queries only return buttons.
    Button,
}

/// Which dialog region a node belongs to.
///
/// The tag is per node, not inherited: a focusable input inside a dialog
/// body is tagged [`Section::Body`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Structural chrome: containers, headers, anything outside body and
    /// footer.
    Chrome,

    /// The dialog body region.
    Body,

    /// The dialog footer region.
    Footer,
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    role: Role,
    section: Section,
    focusable: bool,
    attached: bool,
    layer: Option<StackLayer>,
}

/// An in-memory focus host.
#[derive(Debug)]
pub struct MemoryTree {
    nodes: Vec<NodeData>,
    focused: Option<NodeId>,
}

impl MemoryTree {
    /// Create a tree containing only a root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                role: Role::Generic,
                section: Section::Chrome,
                focusable: false,
                attached: true,
                layer: None,
            }],
            focused: None,
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        0
    }

    /// Number of nodes ever inserted, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn insert(&mut self, parent: NodeId, role: Role, section: Section, focusable: bool) -> NodeId {
        let attached = self.nodes[parent].attached;
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            role,
            section,
            focusable,
            attached,
            layer: None,
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Insert a non-focusable container node.
    pub fn insert_container(&mut self, parent: NodeId) -> NodeId {
        self.insert(parent, Role::Generic, Section::Chrome, false)
    }

    /// Insert a focusable non-button node tagged with `section`.
    pub fn insert_focusable(&mut self, parent: NodeId, section: Section) -> NodeId {
        self.insert(parent, Role::Generic, section, true)
    }

    /// Insert a focusable button tagged with `section`.
    pub fn insert_button(&mut self, parent: NodeId, section: Section) -> NodeId {
        self.insert(parent, Role::Button, section, true)
    }

    /// Insert a non-focusable leaf tagged with `section`.
    pub fn insert_inert(&mut self, parent: NodeId, section: Section) -> NodeId {
        self.insert(parent, Role::Generic, section, false)
    }

    /// Change whether a node can receive focus. Making the currently
    /// focused node unfocusable drops focus.
    pub fn set_focusable(&mut self, node: NodeId, focusable: bool) {
        self.nodes[node].focusable = focusable;
        if !focusable && self.focused == Some(node) {
            self.focused = None;
        }
    }

    /// Detach `node` and its entire subtree from the live tree.
    ///
    /// Links are retained so position queries (`parent`, `prev_sibling`)
    /// keep answering about the old location. Focus is dropped if it was
    /// inside the subtree.
    pub fn detach(&mut self, node: NodeId) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            self.nodes[current].attached = false;
            if self.focused == Some(current) {
                self.focused = None;
            }
            pending.extend(self.nodes[current].children.iter().copied());
        }
    }

    /// The stacking assignment last applied to `node`, if any.
    #[must_use]
    pub fn layer(&self, node: NodeId) -> Option<StackLayer> {
        self.nodes[node].layer
    }

    fn collect_focusables(&self, node: NodeId, part: SurfacePart, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node].children {
            let data = &self.nodes[child];
            if data.attached && data.focusable && Self::part_matches(part, data) {
                out.push(child);
            }
            self.collect_focusables(child, part, out);
        }
    }

    fn part_matches(part: SurfacePart, data: &NodeData) -> bool {
        match part {
            SurfacePart::Whole => true,
            SurfacePart::Body => data.section == Section::Body,
            SurfacePart::Footer => data.section == Section::Footer && data.role == Role::Button,
        }
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusHost for MemoryTree {
    type Node = NodeId;

    fn is_attached(&self, node: NodeId) -> bool {
        self.nodes[node].attached
    }

    fn is_focusable(&self, node: NodeId) -> bool {
        let data = &self.nodes[node];
        data.attached && data.focusable
    }

    fn focus(&mut self, node: NodeId) {
        if self.is_focusable(node) {
            self.focused = Some(node);
        }
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node].parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&child| child == node)?;
        if position == 0 {
            None
        } else {
            Some(siblings[position - 1])
        }
    }

    fn focusables(&self, container: NodeId, part: SurfacePart) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_focusables(container, part, &mut out);
        out
    }

    fn raise(&mut self, dialog: NodeId, layer: StackLayer) {
        self.nodes[dialog].layer = Some(layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_has_only_root() {
        let tree = MemoryTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.focused(), None);
        assert!(!tree.is_focusable(tree.root()));
    }

    #[test]
    fn focus_lands_only_on_focusable_nodes() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let inert = tree.insert_inert(root, Section::Chrome);
        let input = tree.insert_focusable(root, Section::Body);

        tree.focus(inert);
        assert_eq!(tree.focused(), None);

        tree.focus(input);
        assert_eq!(tree.focused(), Some(input));
    }

    #[test]
    fn focusables_returns_traversal_order() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let dialog = tree.insert_container(root);
        let body = tree.insert_container(dialog);
        let first = tree.insert_focusable(body, Section::Body);
        let second = tree.insert_focusable(body, Section::Body);
        let footer_ok = tree.insert_button(dialog, Section::Footer);

        assert_eq!(
            tree.focusables(dialog, SurfacePart::Whole),
            vec![first, second, footer_ok]
        );
        assert_eq!(
            tree.focusables(dialog, SurfacePart::Body),
            vec![first, second]
        );
    }

    #[test]
    fn footer_query_skips_non_buttons() {
        let mut tree = MemoryTree::new();
        let dialog = tree.insert_container(tree.root());
        let link = tree.insert_focusable(dialog, Section::Footer);
        let button = tree.insert_button(dialog, Section::Footer);

        assert_eq!(tree.focusables(dialog, SurfacePart::Footer), vec![button]);
        assert_eq!(
            tree.focusables(dialog, SurfacePart::Whole),
            vec![link, button]
        );
    }

    #[test]
    fn detach_marks_subtree_and_drops_focus() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let branch = tree.insert_container(root);
        let leaf = tree.insert_focusable(branch, Section::Body);
        tree.focus(leaf);
        assert_eq!(tree.focused(), Some(leaf));

        tree.detach(branch);
        assert!(!tree.is_attached(branch));
        assert!(!tree.is_attached(leaf));
        assert!(!tree.is_focusable(leaf));
        assert_eq!(tree.focused(), None);
    }

    #[test]
    fn detached_node_keeps_position_links() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let older = tree.insert_focusable(root, Section::Chrome);
        let younger = tree.insert_focusable(root, Section::Chrome);

        tree.detach(younger);
        assert_eq!(tree.parent(younger), Some(root));
        assert_eq!(tree.prev_sibling(younger), Some(older));
    }

    #[test]
    fn detached_nodes_never_enumerate() {
        let mut tree = MemoryTree::new();
        let dialog = tree.insert_container(tree.root());
        let kept = tree.insert_focusable(dialog, Section::Body);
        let gone = tree.insert_focusable(dialog, Section::Body);

        tree.detach(gone);
        assert_eq!(tree.focusables(dialog, SurfacePart::Whole), vec![kept]);
    }

    #[test]
    fn insert_under_detached_parent_is_detached() {
        let mut tree = MemoryTree::new();
        let branch = tree.insert_container(tree.root());
        tree.detach(branch);
        let late = tree.insert_focusable(branch, Section::Body);
        assert!(!tree.is_attached(late));
    }

    #[test]
    fn raise_records_layer() {
        let mut tree = MemoryTree::new();
        let dialog = tree.insert_container(tree.root());
        assert_eq!(tree.layer(dialog), None);

        tree.raise(dialog, StackLayer::new(10, 11));
        assert_eq!(tree.layer(dialog), Some(StackLayer::new(10, 11)));
    }

    #[test]
    fn unfocusable_focused_node_drops_focus() {
        let mut tree = MemoryTree::new();
        let input = tree.insert_focusable(tree.root(), Section::Body);
        tree.focus(input);
        tree.set_focusable(input, false);
        assert_eq!(tree.focused(), None);
    }
}
