//! Arena-backed menu tree: nodes addressed by id, folders holding ordered
//! child id lists.
//!
//! `MenuTree` is a plain data structure with structural accessors and low-level
//! attach/detach primitives. It does not enforce legality rules beyond basic
//! shape (a parent must exist and be a folder) — rule checking lives in
//! [`validate`](super::validate) and every user-facing mutation funnels through
//! [`MenuEngine`](super::engine::MenuEngine) so invariant checks cannot be
//! bypassed.

use std::collections::HashMap;

use crate::core::error::{FormatError, RuleViolation};
use crate::core::node::{Node, NodeKind};

/// A single menu tree: an arena of [`Node`]s plus an ordered list of
/// top-level ids (the virtual root folder).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuTree {
    nodes: HashMap<String, Node>,
    roots: Vec<String>,
    parents: HashMap<String, Option<String>>,
}

impl MenuTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` exists in the tree.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Ordered ids of the top-level nodes.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Ordered child ids under `parent`; `None` addresses the virtual root.
    ///
    /// Returns an empty slice for unknown ids and for leaf kinds.
    #[must_use]
    pub fn children_of(&self, parent: Option<&str>) -> &[String] {
        match parent {
            None => &self.roots,
            Some(id) => match self.nodes.get(id) {
                Some(node) => node.child_ids(),
                None => &[],
            },
        }
    }

    /// The folder containing `id`, or `None` for top-level (or unknown) ids.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).and_then(Option::as_deref)
    }

    /// Position of `id` within its sibling list.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let parent = self.parent_of(id).map(ToOwned::to_owned);
        self.children_of(parent.as_deref())
            .iter()
            .position(|c| c == id)
    }

    /// Returns `true` if `ancestor` lies on the parent chain of `id`.
    ///
    /// A node is not its own ancestor.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.parent_of(id);
        while let Some(pid) = current {
            if pid == ancestor {
                return true;
            }
            current = self.parent_of(pid);
        }
        false
    }

    /// Derived display path of `id`: ancestor folder labels plus the node's
    /// own label, joined by `/`. Separators render as `[separator]`.
    ///
    /// Paths are display/import convenience only and are never persisted.
    #[must_use]
    pub fn path_of(&self, id: &str) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(cid) = current {
            if let Some(node) = self.node(cid) {
                segments.push(Self::path_segment(node));
            }
            current = self.parent_of(cid);
        }
        segments.reverse();
        segments.join("/")
    }

    fn path_segment(node: &Node) -> String {
        if node.label.is_empty() {
            format!("[{}]", node.kind.name())
        } else {
            node.label.clone()
        }
    }

    /// Pre-order traversal of all node ids.
    #[must_use]
    pub fn walk(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk_into(&self.roots, &mut out);
        out
    }

    fn walk_into(&self, ids: &[String], out: &mut Vec<String>) {
        for id in ids {
            out.push(id.clone());
            if let Some(node) = self.node(id) {
                self.walk_into(node.child_ids(), out);
            }
        }
    }

    /// Inserts a detached node under `parent` at `index` (clamped to the
    /// sibling count).
    ///
    /// This is a structural primitive: it checks only that the parent exists
    /// and is a folder and that the id is not already present. Rule legality
    /// is the engine's responsibility.
    pub(crate) fn insert(
        &mut self,
        node: Node,
        parent: Option<&str>,
        index: usize,
    ) -> Result<(), RuleViolation> {
        if self.contains(&node.id) {
            // Duplicate ids are caught before insertion; reject rather than overwrite.
            return Err(RuleViolation::ParentMustBeFolder);
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        if let Err(rule) = self.attach(&id, parent, index) {
            self.nodes.remove(&id);
            return Err(rule);
        }
        Ok(())
    }

    /// Links an already-stored, currently detached node into a sibling list.
    pub(crate) fn attach(
        &mut self,
        id: &str,
        parent: Option<&str>,
        index: usize,
    ) -> Result<(), RuleViolation> {
        match parent {
            None => {
                let index = index.min(self.roots.len());
                self.roots.insert(index, id.to_string());
            }
            Some(pid) => {
                let Some(parent_node) = self.nodes.get_mut(pid) else {
                    return Err(RuleViolation::ParentMustBeFolder);
                };
                let NodeKind::Folder { children } = &mut parent_node.kind else {
                    return Err(RuleViolation::ParentMustBeFolder);
                };
                let index = index.min(children.len());
                children.insert(index, id.to_string());
            }
        }
        self.parents
            .insert(id.to_string(), parent.map(ToOwned::to_owned));
        Ok(())
    }

    /// Unlinks `id` from its sibling list, leaving the node (and its subtree)
    /// in the arena. Returns the old parent and position for restoration.
    pub(crate) fn detach(&mut self, id: &str) -> Option<(Option<String>, usize)> {
        if !self.contains(id) {
            return None;
        }
        let parent = self.parents.remove(id)?;
        let siblings = match &parent {
            None => &mut self.roots,
            Some(pid) => match &mut self.nodes.get_mut(pid)?.kind {
                NodeKind::Folder { children } => children,
                _ => return None,
            },
        };
        let index = siblings.iter().position(|c| c == id)?;
        siblings.remove(index);
        Some((parent, index))
    }

    /// Removes `id` and its entire subtree from the tree.
    ///
    /// Returns the removed ids in pre-order (the subtree root first), or
    /// `None` if the id is unknown.
    pub(crate) fn remove_subtree(&mut self, id: &str) -> Option<Vec<String>> {
        self.detach(id)?;
        let mut removed = Vec::new();
        self.remove_arena_recursive(id, &mut removed);
        Some(removed)
    }

    fn remove_arena_recursive(&mut self, id: &str, removed: &mut Vec<String>) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        self.parents.remove(id);
        removed.push(id.to_string());
        for child in node.child_ids() {
            self.remove_arena_recursive(child, removed);
        }
    }

    /// Re-validates the whole tree, returning the first violation with the
    /// offending node's derived path.
    ///
    /// Used on deserialized and merged trees (untrusted input) and by tests;
    /// engine operations keep these invariants by construction.
    pub fn check_invariants(&self) -> Result<(), FormatError> {
        let reachable = self.walk();
        if reachable.len() != self.nodes.len() {
            for id in self.nodes.keys() {
                if !reachable.contains(id) {
                    return Err(FormatError::InvalidId {
                        path: "<unreachable>".to_string(),
                        id: id.clone(),
                    });
                }
            }
        }

        let mut sibling_lists = vec![(None, &self.roots)];
        for (id, node) in &self.nodes {
            if let NodeKind::Folder { children } = &node.kind {
                sibling_lists.push((Some(id.clone()), children));
            }
        }

        for (_parent, siblings) in sibling_lists {
            let mut prev: Option<&Node> = None;
            for child_id in siblings {
                let Some(child) = self.node(child_id) else {
                    return Err(FormatError::InvalidId {
                        path: "<missing>".to_string(),
                        id: child_id.clone(),
                    });
                };
                if child.is_option_box() && !prev.is_some_and(Node::is_plain_command) {
                    return Err(FormatError::Invariant {
                        path: self.path_of(child_id),
                        rule: RuleViolation::InvalidOptionBoxPosition,
                    });
                }
                prev = Some(child);
            }
        }
        Ok(())
    }
}
