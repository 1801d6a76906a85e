//! Structural legality checks for menu tree edits.
//!
//! All functions here are pure queries over a [`MenuTree`]: they never mutate
//! state, so the presentation layer can call the `can_*` façades for live
//! drag feedback while [`MenuEngine`](super::engine::MenuEngine) uses the
//! `check_*` variants to gate actual mutations.

use crate::core::error::RuleViolation;
use crate::core::node::{Node, NodeKind};
use crate::core::tree::MenuTree;

/// Checks whether the subtree rooted at `source` may be re-parented under
/// `destination` (`None` is the virtual root and always folder-like).
///
/// Rejects self-moves and moves into the source's own subtree before any
/// mutation happens, so cyclic structures can never be formed.
pub fn check_move_into(
    tree: &MenuTree,
    source: &str,
    destination: Option<&str>,
) -> Result<(), RuleViolation> {
    let Some(dest) = destination else {
        return Ok(());
    };
    if dest == source || tree.is_ancestor(source, dest) {
        return Err(RuleViolation::CyclicMove);
    }
    match tree.node(dest) {
        Some(node) if node.kind.can_have_children() => Ok(()),
        _ => Err(RuleViolation::ParentMustBeFolder),
    }
}

/// Boolean façade over [`check_move_into`] for drag feedback.
#[must_use]
pub fn can_move_into(tree: &MenuTree, source: &str, destination: Option<&str>) -> bool {
    check_move_into(tree, source, destination).is_ok()
}

/// Checks whether a node may be inserted under `parent` at `index`.
///
/// `index` addresses the slot before the sibling currently at that position
/// (an index past the end appends). `inserting_option_box` is `true` when the
/// node being placed is a command carrying the option-box flag.
///
/// Two families of rules apply:
/// - the slot must not fall between a command and its attached option box —
///   such inserts are rejected outright, never nudged to a nearby legal slot;
/// - an option box must land directly after a command that is not itself an
///   option box.
pub fn check_insert_at(
    tree: &MenuTree,
    inserting_option_box: bool,
    parent: Option<&str>,
    index: usize,
) -> Result<(), RuleViolation> {
    if let Some(pid) = parent {
        match tree.node(pid) {
            Some(node) if node.kind.can_have_children() => {}
            _ => return Err(RuleViolation::ParentMustBeFolder),
        }
    }

    let siblings = tree.children_of(parent);
    let index = index.min(siblings.len());
    let preceding = index
        .checked_sub(1)
        .and_then(|i| siblings.get(i))
        .and_then(|id| tree.node(id));
    let following = siblings.get(index).and_then(|id| tree.node(id));

    if preceding.is_some_and(Node::is_plain_command) && following.is_some_and(Node::is_option_box) {
        return Err(RuleViolation::OptionBoxPairSplit);
    }

    if inserting_option_box && !preceding.is_some_and(Node::is_plain_command) {
        return Err(RuleViolation::InvalidOptionBoxPosition);
    }

    Ok(())
}

/// Boolean façade over [`check_insert_at`] for drag feedback.
#[must_use]
pub fn can_insert_at(
    tree: &MenuTree,
    inserting_option_box: bool,
    parent: Option<&str>,
    index: usize,
) -> bool {
    check_insert_at(tree, inserting_option_box, parent, index).is_ok()
}

/// Checks whether the option-box flag on `id` may be set (or cleared) in
/// place, using the node's current position.
///
/// Clearing the flag is always legal. Setting it requires a command node
/// whose preceding sibling is a plain command and whose following sibling is
/// not an option box (the node cannot steal a neighbour's attachment).
pub fn check_become_option_box(
    tree: &MenuTree,
    id: &str,
    enable: bool,
) -> Result<(), RuleViolation> {
    let Some(node) = tree.node(id) else {
        return Err(RuleViolation::OptionBoxRequiresCommand);
    };
    if !matches!(node.kind, NodeKind::Command { .. }) {
        return Err(RuleViolation::OptionBoxRequiresCommand);
    }
    if !enable {
        return Ok(());
    }

    let parent = tree.parent_of(id).map(ToOwned::to_owned);
    let siblings = tree.children_of(parent.as_deref());
    let Some(position) = siblings.iter().position(|c| c == id) else {
        return Err(RuleViolation::InvalidOptionBoxPosition);
    };

    let preceding = position
        .checked_sub(1)
        .and_then(|i| siblings.get(i))
        .and_then(|cid| tree.node(cid));
    if !preceding.is_some_and(Node::is_plain_command) {
        return Err(RuleViolation::InvalidOptionBoxPosition);
    }

    let following = siblings.get(position + 1).and_then(|cid| tree.node(cid));
    if following.is_some_and(Node::is_option_box) {
        return Err(RuleViolation::InvalidOptionBoxPosition);
    }

    Ok(())
}

/// Boolean façade over [`check_become_option_box`].
#[must_use]
pub fn can_become_option_box(tree: &MenuTree, id: &str, enable: bool) -> bool {
    check_become_option_box(tree, id, enable).is_ok()
}

/// Deletion is always structurally permitted; dependent option boxes are
/// handled by the engine's cascade policy, never by refusing the delete.
#[must_use]
pub fn can_delete(tree: &MenuTree, id: &str) -> bool {
    tree.contains(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::{CommandLanguage, NodeDraft};

    fn insert_command(tree: &mut MenuTree, label: &str, parent: Option<&str>, index: usize) -> String {
        let node = Node::from_draft(NodeDraft::command(label, CommandLanguage::Python, "pass"));
        let id = node.id.clone();
        tree.insert(node, parent, index).unwrap();
        id
    }

    fn insert_option_box(tree: &mut MenuTree, label: &str, parent: Option<&str>, index: usize) -> String {
        let node = Node::from_draft(
            NodeDraft::command(label, CommandLanguage::Python, "pass").as_option_box(),
        );
        let id = node.id.clone();
        tree.insert(node, parent, index).unwrap();
        id
    }

    fn insert_folder(tree: &mut MenuTree, label: &str, parent: Option<&str>, index: usize) -> String {
        let node = Node::from_draft(NodeDraft::folder(label));
        let id = node.id.clone();
        tree.insert(node, parent, index).unwrap();
        id
    }

    #[test]
    fn test_move_into_own_subtree_is_cyclic() {
        let mut tree = MenuTree::new();
        let outer = insert_folder(&mut tree, "Outer", None, 0);
        let inner = insert_folder(&mut tree, "Inner", Some(&outer), 0);

        assert_eq!(
            check_move_into(&tree, &outer, Some(&inner)),
            Err(RuleViolation::CyclicMove)
        );
        assert_eq!(
            check_move_into(&tree, &outer, Some(&outer)),
            Err(RuleViolation::CyclicMove)
        );
        assert!(can_move_into(&tree, &inner, None));
    }

    #[test]
    fn test_move_into_non_folder_is_rejected() {
        let mut tree = MenuTree::new();
        let cmd = insert_command(&mut tree, "A", None, 0);
        let folder = insert_folder(&mut tree, "Tools", None, 1);

        assert_eq!(
            check_move_into(&tree, &folder, Some(&cmd)),
            Err(RuleViolation::ParentMustBeFolder)
        );
        assert!(can_move_into(&tree, &cmd, Some(&folder)));
    }

    #[test]
    fn test_insert_between_command_and_option_box_is_rejected() {
        let mut tree = MenuTree::new();
        let _a = insert_command(&mut tree, "A", None, 0);
        let _b = insert_option_box(&mut tree, "B", None, 1);

        assert_eq!(
            check_insert_at(&tree, false, None, 1),
            Err(RuleViolation::OptionBoxPairSplit)
        );
        // Above the pair and below the pair are both fine.
        assert!(can_insert_at(&tree, false, None, 0));
        assert!(can_insert_at(&tree, false, None, 2));
    }

    #[test]
    fn test_option_box_insert_requires_plain_command_before() {
        let mut tree = MenuTree::new();
        let _a = insert_command(&mut tree, "A", None, 0);
        let folder = insert_folder(&mut tree, "Tools", None, 1);

        // First slot has no preceding sibling.
        assert_eq!(
            check_insert_at(&tree, true, None, 0),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
        // Directly after the command is legal.
        assert!(can_insert_at(&tree, true, None, 1));
        // After the folder is not.
        assert_eq!(
            check_insert_at(&tree, true, None, 2),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
        // Inside an empty folder there is no anchor either.
        assert_eq!(
            check_insert_at(&tree, true, Some(&folder), 0),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
    }

    #[test]
    fn test_become_option_box_checks_current_position() {
        let mut tree = MenuTree::new();
        let a = insert_command(&mut tree, "A", None, 0);
        let b = insert_command(&mut tree, "B", None, 1);
        let sep = Node::from_draft(NodeDraft::separator());
        let sep_id = sep.id.clone();
        tree.insert(sep, None, 2).unwrap();
        let c = insert_command(&mut tree, "C", None, 3);

        // First sibling can never become an option box.
        assert_eq!(
            check_become_option_box(&tree, &a, true),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
        // Directly after a plain command is legal.
        assert!(can_become_option_box(&tree, &b, true));
        // Directly after a separator is not.
        assert_eq!(
            check_become_option_box(&tree, &c, true),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
        // Separators and folders can never carry the flag.
        assert_eq!(
            check_become_option_box(&tree, &sep_id, true),
            Err(RuleViolation::OptionBoxRequiresCommand)
        );
        // Clearing is always legal.
        assert!(can_become_option_box(&tree, &c, false));
    }

    #[test]
    fn test_become_option_box_cannot_steal_attachment() {
        let mut tree = MenuTree::new();
        let _a = insert_command(&mut tree, "A", None, 0);
        let b = insert_command(&mut tree, "B", None, 1);
        let _c = insert_option_box(&mut tree, "C", None, 2);

        // B anchors C; flagging B would leave C dangling behind an option box.
        assert_eq!(
            check_become_option_box(&tree, &b, true),
            Err(RuleViolation::InvalidOptionBoxPosition)
        );
    }

    #[test]
    fn test_can_delete() {
        let mut tree = MenuTree::new();
        let a = insert_command(&mut tree, "A", None, 0);
        assert!(can_delete(&tree, &a));
        assert!(!can_delete(&tree, "missing"));
    }
}
