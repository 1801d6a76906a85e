//! Menu document (de)serialization and merge.
//!
//! The persisted form is a JSON object with a format version and a top-level
//! ordered `items` array; children nest under `children` on folder entries.
//! Derived data (paths) is never written. Documents are untrusted input —
//! hand-edited files are expected — so deserialization re-validates every
//! structural invariant and reports the offending node's path and rule
//! instead of repairing the tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::{FormatError, RuleViolation};
use crate::core::node::{CommandLanguage, Node, NodeKind};
use crate::core::tree::MenuTree;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Top-level persisted structure of a menu document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub items: Vec<DocNode>,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// One persisted node. Kind-specific fields are omitted where they do not
/// apply; separators carry only their id, kind, and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocNode {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_option_box: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
    pub created_at: i64,
    pub modified_at: i64,
}

/// Encodes `tree` into its persisted form, depth-first and order-preserving.
#[must_use]
pub fn serialize(tree: &MenuTree) -> MenuDocument {
    MenuDocument {
        version: DOCUMENT_VERSION,
        items: encode_level(tree, tree.roots()),
    }
}

fn encode_level(tree: &MenuTree, ids: &[String]) -> Vec<DocNode> {
    ids.iter()
        .filter_map(|id| tree.node(id))
        .map(|node| encode_node(tree, node))
        .collect()
}

fn encode_node(tree: &MenuTree, node: &Node) -> DocNode {
    let mut doc = DocNode {
        id: node.id.clone(),
        kind: node.kind.name().to_string(),
        created_at: node.created_at,
        modified_at: node.modified_at,
        ..DocNode::default()
    };
    match &node.kind {
        NodeKind::Folder { children } => {
            doc.label = Some(node.label.clone());
            doc.icon = node.icon.clone();
            doc.children = encode_level(tree, children);
        }
        NodeKind::Command {
            language,
            command,
            is_option_box,
        } => {
            doc.label = Some(node.label.clone());
            doc.icon = node.icon.clone();
            doc.language = Some(language.as_str().to_string());
            doc.command = Some(command.clone());
            doc.is_option_box = *is_option_box;
        }
        NodeKind::Separator => {}
    }
    doc
}

/// Parses document text and re-validates the resulting tree.
///
/// # Errors
///
/// Returns a [`FormatError`] naming the offending node path and rule for any
/// structural problem; the JSON text itself failing to parse is reported as
/// [`FormatError::Json`].
pub fn deserialize(text: &str) -> Result<MenuTree, FormatError> {
    let document: MenuDocument = serde_json::from_str(text)?;
    from_document(document)
}

/// Builds a validated tree from a parsed document.
///
/// # Errors
///
/// See [`deserialize`].
pub fn from_document(document: MenuDocument) -> Result<MenuTree, FormatError> {
    if document.version > DOCUMENT_VERSION {
        return Err(FormatError::UnsupportedVersion(document.version));
    }
    let mut tree = MenuTree::new();
    decode_level(&mut tree, None, &document.items, "")?;
    tree.check_invariants()?;
    Ok(tree)
}

fn decode_level(
    tree: &mut MenuTree,
    parent: Option<&str>,
    items: &[DocNode],
    parent_path: &str,
) -> Result<(), FormatError> {
    for (index, item) in items.iter().enumerate() {
        decode_node(tree, parent, item, index, parent_path)?;
    }
    Ok(())
}

fn decode_node(
    tree: &mut MenuTree,
    parent: Option<&str>,
    item: &DocNode,
    index: usize,
    parent_path: &str,
) -> Result<(), FormatError> {
    let segment = item
        .label
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| format!("[{}]", item.kind));
    let path = if parent_path.is_empty() {
        segment
    } else {
        format!("{parent_path}/{segment}")
    };

    if item.id.is_empty() || tree.contains(&item.id) {
        return Err(FormatError::InvalidId {
            path,
            id: item.id.clone(),
        });
    }

    let kind = match item.kind.as_str() {
        "folder" => {
            if item.is_option_box {
                return Err(FormatError::Invariant {
                    path,
                    rule: RuleViolation::OptionBoxRequiresCommand,
                });
            }
            NodeKind::Folder {
                children: Vec::new(),
            }
        }
        "command" => {
            if !item.children.is_empty() {
                return Err(FormatError::ChildrenOnLeaf { path });
            }
            let language = match item.language.as_deref() {
                None | Some("python") => CommandLanguage::Python,
                Some("mel") => CommandLanguage::Mel,
                Some(other) => {
                    return Err(FormatError::UnknownLanguage {
                        path,
                        language: other.to_string(),
                    })
                }
            };
            NodeKind::Command {
                language,
                command: item.command.clone().unwrap_or_default(),
                is_option_box: item.is_option_box,
            }
        }
        "separator" => {
            if !item.children.is_empty() {
                return Err(FormatError::ChildrenOnLeaf { path });
            }
            if item.is_option_box {
                return Err(FormatError::Invariant {
                    path,
                    rule: RuleViolation::OptionBoxRequiresCommand,
                });
            }
            NodeKind::Separator
        }
        other => {
            return Err(FormatError::UnknownKind {
                path,
                kind: other.to_string(),
            })
        }
    };

    let label = match &kind {
        NodeKind::Separator => String::new(),
        _ => match item.label.as_deref() {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => return Err(FormatError::MissingLabel { path }),
        },
    };
    let icon = match &kind {
        NodeKind::Separator => None,
        _ => item.icon.clone().filter(|i| !i.is_empty()),
    };

    let node = Node {
        id: item.id.clone(),
        label,
        icon,
        kind,
        created_at: item.created_at,
        modified_at: item.modified_at,
    };
    let id = node.id.clone();
    tree.insert(node, parent, index)
        .map_err(|rule| FormatError::Invariant {
            path: path.clone(),
            rule,
        })?;

    decode_level(tree, Some(&id), &item.children, &path)
}

/// Combines `incoming` into a copy of `base`.
///
/// Incoming top-level nodes are appended after the existing ones; an incoming
/// folder whose label matches an existing folder at the same level merges
/// into it recursively instead of being duplicated. Existing nodes are never
/// reordered. Any incoming id already present in the base gets a fresh one.
/// The combined tree is re-validated wholesale before being returned — a
/// violation rejects the entire merge and `base` is left untouched.
///
/// # Errors
///
/// Returns [`FormatError::Invariant`] naming the first node whose placement
/// would break a structural rule.
pub fn merge(base: &MenuTree, incoming: &MenuTree) -> Result<MenuTree, FormatError> {
    let mut merged = base.clone();
    merge_level(&mut merged, None, incoming, incoming.roots())?;
    merged.check_invariants()?;
    log::info!(
        "Merged {} incoming entries into a tree of {}",
        incoming.len(),
        merged.len()
    );
    Ok(merged)
}

fn merge_level(
    merged: &mut MenuTree,
    dest_parent: Option<&str>,
    incoming: &MenuTree,
    ids: &[String],
) -> Result<(), FormatError> {
    for id in ids {
        let Some(node) = incoming.node(id) else {
            continue;
        };
        if matches!(node.kind, NodeKind::Folder { .. }) {
            let existing = merged
                .children_of(dest_parent)
                .iter()
                .find(|cid| {
                    merged.node(cid).is_some_and(|candidate| {
                        matches!(candidate.kind, NodeKind::Folder { .. })
                            && candidate.label == node.label
                    })
                })
                .cloned();
            if let Some(existing_id) = existing {
                merge_level(merged, Some(&existing_id), incoming, node.child_ids())?;
                continue;
            }
        }
        copy_subtree(merged, dest_parent, incoming, id)?;
    }
    Ok(())
}

fn copy_subtree(
    merged: &mut MenuTree,
    dest_parent: Option<&str>,
    incoming: &MenuTree,
    id: &str,
) -> Result<(), FormatError> {
    let Some(node) = incoming.node(id) else {
        return Ok(());
    };
    let mut copy = node.clone();
    if merged.contains(&copy.id) {
        copy.id = Uuid::new_v4().to_string();
    }
    let child_ids = match &mut copy.kind {
        NodeKind::Folder { children } => std::mem::take(children),
        _ => Vec::new(),
    };

    let new_id = copy.id.clone();
    let index = merged.children_of(dest_parent).len();
    let path = incoming.path_of(id);
    merged
        .insert(copy, dest_parent, index)
        .map_err(|rule| FormatError::Invariant { path, rule })?;

    for child in &child_ids {
        copy_subtree(merged, Some(&new_id), incoming, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::NodeDraft;

    fn insert(tree: &mut MenuTree, draft: NodeDraft, parent: Option<&str>) -> String {
        let node = Node::from_draft(draft);
        let id = node.id.clone();
        let index = tree.children_of(parent).len();
        tree.insert(node, parent, index).unwrap();
        id
    }

    fn sample_tree() -> MenuTree {
        let mut tree = MenuTree::new();
        let tools = insert(&mut tree, NodeDraft::folder("Tools"), None);
        insert(
            &mut tree,
            NodeDraft::command("Export", CommandLanguage::Python, "export()"),
            Some(&tools),
        );
        insert(
            &mut tree,
            NodeDraft::command("Export Options", CommandLanguage::Python, "export_ui()")
                .as_option_box(),
            Some(&tools),
        );
        insert(&mut tree, NodeDraft::separator(), Some(&tools));
        insert(
            &mut tree,
            NodeDraft::command("Rebuild", CommandLanguage::Mel, "rebuild;"),
            Some(&tools),
        );
        tree
    }

    #[test]
    fn test_round_trip_preserves_tree() {
        let tree = sample_tree();
        let json = serde_json::to_string_pretty(&serialize(&tree)).unwrap();
        let restored = deserialize(&json).unwrap();
        assert_eq!(restored, tree);
    }

    #[test]
    fn test_separator_entries_omit_command_fields() {
        let tree = sample_tree();
        let document = serialize(&tree);
        let separator = &document.items[0].children[2];
        assert_eq!(separator.kind, "separator");
        assert!(separator.label.is_none());
        assert!(separator.command.is_none());
        assert!(separator.icon.is_none());
    }

    #[test]
    fn test_path_is_never_persisted() {
        let tree = sample_tree();
        let json = serde_json::to_string(&serialize(&tree)).unwrap();
        assert!(!json.contains("\"path\""));
    }

    #[test]
    fn test_deserialize_rejects_unknown_kind() {
        let json = r#"{"version":1,"items":[{"id":"a","kind":"widget","label":"X"}]}"#;
        match deserialize(json) {
            Err(FormatError::UnknownKind { path, kind }) => {
                assert_eq!(path, "X");
                assert_eq!(kind, "widget");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_children_on_option_box() {
        let json = r#"{"version":1,"items":[
            {"id":"a","kind":"command","label":"A","command":"a()"},
            {"id":"b","kind":"command","label":"B","command":"b()","isOptionBox":true,
             "children":[{"id":"c","kind":"separator"}]}
        ]}"#;
        match deserialize(json) {
            Err(FormatError::ChildrenOnLeaf { path }) => assert_eq!(path, "B"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_leading_option_box_with_path() {
        let json = r#"{"version":1,"items":[
            {"id":"f","kind":"folder","label":"Tools","children":[
                {"id":"b","kind":"command","label":"B","command":"b()","isOptionBox":true}
            ]}
        ]}"#;
        match deserialize(json) {
            Err(FormatError::Invariant { path, rule }) => {
                assert_eq!(path, "Tools/B");
                assert_eq!(rule, RuleViolation::InvalidOptionBoxPosition);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_duplicate_id() {
        let json = r#"{"version":1,"items":[
            {"id":"a","kind":"separator"},
            {"id":"a","kind":"separator"}
        ]}"#;
        assert!(matches!(
            deserialize(json),
            Err(FormatError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_missing_label() {
        let json = r#"{"version":1,"items":[{"id":"a","kind":"folder"}]}"#;
        assert!(matches!(
            deserialize(json),
            Err(FormatError::MissingLabel { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_future_version() {
        let json = r#"{"version":99,"items":[]}"#;
        assert!(matches!(
            deserialize(json),
            Err(FormatError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_deserialize_defaults_language_to_python() {
        let json = r#"{"version":1,"items":[{"id":"a","kind":"command","label":"A","command":"a()"}]}"#;
        let tree = deserialize(json).unwrap();
        let node = tree.node("a").unwrap();
        match &node.kind {
            NodeKind::Command { language, .. } => assert_eq!(*language, CommandLanguage::Python),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_merge_appends_and_reuses_same_named_folder() {
        let base = sample_tree();
        let mut incoming = MenuTree::new();
        let tools = insert(&mut incoming, NodeDraft::folder("Tools"), None);
        insert(
            &mut incoming,
            NodeDraft::command("Publish", CommandLanguage::Python, "publish()"),
            Some(&tools),
        );
        insert(
            &mut incoming,
            NodeDraft::command("About", CommandLanguage::Python, "about()"),
            None,
        );

        let merged = merge(&base, &incoming).unwrap();
        // Still a single "Tools" folder, now with one extra child, plus the
        // new top-level command.
        assert_eq!(merged.roots().len(), 2);
        let tools_id = &merged.roots()[0];
        assert_eq!(merged.node(tools_id).unwrap().label, "Tools");
        assert_eq!(merged.children_of(Some(tools_id)).len(), 5);
        let publish_id = merged.children_of(Some(tools_id)).last().unwrap().clone();
        assert_eq!(merged.node(&publish_id).unwrap().label, "Publish");
    }

    #[test]
    fn test_merge_never_reorders_base() {
        let base = sample_tree();
        let mut incoming = MenuTree::new();
        insert(&mut incoming, NodeDraft::folder("Extras"), None);

        let merged = merge(&base, &incoming).unwrap();
        assert_eq!(merged.roots()[0], base.roots()[0]);
    }

    #[test]
    fn test_merge_reassigns_colliding_ids() {
        let base = sample_tree();
        let merged = merge(&base, &base).unwrap();
        // Merging a tree into itself reuses the "Tools" folder and copies its
        // children with fresh ids.
        assert!(merged.check_invariants().is_ok());
        assert_eq!(merged.len(), base.len() * 2 - 1);
    }

    #[test]
    fn test_merge_rejects_invariant_violation_wholesale() {
        let base = sample_tree();
        // Hand-build an incoming tree whose only entry is an option box; at
        // the top level it would be first among siblings... appended after
        // the base "Tools" folder it still violates the anchor rule.
        let mut incoming = MenuTree::new();
        let node = Node::from_draft(
            NodeDraft::command("Orphan", CommandLanguage::Python, "o()").as_option_box(),
        );
        incoming.insert(node, None, 0).unwrap();

        let before = base.clone();
        let result = merge(&base, &incoming);
        assert!(matches!(result, Err(FormatError::Invariant { .. })));
        assert_eq!(base, before);
    }
}
