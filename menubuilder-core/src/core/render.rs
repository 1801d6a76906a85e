//! Read-only render traversal consumed by the host's menu renderer.
//!
//! [`render_plan`] flattens a validated tree into an ordered, depth-annotated
//! entry list: folders open submenus, commands become actionable items,
//! separators become dividers, and an option-box command is folded into its
//! anchoring item rather than appearing on its own. The renderer is expected
//! to clear any previously built menus before replaying a plan — the core
//! holds no rendering identity.

use serde::Serialize;

use crate::core::node::{CommandLanguage, Node, NodeKind};
use crate::core::tree::MenuTree;

/// A secondary "extra options" control attached to a rendered item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionBoxEntry {
    pub id: String,
    pub language: CommandLanguage,
    pub command: String,
    pub icon: Option<String>,
}

/// One step of the flattened render sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderEntry {
    /// A folder: open a submenu at `depth` and render subsequent deeper
    /// entries inside it.
    #[serde(rename_all = "camelCase")]
    Menu {
        id: String,
        label: String,
        icon: Option<String>,
        depth: usize,
    },
    /// An actionable command entry, with its option box folded in when the
    /// next sibling carries one.
    #[serde(rename_all = "camelCase")]
    Item {
        id: String,
        label: String,
        icon: Option<String>,
        language: CommandLanguage,
        command: String,
        depth: usize,
        option_box: Option<OptionBoxEntry>,
    },
    /// A non-interactive divider.
    #[serde(rename_all = "camelCase")]
    Divider { id: String, depth: usize },
}

/// Flattens `tree` into an ordered render sequence.
#[must_use]
pub fn render_plan(tree: &MenuTree) -> Vec<RenderEntry> {
    let mut out = Vec::with_capacity(tree.len());
    emit_siblings(tree, tree.roots(), 0, &mut out);
    out
}

fn emit_siblings(tree: &MenuTree, ids: &[String], depth: usize, out: &mut Vec<RenderEntry>) {
    let mut index = 0;
    while index < ids.len() {
        let id = &ids[index];
        index += 1;
        let Some(node) = tree.node(id) else {
            continue;
        };
        match &node.kind {
            NodeKind::Folder { children } => {
                out.push(RenderEntry::Menu {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    icon: node.icon.clone(),
                    depth,
                });
                emit_siblings(tree, children, depth + 1, out);
            }
            NodeKind::Separator => {
                out.push(RenderEntry::Divider {
                    id: node.id.clone(),
                    depth,
                });
            }
            NodeKind::Command {
                language,
                command,
                is_option_box,
            } => {
                if *is_option_box {
                    // Already folded into the preceding item.
                    continue;
                }
                let option_box = ids
                    .get(index)
                    .and_then(|next_id| tree.node(next_id))
                    .and_then(option_box_entry);
                if option_box.is_some() {
                    index += 1;
                }
                out.push(RenderEntry::Item {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    icon: node.icon.clone(),
                    language: *language,
                    command: command.clone(),
                    depth,
                    option_box,
                });
            }
        }
    }
}

fn option_box_entry(node: &Node) -> Option<OptionBoxEntry> {
    match &node.kind {
        NodeKind::Command {
            language,
            command,
            is_option_box: true,
        } => Some(OptionBoxEntry {
            id: node.id.clone(),
            language: *language,
            command: command.clone(),
            icon: node.icon.clone(),
        }),
        _ => None,
    }
}
