//! The menu tree element type and its validation predicates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The scripting language a command entry is written in.
///
/// Serialized as a lowercase string (`"python"` / `"mel"`) so documents stay
/// hand-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandLanguage {
    Python,
    Mel,
}

impl CommandLanguage {
    /// The lowercase document spelling of this language.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Mel => "mel",
        }
    }
}

/// The role a node plays in the menu tree.
///
/// Kind is immutable once a node is created: turning a command into a folder
/// is modeled as delete-then-add, never as in-place mutation, so a node can
/// never exist in a half-converted state. Only folders carry children, which
/// makes "separators and commands are leaves" a type-level guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A submenu. Child ids are ordered; order is render order.
    Folder { children: Vec<String> },
    /// An actionable entry holding the source text handed to the host executor.
    Command {
        language: CommandLanguage,
        command: String,
        is_option_box: bool,
    },
    /// A visual divider. No label, no command data, no children.
    Separator,
}

impl NodeKind {
    /// Returns `true` for kinds that may carry child nodes.
    #[must_use]
    pub fn can_have_children(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Short lowercase name used in documents and log output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Folder { .. } => "folder",
            Self::Command { .. } => "command",
            Self::Separator => "separator",
        }
    }
}

/// One entry in the menu tree.
///
/// Nodes are created through [`MenuEngine::add_node`](crate::MenuEngine::add_node)
/// or by deserializing a document, and mutated only through engine operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable identity, unique within a document, never reused.
    pub id: String,
    /// Display text. Required for folders and commands, empty for separators.
    pub label: String,
    /// Opaque icon reference (file path or built-in identifier).
    pub icon: Option<String>,
    pub kind: NodeKind,
    /// Unix timestamp (seconds) when the node was created.
    pub created_at: i64,
    /// Unix timestamp (seconds) of the last attribute or position change.
    pub modified_at: i64,
}

impl Node {
    /// Creates a node from a draft, assigning a fresh UUID and timestamps.
    #[must_use]
    pub fn from_draft(draft: NodeDraft) -> Self {
        let now = chrono::Utc::now().timestamp();
        let kind = match draft.kind {
            DraftKind::Folder => NodeKind::Folder { children: Vec::new() },
            DraftKind::Command {
                language,
                command,
                is_option_box,
            } => NodeKind::Command {
                language,
                command,
                is_option_box,
            },
            DraftKind::Separator => NodeKind::Separator,
        };
        Self {
            id: Uuid::new_v4().to_string(),
            label: draft.label,
            icon: draft.icon,
            kind,
            created_at: now,
            modified_at: now,
        }
    }

    /// Returns `true` if this node is a command with the option-box flag set.
    #[must_use]
    pub fn is_option_box(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Command {
                is_option_box: true,
                ..
            }
        )
    }

    /// Returns `true` if this node is a command without the option-box flag.
    #[must_use]
    pub fn is_plain_command(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Command {
                is_option_box: false,
                ..
            }
        )
    }

    /// Child ids of a folder, or an empty slice for leaf kinds.
    #[must_use]
    pub fn child_ids(&self) -> &[String] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            _ => &[],
        }
    }
}

/// Checks whether `node` may carry the option-box flag given its would-be
/// preceding sibling.
///
/// The preceding sibling must be a command that is not itself an option box;
/// in particular an option box can never be first among its siblings, and a
/// separator or folder can never anchor one.
#[must_use]
pub fn is_valid_option_box_placement(node: &Node, preceding: Option<&Node>) -> bool {
    if !matches!(node.kind, NodeKind::Command { .. }) {
        return false;
    }
    match preceding {
        Some(prev) => prev.is_plain_command(),
        None => false,
    }
}

/// The kind requested for a new node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftKind {
    Folder,
    Command {
        language: CommandLanguage,
        command: String,
        is_option_box: bool,
    },
    Separator,
}

/// Input to [`MenuEngine::add_node`](crate::MenuEngine::add_node), produced by
/// manual entry in the editor panel or by an import adapter.
///
/// Drafts carry no id: identity is assigned by the engine on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft {
    pub label: String,
    pub icon: Option<String>,
    pub kind: DraftKind,
}

impl NodeDraft {
    /// A folder draft with the given label.
    #[must_use]
    pub fn folder(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: None,
            kind: DraftKind::Folder,
        }
    }

    /// A plain command draft.
    #[must_use]
    pub fn command(
        label: impl Into<String>,
        language: CommandLanguage,
        command: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            icon: None,
            kind: DraftKind::Command {
                language,
                command: command.into(),
                is_option_box: false,
            },
        }
    }

    /// A separator draft.
    #[must_use]
    pub fn separator() -> Self {
        Self {
            label: String::new(),
            icon: None,
            kind: DraftKind::Separator,
        }
    }

    /// Returns a copy of this draft with the option-box flag set.
    ///
    /// Has no effect on folder or separator drafts.
    #[must_use]
    pub fn as_option_box(mut self) -> Self {
        if let DraftKind::Command {
            ref mut is_option_box,
            ..
        } = self.kind
        {
            *is_option_box = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_assigns_unique_ids() {
        let a = Node::from_draft(NodeDraft::separator());
        let b = Node::from_draft(NodeDraft::separator());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_can_have_children() {
        assert!(NodeKind::Folder { children: vec![] }.can_have_children());
        assert!(!NodeKind::Separator.can_have_children());
        assert!(!NodeKind::Command {
            language: CommandLanguage::Python,
            command: "pass".to_string(),
            is_option_box: false,
        }
        .can_have_children());
    }

    #[test]
    fn test_option_box_placement_requires_plain_command_before() {
        let cmd = Node::from_draft(NodeDraft::command("A", CommandLanguage::Python, "a()"));
        let boxed = Node::from_draft(
            NodeDraft::command("B", CommandLanguage::Python, "b()").as_option_box(),
        );
        let sep = Node::from_draft(NodeDraft::separator());
        let folder = Node::from_draft(NodeDraft::folder("Tools"));

        assert!(is_valid_option_box_placement(&boxed, Some(&cmd)));
        assert!(!is_valid_option_box_placement(&boxed, None));
        assert!(!is_valid_option_box_placement(&boxed, Some(&sep)));
        assert!(!is_valid_option_box_placement(&boxed, Some(&folder)));
        assert!(!is_valid_option_box_placement(&boxed, Some(&boxed)));
        assert!(!is_valid_option_box_placement(&folder, Some(&cmd)));
        assert!(!is_valid_option_box_placement(&sep, Some(&cmd)));
    }

    #[test]
    fn test_as_option_box_ignores_non_commands() {
        let draft = NodeDraft::folder("Tools").as_option_box();
        assert_eq!(draft.kind, DraftKind::Folder);
    }
}
