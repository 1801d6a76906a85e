//! The stateful structural-edit engine.
//!
//! [`MenuEngine`] owns exactly one [`MenuTree`] — the currently open document
//! — and an edit-mode session. Every mutation funnels through its operation
//! set, which consults the [`validate`](super::validate) rules before
//! touching the tree, so the invariants in [`MenuTree::check_invariants`]
//! hold after every completed operation. Expected rule violations are
//! returned as typed outcomes, never raised; the worst case is "operation
//! rejected, state unchanged".

use serde::{Deserialize, Serialize};

use crate::core::delete::{CascadePolicy, DeleteResult};
use crate::core::error::{MenubuilderError, Result, RuleViolation};
use crate::core::executor::{CommandExecutor, ExecutionOutcome};
use crate::core::node::{CommandLanguage, Node, NodeDraft, NodeKind};
use crate::core::render::{render_plan, RenderEntry};
use crate::core::tree::MenuTree;
use crate::core::{document, validate};

/// The edit-mode session: at most one node is being edited at a time.
///
/// While a node is in edit-mode, every structural operation — adding, moving,
/// deleting, toggling option boxes, opening another node for editing — fails
/// with [`RuleViolation::EditInProgress`] instead of silently queuing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing { node_id: String },
}

/// A copy of a node's editable attributes, handed to the editor panel when an
/// edit session begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub id: String,
    /// `"folder"`, `"command"`, or `"separator"`. Kind is immutable; the
    /// editor uses this to decide which fields to show.
    pub kind: String,
    pub label: String,
    pub icon: Option<String>,
    pub language: Option<CommandLanguage>,
    pub command: Option<String>,
    pub is_option_box: bool,
}

/// The attributes submitted when committing an edit session.
///
/// `language` and `command` apply only to command nodes; `None` keeps the
/// current value. Kind changes are not expressible — re-kinding an entry is
/// modeled as delete-then-add.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeEdit {
    pub label: String,
    pub icon: Option<String>,
    pub language: Option<CommandLanguage>,
    pub command: Option<String>,
    pub is_option_box: bool,
}

/// The structural-edit engine owning the currently open menu tree.
#[derive(Debug, Default)]
pub struct MenuEngine {
    tree: MenuTree,
    edit: EditState,
}

impl MenuEngine {
    /// Creates an engine with an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the owned tree.
    #[must_use]
    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    /// The current edit-mode state.
    #[must_use]
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.tree.node(id)
    }

    /// Ordered, validated render sequence for the host menu renderer.
    #[must_use]
    pub fn render_plan(&self) -> Vec<RenderEntry> {
        render_plan(&self.tree)
    }

    /// Replaces the open tree wholesale (the "open" action).
    ///
    /// The incoming tree is re-validated defensively; on any error the
    /// current tree is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::EditInProgress`] while a node is being
    /// edited, or a [`FormatError`](crate::FormatError) if the incoming tree
    /// is invalid.
    pub fn open(&mut self, tree: MenuTree) -> Result<()> {
        self.ensure_idle()?;
        tree.check_invariants().map_err(MenubuilderError::Format)?;
        log::info!("Opened a tree of {} entries", tree.len());
        self.tree = tree;
        Ok(())
    }

    /// Combines `incoming` into the open tree (the "merge" action).
    ///
    /// Delegates to [`document::merge`]; the open tree is replaced only when
    /// the whole merge validates, so a rejected merge leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::EditInProgress`] while a node is being
    /// edited, or the merge's [`FormatError`](crate::FormatError).
    pub fn merge(&mut self, incoming: &MenuTree) -> Result<()> {
        self.ensure_idle()?;
        let merged = document::merge(&self.tree, incoming)?;
        self.tree = merged;
        Ok(())
    }

    /// Inserts a new node built from `draft` under `parent` at `index` and
    /// returns its assigned id.
    ///
    /// `parent = None` addresses the top level; an index past the end
    /// appends. Drafts flow in from manual entry and from the import
    /// adapters alike.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for an unknown parent id, or a
    /// [`RuleViolation`]: `EditInProgress`, `ParentMustBeFolder`,
    /// `EmptyLabel`, `DuplicateLabel`, `InvalidOptionBoxPosition`, or
    /// `OptionBoxPairSplit`.
    pub fn add_node(
        &mut self,
        draft: NodeDraft,
        parent: Option<&str>,
        index: usize,
    ) -> Result<String> {
        self.ensure_idle()?;
        if let Some(pid) = parent {
            if !self.tree.contains(pid) {
                return Err(MenubuilderError::NodeNotFound(pid.to_string()));
            }
        }
        let mut node = Node::from_draft(draft);
        node.label = node.label.trim().to_string();
        self.check_label(&node.kind, &node.label, parent, None)?;
        validate::check_insert_at(&self.tree, node.is_option_box(), parent, index)?;

        let id = node.id.clone();
        let label = node.label.clone();
        self.tree.insert(node, parent, index)?;
        log::debug!("Added '{label}' ({id})");
        Ok(id)
    }

    /// Enters edit-mode for `id` and returns a snapshot of its attributes.
    ///
    /// Re-entering the node already being edited returns a fresh snapshot;
    /// any other node fails until the session ends.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids,
    /// [`RuleViolation::EditInProgress`] if a different node is being edited.
    pub fn begin_edit(&mut self, id: &str) -> Result<NodeSnapshot> {
        if let EditState::Editing { node_id } = &self.edit {
            if node_id != id {
                return Err(RuleViolation::EditInProgress.into());
            }
        }
        let Some(node) = self.tree.node(id) else {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        };
        let snapshot = Self::snapshot(node);
        self.edit = EditState::Editing {
            node_id: id.to_string(),
        };
        log::debug!("Editing '{}' ({id})", snapshot.label);
        Ok(snapshot)
    }

    /// Applies `edit` to the node being edited and leaves edit-mode.
    ///
    /// Label, icon, and command changes never move the node, so only the
    /// option-box toggle is re-validated — at the node's current position.
    /// On failure the tree is unchanged and edit-mode stays active so the
    /// caller can correct the input.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NoActiveEdit`] outside an edit session;
    /// [`MenubuilderError::NodeNotFound`] if the node vanished (stale
    /// session); otherwise a [`RuleViolation`]: `EmptyLabel`,
    /// `DuplicateLabel`, `OptionBoxRequiresCommand`, or
    /// `InvalidOptionBoxPosition`.
    pub fn commit_edit(&mut self, edit: &NodeEdit) -> Result<()> {
        let EditState::Editing { node_id } = &self.edit else {
            return Err(MenubuilderError::NoActiveEdit);
        };
        let node_id = node_id.clone();
        let Some(node) = self.tree.node(&node_id) else {
            self.edit = EditState::Idle;
            return Err(MenubuilderError::NodeNotFound(node_id));
        };

        let kind = node.kind.clone();
        let parent = self.tree.parent_of(&node_id).map(ToOwned::to_owned);
        match &kind {
            NodeKind::Separator => {
                // Separators carry no editable attributes; committing one
                // only ends the session.
                if edit.is_option_box {
                    return Err(RuleViolation::OptionBoxRequiresCommand.into());
                }
            }
            NodeKind::Folder { .. } => {
                if edit.is_option_box {
                    return Err(RuleViolation::OptionBoxRequiresCommand.into());
                }
                self.check_label(&kind, &edit.label, parent.as_deref(), Some(&node_id))?;
            }
            NodeKind::Command { is_option_box, .. } => {
                self.check_label(&kind, &edit.label, parent.as_deref(), Some(&node_id))?;
                if edit.is_option_box != *is_option_box {
                    validate::check_become_option_box(&self.tree, &node_id, edit.is_option_box)?;
                }
            }
        }

        let now = chrono::Utc::now().timestamp();
        let Some(node) = self.tree.node_mut(&node_id) else {
            self.edit = EditState::Idle;
            return Err(MenubuilderError::NodeNotFound(node_id));
        };
        match &mut node.kind {
            NodeKind::Separator => {}
            NodeKind::Folder { .. } => {
                node.label = edit.label.trim().to_string();
                node.icon = edit.icon.clone().filter(|i| !i.is_empty());
                node.modified_at = now;
            }
            NodeKind::Command {
                language,
                command,
                is_option_box,
            } => {
                node.label = edit.label.trim().to_string();
                node.icon = edit.icon.clone().filter(|i| !i.is_empty());
                if let Some(new_language) = edit.language {
                    *language = new_language;
                }
                if let Some(new_command) = &edit.command {
                    *command = new_command.clone();
                }
                *is_option_box = edit.is_option_box;
                node.modified_at = now;
            }
        }
        self.edit = EditState::Idle;
        Ok(())
    }

    /// Discards any pending edit and leaves edit-mode. Idempotent.
    pub fn cancel_edit(&mut self) {
        if let EditState::Editing { node_id } = &self.edit {
            log::debug!("Cancelled edit of {node_id}");
        }
        self.edit = EditState::Idle;
    }

    /// Moves the subtree rooted at `id` under `new_parent` at `new_index`.
    ///
    /// Children travel with the node; a command's attached option box travels
    /// too, staying directly after it at the destination. The index addresses
    /// the destination sibling list with the moved node already removed. The
    /// move is atomic: either the whole subtree relocates or nothing changes.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids, or a
    /// [`RuleViolation`]: `EditInProgress`, `CyclicMove`,
    /// `ParentMustBeFolder`, `InvalidOptionBoxPosition`, or
    /// `OptionBoxPairSplit`.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        new_index: usize,
    ) -> Result<()> {
        self.ensure_idle()?;
        if !self.tree.contains(id) {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        }
        if let Some(pid) = new_parent {
            if !self.tree.contains(pid) {
                return Err(MenubuilderError::NodeNotFound(pid.to_string()));
            }
        }
        validate::check_move_into(&self.tree, id, new_parent)?;

        let companion = self.attached_option_box(id);
        let companion_spot = companion
            .as_deref()
            .and_then(|cid| self.tree.detach(cid));
        let Some((old_parent, old_index)) = self.tree.detach(id) else {
            // Restore a companion detached just above; unreachable in practice.
            if let (Some(cid), Some((parent, index))) = (&companion, &companion_spot) {
                let _ = self.tree.attach(cid, parent.as_deref(), *index);
            }
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        };

        let moving_option_box = self.tree.node(id).is_some_and(Node::is_option_box);
        if let Err(rule) = validate::check_insert_at(&self.tree, moving_option_box, new_parent, new_index)
        {
            // Atomic: put everything back exactly where it was.
            let _ = self.tree.attach(id, old_parent.as_deref(), old_index);
            if let (Some(cid), Some((parent, index))) = (&companion, &companion_spot) {
                let _ = self.tree.attach(cid, parent.as_deref(), *index);
            }
            return Err(rule.into());
        }

        self.tree
            .attach(id, new_parent, new_index)
            .map_err(MenubuilderError::Rule)?;
        if let Some(cid) = &companion {
            let after = self.tree.position_of(id).map_or(new_index, |p| p + 1);
            self.tree
                .attach(cid, new_parent, after)
                .map_err(MenubuilderError::Rule)?;
        }
        if let Some(node) = self.tree.node_mut(id) {
            node.modified_at = chrono::Utc::now().timestamp();
        }
        log::debug!("Moved {id} to index {new_index}");
        Ok(())
    }

    /// Deletes the subtree rooted at `id`.
    ///
    /// If the deleted node anchors an option box, `policy` decides whether
    /// that option box is deleted too or demoted to a plain command (the
    /// default — user data is preserved, and the orphan is never silently
    /// re-attached to another entry).
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids,
    /// [`RuleViolation::EditInProgress`] during an edit session.
    pub fn delete_node(&mut self, id: &str, policy: CascadePolicy) -> Result<DeleteResult> {
        self.ensure_idle()?;
        let dependent = self.attached_option_box(id);
        let Some(removed) = self.tree.remove_subtree(id) else {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        };

        let mut affected_ids = removed;
        let mut deleted_count = affected_ids.len();
        if let Some(dep_id) = dependent {
            match policy {
                CascadePolicy::DeleteOptionBox => {
                    if let Some(also_removed) = self.tree.remove_subtree(&dep_id) {
                        deleted_count += also_removed.len();
                        affected_ids.extend(also_removed);
                    }
                }
                CascadePolicy::DemoteOptionBox => {
                    if let Some(node) = self.tree.node_mut(&dep_id) {
                        if let NodeKind::Command { is_option_box, .. } = &mut node.kind {
                            *is_option_box = false;
                        }
                        node.modified_at = chrono::Utc::now().timestamp();
                    }
                    affected_ids.push(dep_id);
                }
            }
        }
        log::debug!("Deleted {deleted_count} entries starting at {id}");
        Ok(DeleteResult {
            deleted_count,
            affected_ids,
        })
    }

    /// Sets or clears the option-box flag on `id` in place.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids, or a
    /// [`RuleViolation`]: `EditInProgress`, `OptionBoxRequiresCommand`, or
    /// `InvalidOptionBoxPosition`.
    pub fn toggle_option_box(&mut self, id: &str, enable: bool) -> Result<()> {
        self.ensure_idle()?;
        if !self.tree.contains(id) {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        }
        validate::check_become_option_box(&self.tree, id, enable)?;
        if let Some(node) = self.tree.node_mut(id) {
            if let NodeKind::Command { is_option_box, .. } = &mut node.kind {
                *is_option_box = enable;
                node.modified_at = chrono::Utc::now().timestamp();
            }
        }
        Ok(())
    }

    /// Renames `id` in place (the tree widget's inline rename).
    ///
    /// Separators carry no label and are left unchanged.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids, or a
    /// [`RuleViolation`]: `EditInProgress`, `EmptyLabel`, or
    /// `DuplicateLabel`.
    pub fn rename_node(&mut self, id: &str, label: &str) -> Result<()> {
        self.ensure_idle()?;
        let Some(node) = self.tree.node(id) else {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        };
        if matches!(node.kind, NodeKind::Separator) {
            return Ok(());
        }
        if node.label == label {
            return Ok(());
        }
        let kind = node.kind.clone();
        let parent = self.tree.parent_of(id).map(ToOwned::to_owned);
        self.check_label(&kind, label, parent.as_deref(), Some(id))?;

        if let Some(node) = self.tree.node_mut(id) {
            node.label = label.trim().to_string();
            node.modified_at = chrono::Utc::now().timestamp();
        }
        Ok(())
    }

    /// Hands a command node's source to the host executor and passes the
    /// outcome through unmodified. Never mutates the tree.
    ///
    /// # Errors
    ///
    /// [`MenubuilderError::NodeNotFound`] for unknown ids,
    /// [`MenubuilderError::NotRunnable`] for folders and separators.
    pub fn test_run(&self, executor: &dyn CommandExecutor, id: &str) -> Result<ExecutionOutcome> {
        let Some(node) = self.tree.node(id) else {
            return Err(MenubuilderError::NodeNotFound(id.to_string()));
        };
        let NodeKind::Command {
            language, command, ..
        } = &node.kind
        else {
            return Err(MenubuilderError::NotRunnable(node.label.clone()));
        };
        Ok(executor.execute(*language, command))
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.edit {
            EditState::Idle => Ok(()),
            EditState::Editing { .. } => Err(RuleViolation::EditInProgress.into()),
        }
    }

    /// The id of the option box attached to `id`, if `id` is a plain command
    /// directly followed by one.
    fn attached_option_box(&self, id: &str) -> Option<String> {
        if !self.tree.node(id).is_some_and(Node::is_plain_command) {
            return None;
        }
        let parent = self.tree.parent_of(id).map(ToOwned::to_owned);
        let siblings = self.tree.children_of(parent.as_deref());
        let position = siblings.iter().position(|c| c == id)?;
        let next = siblings.get(position + 1)?;
        self.tree
            .node(next)
            .is_some_and(Node::is_option_box)
            .then(|| next.clone())
    }

    /// Rejects empty labels on folders and commands, and labels that collide
    /// with a sibling folder or command label.
    fn check_label(
        &self,
        kind: &NodeKind,
        label: &str,
        parent: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<()> {
        if matches!(kind, NodeKind::Separator) {
            return Ok(());
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(RuleViolation::EmptyLabel.into());
        }
        let conflict = self.tree.children_of(parent).iter().any(|cid| {
            exclude != Some(cid.as_str())
                && self.tree.node(cid).is_some_and(|sibling| {
                    !matches!(sibling.kind, NodeKind::Separator) && sibling.label == label
                })
        });
        if conflict {
            return Err(RuleViolation::DuplicateLabel(label.to_string()).into());
        }
        Ok(())
    }

    fn snapshot(node: &Node) -> NodeSnapshot {
        let (language, command, is_option_box) = match &node.kind {
            NodeKind::Command {
                language,
                command,
                is_option_box,
            } => (Some(*language), Some(command.clone()), *is_option_box),
            _ => (None, None, false),
        };
        NodeSnapshot {
            id: node.id.clone(),
            kind: node.kind.name().to_string(),
            label: node.label.clone(),
            icon: node.icon.clone(),
            language,
            command,
            is_option_box,
        }
    }
}
