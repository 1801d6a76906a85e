//! Cascade policy and result types for node removal operations.
//!
//! This module defines [`CascadePolicy`] and [`DeleteResult`], which are used
//! when removing entries from a [`MenuEngine`](super::engine::MenuEngine).
//!
//! ## Policies
//!
//! Deleting a command that anchors an option box leaves that option box
//! without a legal position, so the delete must decide its fate:
//!
//! - [`CascadePolicy::DemoteOptionBox`] — the default: the option box is kept
//!   as a plain command, preserving the user's command text.
//! - [`CascadePolicy::DeleteOptionBox`] — the option box is removed together
//!   with its anchor.
//!
//! The orphan is never silently re-attached to whatever entry happens to
//! precede it after the delete.
//!
//! ## Serialization
//!
//! Both types are serde-serializable so they can cross a host IPC boundary:
//! `CascadePolicy` variants serialize as PascalCase strings and
//! `DeleteResult` fields serialize in camelCase, consistent with the other
//! return types in this crate.
//!
//! ## Examples
//!
//! ```rust
//! use menubuilder_core::{CascadePolicy, DeleteResult};
//!
//! let policy = CascadePolicy::DemoteOptionBox;
//! let json = serde_json::to_string(&policy).unwrap();
//! assert_eq!(json, r#""DemoteOptionBox""#);
//!
//! let result = DeleteResult {
//!     deleted_count: 2,
//!     affected_ids: vec!["a".to_string(), "b".to_string()],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("deletedCount"));
//! assert!(json.contains("affectedIds"));
//! ```

use serde::{Deserialize, Serialize};

/// Determines what happens to a dependent option box when its anchoring
/// command is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CascadePolicy {
    /// Keep the option box as a plain command (the default).
    #[default]
    DemoteOptionBox,

    /// Delete the option box together with its anchor.
    DeleteOptionBox,
}

/// The outcome of a delete operation performed on a
/// [`MenuEngine`](super::engine::MenuEngine).
///
/// Contains a count of removed entries and the IDs of every entry affected by
/// the operation — either because it was deleted or because it was demoted
/// from option box to plain command by [`CascadePolicy::DemoteOptionBox`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The total number of entries that were permanently removed.
    pub deleted_count: usize,

    /// IDs of all entries that were deleted or structurally affected.
    pub affected_ids: Vec<String>,
}
