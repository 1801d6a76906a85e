//! Core library for Menubuilder — a tool for assembling hierarchical host
//! menus (folders, commands, separators, option boxes) from loose script
//! fragments.
//!
//! The primary entry point is [`MenuEngine`], which owns the currently open
//! menu tree. All document mutations go through `MenuEngine` operations; the
//! presentation layer never reaches into the tree directly, so the structural
//! invariants (option-box anchoring, acyclic moves, unique ids) hold after
//! every completed operation. Persistence is a versioned JSON document
//! handled by [`DocumentStore`]; script execution and actual menu-bar
//! rendering belong to the host and are reached only through the
//! [`CommandExecutor`] contract and the [`render_plan`] traversal.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    delete::{CascadePolicy, DeleteResult},
    document::{deserialize, from_document, merge, serialize, DocNode, MenuDocument, DOCUMENT_VERSION},
    engine::{EditState, MenuEngine, NodeEdit, NodeSnapshot},
    error::{FormatError, MenubuilderError, Result, RuleViolation},
    executor::{CommandExecutor, ExecutionOutcome},
    import::{
        command_for_callable, generate_label, import_legacy_shelf, list_callables,
        CallableSignature,
    },
    node::{CommandLanguage, DraftKind, Node, NodeDraft, NodeKind},
    render::{render_plan, OptionBoxEntry, RenderEntry},
    settings::{load_settings, save_settings, Settings},
    storage::{DocumentStore, CONFIG_PATH_ENV},
    tree::MenuTree,
    validate,
};
