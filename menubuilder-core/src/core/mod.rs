//! Internal domain modules for the Menubuilder core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod delete;
pub mod document;
pub mod engine;
pub mod error;
pub mod executor;
pub mod import;
pub mod node;
pub mod render;
pub mod settings;
pub mod storage;
pub mod tree;
pub mod validate;

#[doc(inline)]
pub use delete::{CascadePolicy, DeleteResult};
#[doc(inline)]
pub use document::{deserialize, from_document, merge, serialize, DocNode, MenuDocument, DOCUMENT_VERSION};
#[doc(inline)]
pub use engine::{EditState, MenuEngine, NodeEdit, NodeSnapshot};
#[doc(inline)]
pub use error::{FormatError, MenubuilderError, Result, RuleViolation};
#[doc(inline)]
pub use executor::{CommandExecutor, ExecutionOutcome};
#[doc(inline)]
pub use import::{
    command_for_callable, generate_label, import_legacy_shelf, list_callables, CallableSignature,
};
#[doc(inline)]
pub use node::{CommandLanguage, DraftKind, Node, NodeDraft, NodeKind};
#[doc(inline)]
pub use render::{render_plan, OptionBoxEntry, RenderEntry};
#[doc(inline)]
pub use settings::{load_settings, save_settings, Settings};
#[doc(inline)]
pub use storage::{DocumentStore, CONFIG_PATH_ENV};
#[doc(inline)]
pub use tree::MenuTree;
