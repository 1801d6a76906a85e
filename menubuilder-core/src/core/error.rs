//! Error types for the Menubuilder core library.

use thiserror::Error;

/// A structural rule that an attempted edit would have broken.
///
/// Rule violations are expected, user-correctable outcomes: the operation is
/// rejected, the tree is left unchanged, and the caller decides how to present
/// the message. Nothing here is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The target parent of an insert or move is not a folder.
    #[error("Target parent must be a folder")]
    ParentMustBeFolder,

    /// An option box would not immediately follow a plain command entry.
    #[error("An option box must directly follow a command that is not itself an option box")]
    InvalidOptionBoxPosition,

    /// The option-box flag was requested on a folder or separator.
    #[error("Only command entries can become option boxes")]
    OptionBoxRequiresCommand,

    /// An insert would land between a command and its attached option box.
    #[error("Cannot insert between a command and its option box")]
    OptionBoxPairSplit,

    /// A move would place a folder inside its own subtree.
    #[error("Move would make an entry its own descendant")]
    CyclicMove,

    /// A structural operation was attempted while another entry is being edited.
    #[error("Another entry is already being edited")]
    EditInProgress,

    /// A folder or command label was empty.
    #[error("Label must not be empty")]
    EmptyLabel,

    /// A folder or command label already exists among its siblings.
    #[error("An entry named '{0}' already exists at this level")]
    DuplicateLabel(String),
}

/// A persisted document that could not be accepted.
///
/// Documents are untrusted input (hand-edited or produced elsewhere), so
/// deserialization re-validates every invariant and reports the offending
/// node's derived path instead of silently repairing the tree.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document declares a version this library does not understand.
    #[error("Unsupported document version {0}")]
    UnsupportedVersion(u32),

    /// A node declares a kind outside {folder, command, separator}.
    #[error("Unknown node kind '{kind}' at '{path}'")]
    UnknownKind { path: String, kind: String },

    /// A command declares a language outside {python, mel}.
    #[error("Unknown command language '{language}' at '{path}'")]
    UnknownLanguage { path: String, language: String },

    /// A folder or command entry has no label.
    #[error("Missing label at '{path}'")]
    MissingLabel { path: String },

    /// A node id is empty or appears more than once in the document.
    #[error("Invalid or duplicate node id '{id}' at '{path}'")]
    InvalidId { path: String, id: String },

    /// A command or separator entry carries child nodes.
    #[error("Entry at '{path}' is not a folder and must not carry children")]
    ChildrenOnLeaf { path: String },

    /// The document parsed but the resulting tree breaks a structural rule.
    #[error("Invalid structure at '{path}': {rule}")]
    Invariant { path: String, rule: RuleViolation },
}

/// All errors that can occur within the Menubuilder core library.
#[derive(Debug, Error)]
pub enum MenubuilderError {
    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be parsed or failed re-validation.
    #[error("Document error: {0}")]
    Format(#[from] FormatError),

    /// A structural edit was rejected by a legality rule.
    #[error("{0}")]
    Rule(#[from] RuleViolation),

    /// A node id was requested that does not exist in the tree.
    #[error("Menu entry not found: {0}")]
    NodeNotFound(String),

    /// A named document does not exist in the documents directory.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// A test run was requested on an entry that carries no command.
    #[error("Entry '{0}' has no command to run")]
    NotRunnable(String),

    /// `commit_edit` was called outside an edit session.
    #[error("No edit in progress")]
    NoActiveEdit,
}

/// Convenience alias that pins the error type to [`MenubuilderError`].
pub type Result<T> = std::result::Result<T, MenubuilderError>;

impl MenubuilderError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("File error: {e}"),
            Self::Format(e) => format!("Could not read menu document: {e}"),
            Self::Rule(rule) => rule.to_string(),
            Self::NodeNotFound(_) => "Menu entry no longer exists".to_string(),
            Self::DocumentNotFound(name) => format!("No menu document named '{name}'"),
            Self::NotRunnable(_) => "This entry has no command to run".to_string(),
            Self::NoActiveEdit => "No entry is being edited".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_display() {
        let e = RuleViolation::CyclicMove;
        assert!(e.to_string().contains("descendant"));
    }

    #[test]
    fn test_format_error_carries_path() {
        let e = FormatError::Invariant {
            path: "Tools/Export".to_string(),
            rule: RuleViolation::InvalidOptionBoxPosition,
        };
        assert!(e.to_string().contains("Tools/Export"));
        assert!(e.to_string().contains("option box"));
    }

    #[test]
    fn test_user_message_for_rule() {
        let e = MenubuilderError::Rule(RuleViolation::EditInProgress);
        assert!(e.user_message().contains("edited"));
    }
}
