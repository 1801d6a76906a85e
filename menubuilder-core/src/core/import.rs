//! Import adapters: script callable listing and legacy shelf conversion.
//!
//! Both adapters are side-effect free. They scan loose text and produce
//! candidate data — [`CallableSignature`]s for the function picker and
//! [`NodeDraft`]s for the add operation — and never touch any tree
//! themselves.

use regex::Regex;

use crate::core::node::{CommandLanguage, DraftKind, NodeDraft};

/// A callable found in a script source, offered as a menu-entry candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSignature {
    /// The function name as written in the source.
    pub name: String,
}

/// Lists the function definitions in a Python script source.
///
/// The scan is deliberately tolerant: it matches `def name(` line starts with
/// a regex rather than parsing the file, so scripts with syntax errors
/// elsewhere (old Python 2 material is common in studio script folders) still
/// yield their callables.
#[must_use]
pub fn list_callables(source: &str) -> Vec<CallableSignature> {
    let pattern = Regex::new(r"(?m)^\s*def\s+([A-Za-z_]\w*)\s*\(").expect("valid pattern");
    pattern
        .captures_iter(source)
        .map(|caps| CallableSignature {
            name: caps[1].to_string(),
        })
        .collect()
}

/// Turns a technical command or function name into a readable menu label.
///
/// Strips a leading `cmds.` and a trailing `.main()`/`.run()`/`.execute()`,
/// collapses `import x; x...` to `x`, then splits snake_case and CamelCase
/// into capitalized words.
#[must_use]
pub fn generate_label(command: &str) -> String {
    let prefix = Regex::new(r"^cmds\.").expect("valid pattern");
    let suffix = Regex::new(r"\.(main|run|execute)\s*\(\)\s*$").expect("valid pattern");
    let import_call = Regex::new(r"import\s+(\w+);\s*(\w+)").expect("valid pattern");
    let camel = Regex::new(r"([a-z])([A-Z])").expect("valid pattern");

    let core = prefix.replace(command, "");
    let core = suffix.replace(&core, "");
    let core = match import_call.captures(&core) {
        Some(caps) if caps[1] == caps[2] => caps[1].to_string(),
        _ => core.to_string(),
    };

    let spaced = core.replace('_', " ");
    let spaced = camel.replace_all(&spaced, "$1 $2");
    spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Builds the command text for a callable picked from a script file:
/// import, reload, call.
#[must_use]
pub fn command_for_callable(module: &str, function: &str) -> String {
    format!(
        "import {module}\nfrom importlib import reload\nreload({module})\n{module}.{function}()"
    )
}

/// Converts a legacy MEL shelf file into command drafts, preserving shelf
/// order.
///
/// Each `shelfButton` block becomes one draft: the label comes from `-label`,
/// falling back to `-annotation` and finally to a label generated from the
/// command; the language follows `-sourceType`; the icon follows
/// `-image1`/`-image`. Buttons without a command are skipped. The adapter
/// never inserts into any tree — callers feed the drafts through
/// [`MenuEngine::add_node`](super::engine::MenuEngine::add_node).
#[must_use]
pub fn import_legacy_shelf(source: &str) -> Vec<NodeDraft> {
    let flag = Regex::new(r#"-(\w+)\s+"((?:[^"\\]|\\.)*)""#).expect("valid pattern");
    let mut drafts = Vec::new();

    for block in shelf_button_blocks(source) {
        let mut label = None;
        let mut annotation = None;
        let mut command = None;
        let mut source_type = None;
        let mut image = None;
        let mut image1 = None;

        for caps in flag.captures_iter(&block) {
            let value = caps[2].to_string();
            match &caps[1] {
                "label" => label = Some(value),
                "annotation" => annotation = Some(value),
                "command" => command = Some(value),
                "sourceType" => source_type = Some(value),
                "image" => image = Some(value),
                "image1" => image1 = Some(value),
                _ => {}
            }
        }

        let Some(command) = command else {
            log::warn!("Skipping shelf button without a command");
            continue;
        };
        let command = mel_unescape(&command);
        let language = match source_type.as_deref() {
            Some("mel") => CommandLanguage::Mel,
            _ => CommandLanguage::Python,
        };
        let label = label
            .or(annotation)
            .map(|text| mel_unescape(&text))
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| generate_label(&command));

        drafts.push(NodeDraft {
            label,
            icon: image1.or(image).filter(|i| !i.is_empty()),
            kind: DraftKind::Command {
                language,
                command,
                is_option_box: false,
            },
        });
    }

    log::info!("Imported {} shelf buttons", drafts.len());
    drafts
}

/// Extracts the flag text of each `shelfButton` call: everything between the
/// keyword and the next statement-ending `;` outside string literals.
fn shelf_button_blocks(source: &str) -> Vec<String> {
    const KEYWORD: &str = "shelfButton";
    let mut blocks = Vec::new();
    let mut search_from = 0;

    while let Some(found) = source[search_from..].find(KEYWORD) {
        let start = search_from + found + KEYWORD.len();
        let mut in_string = false;
        let mut escaped = false;
        let mut end = source.len();
        for (offset, ch) in source[start..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                ';' if !in_string => {
                    end = start + offset;
                    break;
                }
                _ => {}
            }
        }
        blocks.push(source[start..end].to_string());
        search_from = end;
    }
    blocks
}

fn mel_unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
