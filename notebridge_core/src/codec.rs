// Result codec shared by the script builder and the parser.
//
// Scripts join list items with ITEM_SEPARATOR (U+001E, ASCII record
// separator) and record fields with FIELD_SEPARATOR (U+001F, ASCII unit
// separator). Neither appears in text typed into Notes, and names this crate
// writes are validated against both.

use serde::{Deserialize, Serialize};

use crate::error::NotesError;

pub const ITEM_SEPARATOR: char = '\u{1e}';
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// A note as read back from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub name: String,
    /// `None` when the host reported something that is not a count.
    pub note_count: Option<u32>,
}

/// AppleScript expression producing `c`, e.g. `(character id 30)`.
pub(crate) fn applescript_char(c: char) -> String {
    format!("(character id {})", c as u32)
}

pub fn contains_separator(s: &str) -> bool {
    s.contains(ITEM_SEPARATOR) || s.contains(FIELD_SEPARATOR)
}

/// Mirror of what list scripts emit: items joined by the item separator.
pub fn encode_items<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(ITEM_SEPARATOR);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Mirror of what record scripts emit: fields joined by the field separator.
pub fn encode_fields(fields: &[&str]) -> String {
    fields.join(&FIELD_SEPARATOR.to_string())
}

/// Split list output into items. Empty output is an empty list.
///
/// A single item with an empty name also encodes to empty output, so it reads
/// back as no items; two or more empty names survive (`"\u{1e}"` is `["", ""]`).
/// Notes and folders always have a name, so only the single-item case is lossy.
pub fn decode_items(stdout: &str) -> Vec<String> {
    if stdout.is_empty() {
        return Vec::new();
    }
    stdout.split(ITEM_SEPARATOR).map(str::to_string).collect()
}

/// Split a record into exactly `arity` fields. The last field takes the
/// remainder, so it may itself contain separators.
pub fn decode_record(stdout: &str, arity: usize) -> Result<Vec<String>, NotesError> {
    let fields: Vec<String> = stdout
        .splitn(arity, FIELD_SEPARATOR)
        .map(str::to_string)
        .collect();
    if fields.len() != arity {
        return Err(NotesError::Parse(format!(
            "expected {} fields, got {}",
            arity,
            fields.len()
        )));
    }
    Ok(fields)
}

/// `name FS folder FS body`, as emitted by the get-note script.
pub fn parse_note(stdout: &str) -> Result<Note, NotesError> {
    let mut fields = decode_record(stdout, 3)?.into_iter();
    let name = fields.next().unwrap_or_default();
    let folder = fields.next().filter(|f| !f.is_empty());
    let content = fields.next().unwrap_or_default();
    Ok(Note {
        name,
        content,
        folder,
    })
}

/// `name FS count`, as emitted by the folder-info script.
pub fn parse_folder_info(stdout: &str) -> Result<FolderInfo, NotesError> {
    let mut fields = decode_record(stdout, 2)?.into_iter();
    let name = fields.next().unwrap_or_default();
    let note_count = fields.next().and_then(|c| c.trim().parse().ok());
    Ok(FolderInfo { name, note_count })
}
