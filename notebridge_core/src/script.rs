// Script Builder - AppleScript generators for every Notes operation.
//
// All user text reaches a script through `quote`, and a `NotesScript` can
// only be produced by `ScriptBuilder`, so generated source never carries an
// unescaped literal.

use serde::{Deserialize, Serialize};

use crate::codec::{applescript_char, FIELD_SEPARATOR, ITEM_SEPARATOR};

/// How a lookup by name behaves when the host has several matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Use whichever match the host returns first.
    #[default]
    FirstMatch,
    /// Fail the call with an "Ambiguous ... name" host error.
    Error,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first_match" | "first" => Ok(DuplicatePolicy::FirstMatch),
            "error" => Ok(DuplicatePolicy::Error),
            other => Err(format!(
                "unknown duplicate policy '{}', expected 'first_match' or 'error'",
                other
            )),
        }
    }
}

/// The typed request a script was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesOperation {
    CreateNote {
        title: String,
        content: String,
        folder: Option<String>,
    },
    ListNotes {
        folder: Option<String>,
    },
    GetNoteContent {
        note_name: String,
    },
    UpdateNoteContent {
        note_name: String,
        new_content: String,
    },
    UpdateNoteTitle {
        old_name: String,
        new_name: String,
    },
    SearchNotes {
        term: String,
    },
    CreateFolder {
        name: String,
    },
    ListFolders,
    GetFolderInfo {
        name: String,
    },
    MoveNote {
        note_name: String,
        folder_name: String,
    },
}

impl NotesOperation {
    pub fn name(&self) -> &'static str {
        match self {
            NotesOperation::CreateNote { .. } => "create_note",
            NotesOperation::ListNotes { .. } => "list_notes",
            NotesOperation::GetNoteContent { .. } => "get_note_content",
            NotesOperation::UpdateNoteContent { .. } => "update_note_content",
            NotesOperation::UpdateNoteTitle { .. } => "update_note_title",
            NotesOperation::SearchNotes { .. } => "search_notes",
            NotesOperation::CreateFolder { .. } => "create_folder",
            NotesOperation::ListFolders => "list_folders",
            NotesOperation::GetFolderInfo { .. } => "get_folder_info",
            NotesOperation::MoveNote { .. } => "move_note_to_folder",
        }
    }
}

/// A complete, escaped AppleScript ready for the automation environment.
#[derive(Debug, Clone)]
pub struct NotesScript {
    operation: NotesOperation,
    source: String,
}

impl NotesScript {
    pub fn operation(&self) -> &NotesOperation {
        &self.operation
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Quote `s` as an AppleScript string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    application: String,
    launch_delay_secs: u64,
    duplicates: DuplicatePolicy,
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new("Notes", 1, DuplicatePolicy::FirstMatch)
    }
}

impl ScriptBuilder {
    pub fn new(
        application: impl Into<String>,
        launch_delay_secs: u64,
        duplicates: DuplicatePolicy,
    ) -> Self {
        Self {
            application: application.into(),
            launch_delay_secs,
            duplicates,
        }
    }

    pub fn build_create_note(
        &self,
        title: &str,
        content: &str,
        folder: Option<&str>,
    ) -> NotesScript {
        let properties = format!("{{name:{}, body:{}}}", quote(title), quote(content));
        let body = match folder {
            Some(f) => format!(
                "{}    set newNote to make new note at targetFolder with properties {}\n    return id of newNote",
                self.lookup("folder", "targetFolder", f),
                properties
            ),
            None => format!(
                "    set newNote to make new note with properties {}\n    return id of newNote",
                properties
            ),
        };
        self.finish(
            NotesOperation::CreateNote {
                title: title.to_string(),
                content: content.to_string(),
                folder: folder.map(str::to_string),
            },
            &body,
        )
    }

    pub fn build_list_notes(&self, folder: Option<&str>) -> NotesScript {
        let body = match folder {
            Some(f) => format!(
                "{}    set itemList to name of every note of targetFolder\n{}",
                self.lookup("folder", "targetFolder", f),
                join_items("itemList")
            ),
            None => format!(
                "    set itemList to name of every note\n{}",
                join_items("itemList")
            ),
        };
        self.finish(
            NotesOperation::ListNotes {
                folder: folder.map(str::to_string),
            },
            &body,
        )
    }

    pub fn build_get_note_content(&self, note_name: &str) -> NotesScript {
        let fs = applescript_char(FIELD_SEPARATOR);
        let body = format!(
            r#"{lookup}    set folderName to ""
    try
        set folderName to name of container of targetNote
    end try
    return (name of targetNote) & {fs} & folderName & {fs} & (body of targetNote)"#,
            lookup = self.lookup("note", "targetNote", note_name),
            fs = fs
        );
        self.finish(
            NotesOperation::GetNoteContent {
                note_name: note_name.to_string(),
            },
            &body,
        )
    }

    pub fn build_update_note_content(&self, note_name: &str, new_content: &str) -> NotesScript {
        let body = format!(
            "{}    set body of targetNote to {}\n    return \"\"",
            self.lookup("note", "targetNote", note_name),
            quote(new_content)
        );
        self.finish(
            NotesOperation::UpdateNoteContent {
                note_name: note_name.to_string(),
                new_content: new_content.to_string(),
            },
            &body,
        )
    }

    pub fn build_update_note_title(&self, old_name: &str, new_name: &str) -> NotesScript {
        let body = format!(
            "{}    set name of targetNote to {}\n    return \"\"",
            self.lookup("note", "targetNote", old_name),
            quote(new_name)
        );
        self.finish(
            NotesOperation::UpdateNoteTitle {
                old_name: old_name.to_string(),
                new_name: new_name.to_string(),
            },
            &body,
        )
    }

    pub fn build_search_notes(&self, term: &str) -> NotesScript {
        let body = format!(
            r#"    set searchTerm to {term}
    set itemList to {{}}
    ignoring case
        repeat with n in notes
            if (name of n contains searchTerm) or (plaintext of n contains searchTerm) then
                set end of itemList to (name of n)
            end if
        end repeat
    end ignoring
{join}"#,
            term = quote(term),
            join = join_items("itemList")
        );
        self.finish(
            NotesOperation::SearchNotes {
                term: term.to_string(),
            },
            &body,
        )
    }

    pub fn build_create_folder(&self, name: &str) -> NotesScript {
        let body = format!(
            "    set newFolder to make new folder with properties {{name:{}}}\n    return name of newFolder",
            quote(name)
        );
        self.finish(
            NotesOperation::CreateFolder {
                name: name.to_string(),
            },
            &body,
        )
    }

    pub fn build_list_folders(&self) -> NotesScript {
        let body = format!(
            "    set itemList to name of every folder\n{}",
            join_items("itemList")
        );
        self.finish(NotesOperation::ListFolders, &body)
    }

    pub fn build_get_folder_info(&self, name: &str) -> NotesScript {
        let body = format!(
            "{}    return (name of targetFolder) & {} & ((count of notes of targetFolder) as text)",
            self.lookup("folder", "targetFolder", name),
            applescript_char(FIELD_SEPARATOR)
        );
        self.finish(
            NotesOperation::GetFolderInfo {
                name: name.to_string(),
            },
            &body,
        )
    }

    pub fn build_move_note(&self, note_name: &str, folder_name: &str) -> NotesScript {
        let body = format!(
            "{}{}    move targetNote to targetFolder\n    return \"\"",
            self.lookup("note", "targetNote", note_name),
            self.lookup("folder", "targetFolder", folder_name)
        );
        self.finish(
            NotesOperation::MoveNote {
                note_name: note_name.to_string(),
                folder_name: folder_name.to_string(),
            },
            &body,
        )
    }

    /// Resolve `class` (note or folder) by name into `var`, raising a host
    /// error when nothing matches, or when several do under `DuplicatePolicy::Error`.
    fn lookup(&self, class: &str, var: &str, name: &str) -> String {
        let label = match class {
            "note" => "Note",
            _ => "Folder",
        };
        let literal = quote(name);
        let mut out = format!(
            "    set matchedItems to (every {class} whose name is {literal})\n    if (count of matchedItems) is 0 then error \"{label} not found: \" & {literal}\n",
            class = class,
            literal = literal,
            label = label
        );
        if self.duplicates == DuplicatePolicy::Error {
            out.push_str(&format!(
                "    if (count of matchedItems) > 1 then error \"Ambiguous {} name: \" & {}\n",
                class, literal
            ));
        }
        out.push_str(&format!("    set {} to item 1 of matchedItems\n", var));
        out
    }

    fn finish(&self, operation: NotesOperation, body: &str) -> NotesScript {
        let source = format!(
            r#"tell application {app}
    if not running then
        launch
        delay {delay}
    end if
{body}
end tell
"#,
            app = quote(&self.application),
            delay = self.launch_delay_secs,
            body = body
        );
        NotesScript { operation, source }
    }
}

fn join_items(list_var: &str) -> String {
    format!(
        r#"    set AppleScript's text item delimiters to {sep}
    set output to {list} as text
    set AppleScript's text item delimiters to ""
    return output"#,
        sep = applescript_char(ITEM_SEPARATOR),
        list = list_var
    )
}
