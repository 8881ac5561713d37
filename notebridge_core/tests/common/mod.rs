// In-memory stand-in for Notes.app, answering scripts the way osascript would.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use notebridge_core::codec::{encode_fields, encode_items};
use notebridge_core::{
    NotesClient, NotesError, NotesOperation, NotesScript, ScriptBuilder, ScriptOutput,
    ScriptRunner,
};

pub const DEFAULT_FOLDER: &str = "Notes";

#[derive(Debug, Clone)]
struct FakeNote {
    name: String,
    body: String,
    folder: String,
}

#[derive(Debug, Default)]
struct State {
    folders: Vec<String>,
    notes: Vec<FakeNote>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeNotes {
    state: Mutex<State>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeNotes {
    /// A host with the default "Notes" folder.
    pub fn new() -> Arc<Self> {
        let fake = Self::empty();
        fake.state.lock().unwrap().folders.push(DEFAULT_FOLDER.to_string());
        fake
    }

    /// A host with no folders at all.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn client(self: &Arc<Self>) -> NotesClient {
        NotesClient::new(ScriptBuilder::default(), self.clone())
    }

    /// Operation names of every script that reached the host.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, op: &NotesOperation) -> Result<String, String> {
        let mut state = self.state.lock().unwrap();
        match op {
            NotesOperation::CreateNote {
                title,
                content,
                folder,
            } => {
                let folder = match folder {
                    Some(f) => state.folder(f)?,
                    None => DEFAULT_FOLDER.to_string(),
                };
                state.next_id += 1;
                let id = format!("x-coredata://FAKE/ICNote/p{}", state.next_id);
                state.notes.push(FakeNote {
                    name: title.clone(),
                    body: content.clone(),
                    folder,
                });
                Ok(id)
            }
            NotesOperation::ListNotes { folder } => {
                let folder = folder.as_deref().map(|f| state.folder(f)).transpose()?;
                Ok(encode_items(
                    state
                        .notes
                        .iter()
                        .filter(|n| folder.as_ref().map_or(true, |f| &n.folder == f))
                        .map(|n| n.name.as_str()),
                ))
            }
            NotesOperation::GetNoteContent { note_name } => {
                let note = &state.notes[state.note(note_name)?];
                Ok(encode_fields(&[
                    note.name.as_str(),
                    note.folder.as_str(),
                    note.body.as_str(),
                ]))
            }
            NotesOperation::UpdateNoteContent {
                note_name,
                new_content,
            } => {
                let idx = state.note(note_name)?;
                state.notes[idx].body = new_content.clone();
                Ok(String::new())
            }
            NotesOperation::UpdateNoteTitle { old_name, new_name } => {
                let idx = state.note(old_name)?;
                state.notes[idx].name = new_name.clone();
                Ok(String::new())
            }
            NotesOperation::SearchNotes { term } => {
                let term = term.to_lowercase();
                Ok(encode_items(
                    state
                        .notes
                        .iter()
                        .filter(|n| {
                            n.name.to_lowercase().contains(&term)
                                || n.body.to_lowercase().contains(&term)
                        })
                        .map(|n| n.name.as_str()),
                ))
            }
            NotesOperation::CreateFolder { name } => {
                state.folders.push(name.clone());
                Ok(name.clone())
            }
            NotesOperation::ListFolders => Ok(encode_items(&state.folders)),
            NotesOperation::GetFolderInfo { name } => {
                let folder = state.folder(name)?;
                let count = state.notes.iter().filter(|n| n.folder == folder).count();
                Ok(encode_fields(&[folder.as_str(), count.to_string().as_str()]))
            }
            NotesOperation::MoveNote {
                note_name,
                folder_name,
            } => {
                let idx = state.note(note_name)?;
                let folder = state.folder(folder_name)?;
                state.notes[idx].folder = folder;
                Ok(String::new())
            }
        }
    }
}

impl State {
    fn note(&self, name: &str) -> Result<usize, String> {
        self.notes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| format!("Note not found: {}", name))
    }

    fn folder(&self, name: &str) -> Result<String, String> {
        self.folders
            .iter()
            .find(|f| f.as_str() == name)
            .cloned()
            .ok_or_else(|| format!("Folder not found: {}", name))
    }
}

#[async_trait]
impl ScriptRunner for FakeNotes {
    async fn run(&self, script: &NotesScript) -> Result<ScriptOutput, NotesError> {
        let op = script.operation();
        self.calls.lock().unwrap().push(op.name());
        Ok(match self.answer(op) {
            Ok(stdout) => ScriptOutput {
                stdout,
                stderr: String::new(),
                exit_code: 0,
            },
            Err(message) => ScriptOutput {
                stdout: String::new(),
                stderr: format!("execution error: {} (-2700)", message),
                exit_code: 1,
            },
        })
    }
}
