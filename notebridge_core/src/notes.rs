// Typed Notes.app operations: validate, build, run, parse.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::codec::{self, contains_separator, FolderInfo, Note};
use crate::config::NotebridgeConfig;
use crate::error::NotesError;
use crate::runner::ScriptRunner;
use crate::script::{NotesScript, ScriptBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNote {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Host identifier of the new note, e.g. `x-coredata://.../ICNote/p42`.
    pub note_id: String,
}

/// Stateless client for the Notes application. Every call spawns its own
/// script run; nothing is cached between calls.
#[derive(Clone)]
pub struct NotesClient {
    builder: ScriptBuilder,
    runner: Arc<dyn ScriptRunner>,
}

impl NotesClient {
    pub fn new(builder: ScriptBuilder, runner: Arc<dyn ScriptRunner>) -> Self {
        Self { builder, runner }
    }

    pub fn from_config(config: &NotebridgeConfig) -> Self {
        Self::new(config.script_builder(), Arc::new(config.runner()))
    }

    async fn execute(&self, script: NotesScript) -> Result<String, NotesError> {
        let operation = script.operation().name();
        debug!(operation, source = %script.source(), "executing script");
        let output = self.runner.run(&script).await?;
        output.into_stdout().map_err(|e| {
            warn!(operation, code = e.code_str(), error = %e, "Notes script failed");
            e
        })
    }

    pub async fn create_note(
        &self,
        title: &str,
        content: &str,
        folder: Option<&str>,
    ) -> Result<CreatedNote, NotesError> {
        let title = require_name("title", title)?;
        let folder = optional_name("folder", folder)?;
        let note_id = self
            .execute(self.builder.build_create_note(title, content, folder))
            .await?;
        Ok(CreatedNote {
            title: title.to_string(),
            folder: folder.map(str::to_string),
            note_id,
        })
    }

    pub async fn list_notes(&self, folder: Option<&str>) -> Result<Vec<String>, NotesError> {
        let folder = optional_name("folder", folder)?;
        let stdout = self.execute(self.builder.build_list_notes(folder)).await?;
        Ok(codec::decode_items(&stdout))
    }

    pub async fn get_note_content(&self, note_name: &str) -> Result<Note, NotesError> {
        let note_name = require("note_name", note_name)?;
        let stdout = self
            .execute(self.builder.build_get_note_content(note_name))
            .await?;
        codec::parse_note(&stdout)
    }

    pub async fn update_note_content(
        &self,
        note_name: &str,
        new_content: &str,
    ) -> Result<(), NotesError> {
        let note_name = require("note_name", note_name)?;
        self.execute(self.builder.build_update_note_content(note_name, new_content))
            .await?;
        Ok(())
    }

    pub async fn update_note_title(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), NotesError> {
        let old_name = require("old_name", old_name)?;
        let new_name = require_name("new_name", new_name)?;
        self.execute(self.builder.build_update_note_title(old_name, new_name))
            .await?;
        Ok(())
    }

    pub async fn search_notes(&self, search_term: &str) -> Result<Vec<String>, NotesError> {
        let search_term = require("search_term", search_term)?;
        let stdout = self
            .execute(self.builder.build_search_notes(search_term))
            .await?;
        Ok(codec::decode_items(&stdout))
    }

    pub async fn create_folder(&self, folder_name: &str) -> Result<String, NotesError> {
        let folder_name = require_name("folder_name", folder_name)?;
        self.execute(self.builder.build_create_folder(folder_name)).await
    }

    pub async fn list_folders(&self) -> Result<Vec<String>, NotesError> {
        let stdout = self.execute(self.builder.build_list_folders()).await?;
        Ok(codec::decode_items(&stdout))
    }

    pub async fn get_folder_info(&self, folder_name: &str) -> Result<FolderInfo, NotesError> {
        let folder_name = require("folder_name", folder_name)?;
        let stdout = self
            .execute(self.builder.build_get_folder_info(folder_name))
            .await?;
        codec::parse_folder_info(&stdout)
    }

    pub async fn move_note_to_folder(
        &self,
        note_name: &str,
        folder_name: &str,
    ) -> Result<(), NotesError> {
        let note_name = require("note_name", note_name)?;
        let folder_name = require("folder_name", folder_name)?;
        self.execute(self.builder.build_move_note(note_name, folder_name))
            .await?;
        Ok(())
    }
}

fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, NotesError> {
    if value.trim().is_empty() {
        return Err(NotesError::Validation(format!("'{}' must not be empty", field)));
    }
    Ok(value)
}

/// Names end up in list output, so they may not carry the result separators.
fn require_name<'a>(field: &str, value: &'a str) -> Result<&'a str, NotesError> {
    let value = require(field, value)?;
    if contains_separator(value) {
        return Err(NotesError::Validation(format!(
            "'{}' contains a reserved control character (U+001E or U+001F)",
            field
        )));
    }
    Ok(value)
}

/// An empty optional name means "not given".
fn optional_name<'a>(field: &str, value: Option<&'a str>) -> Result<Option<&'a str>, NotesError> {
    match value {
        Some(v) if !v.trim().is_empty() => require_name(field, v).map(Some),
        _ => Ok(None),
    }
}
