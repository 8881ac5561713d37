// Apple Notes tool surface - the ten MCP tools plus note:// and folder:// resources.
//
// Each tool deserializes its typed input, calls `NotesClient`, and renders a
// structured result with a text block. Failures of a known tool come back as
// an error result; unknown tools and malformed arguments are protocol errors.

use rmcp::model::*;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::borrow::Cow;
use tracing::debug;

use crate::codec::{FolderInfo, Note};
use crate::error::NotesError;
use crate::notes::NotesClient;
use crate::utils::{bullet_list, input_schema, structured_result_with_text, tool_error_result};

pub const NOTE_URI_PREFIX: &str = "note://";
pub const FOLDER_URI_PREFIX: &str = "folder://";

// ============================================================================
// Tool Inputs
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteInput {
    /// The title/name of the note
    pub title: String,
    /// The content/body of the note
    pub content: String,
    /// Optional folder name to create the note in
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListNotesInput {
    /// Optional folder name to filter notes by
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetNoteContentInput {
    /// The name of the note to retrieve
    pub note_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNoteContentInput {
    /// The name of the note to update
    pub note_name: String,
    /// The new content for the note
    pub new_content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNoteTitleInput {
    /// The current name of the note
    pub old_name: String,
    /// The new name for the note
    pub new_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchNotesInput {
    /// The term to search for in note titles and content
    pub search_term: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FolderNameInput {
    /// The name of the folder
    pub folder_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFoldersInput {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveNoteInput {
    /// The name of the note to move
    pub note_name: String,
    /// The name of the target folder
    pub folder_name: String,
}

// ============================================================================
// Connector
// ============================================================================

pub struct NotesConnector {
    client: NotesClient,
}

impl NotesConnector {
    pub fn new(client: NotesClient) -> Self {
        Self { client }
    }

    pub fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::builder()
            .enable_tools()
            .enable_resources()
            .build()
    }

    pub fn list_tools(&self) -> Result<ListToolsResult, NotesError> {
        let tools = vec![
            tool::<CreateNoteInput>(
                "create_note",
                "Create Note",
                "Create a new note in Apple Notes with a title and content, optionally inside a folder.",
            )?,
            tool::<ListNotesInput>(
                "list_notes",
                "List Notes",
                "List the names of all notes, or of the notes in one folder.",
            )?,
            tool::<GetNoteContentInput>(
                "get_note_content",
                "Get Note Content",
                "Get the content and folder of a note by name. If several notes share the name, the first match is used unless the server is configured to reject ambiguous names.",
            )?,
            tool::<UpdateNoteContentInput>(
                "update_note_content",
                "Update Note Content",
                "Replace the entire content of an existing note.",
            )?,
            tool::<UpdateNoteTitleInput>(
                "update_note_title",
                "Update Note Title",
                "Rename an existing note.",
            )?,
            tool::<SearchNotesInput>(
                "search_notes",
                "Search Notes",
                "Find notes whose title or content contains a term (case-insensitive). Returns note names.",
            )?,
            tool::<FolderNameInput>(
                "create_folder",
                "Create Folder",
                "Create a new folder in Apple Notes.",
            )?,
            tool::<ListFoldersInput>(
                "list_folders",
                "List Folders",
                "List all folders in Apple Notes.",
            )?,
            tool::<FolderNameInput>(
                "get_folder_info",
                "Get Folder Info",
                "Get a folder's name and the number of notes it contains.",
            )?,
            tool::<MoveNoteInput>(
                "move_note_to_folder",
                "Move Note to Folder",
                "Move a note into a different folder.",
            )?,
        ];

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    pub async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, NotesError> {
        let name: &str = &request.name;
        let args = request.arguments.unwrap_or_default();
        debug!(tool = name, "calling tool");

        let outcome = match name {
            "create_note" => self.create_note(parse_args(args)?).await,
            "list_notes" => self.list_notes(parse_args(args)?).await,
            "get_note_content" => self.get_note_content(parse_args(args)?).await,
            "update_note_content" => self.update_note_content(parse_args(args)?).await,
            "update_note_title" => self.update_note_title(parse_args(args)?).await,
            "search_notes" => self.search_notes(parse_args(args)?).await,
            "create_folder" => self.create_folder(parse_args(args)?).await,
            "list_folders" => {
                let _: ListFoldersInput = parse_args(args)?;
                self.list_folders().await
            }
            "get_folder_info" => self.get_folder_info(parse_args(args)?).await,
            "move_note_to_folder" => self.move_note_to_folder(parse_args(args)?).await,
            _ => return Err(NotesError::ToolNotFound),
        };

        match outcome {
            Err(e) if e.is_tool_error() => Ok(tool_error_result(&e)),
            other => other,
        }
    }

    pub fn list_resources(&self) -> ListResourcesResult {
        ListResourcesResult {
            resources: vec![],
            next_cursor: None,
        }
    }

    /// URI templates for the readable notes and folders.
    pub fn list_resource_templates(&self) -> ListResourceTemplatesResult {
        ListResourceTemplatesResult {
            resource_templates: vec![
                resource_template(
                    "note://{note_name}",
                    "note",
                    "Content and folder of a note, addressed by its percent-encoded name.",
                ),
                resource_template(
                    "folder://{folder_name}",
                    "folder",
                    "Name and note count of a folder, addressed by its percent-encoded name.",
                ),
            ],
            next_cursor: None,
        }
    }

    /// Read `note://{note_name}` or `folder://{folder_name}`; names are percent-decoded.
    pub async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
    ) -> Result<ReadResourceResult, NotesError> {
        let uri = request.uri;
        let text = if let Some(name) = uri.strip_prefix(NOTE_URI_PREFIX) {
            let note = self.client.get_note_content(&decode_uri_name(name)?).await?;
            render_note(&note)
        } else if let Some(name) = uri.strip_prefix(FOLDER_URI_PREFIX) {
            let info = self.client.get_folder_info(&decode_uri_name(name)?).await?;
            render_folder_info(&info)
        } else {
            return Err(NotesError::ResourceNotFound);
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }

    // ------------------------------------------------------------------------

    async fn create_note(&self, input: CreateNoteInput) -> Result<CallToolResult, NotesError> {
        let created = self
            .client
            .create_note(&input.title, &input.content, input.folder.as_deref())
            .await?;
        let text = format!("Note '{}' created successfully", created.title);
        structured_result_with_text(&created, Some(text))
    }

    async fn list_notes(&self, input: ListNotesInput) -> Result<CallToolResult, NotesError> {
        let folder = input.folder.filter(|f| !f.trim().is_empty());
        let notes = self.client.list_notes(folder.as_deref()).await?;
        let scope = folder
            .as_ref()
            .map(|f| format!(" in folder '{}'", f))
            .unwrap_or_default();
        let text = if notes.is_empty() {
            format!("No notes found{}", scope)
        } else {
            bullet_list(&format!("Notes{}:", scope), &notes)
        };
        structured_result_with_text(&json!({"folder": folder, "notes": notes}), Some(text))
    }

    async fn get_note_content(
        &self,
        input: GetNoteContentInput,
    ) -> Result<CallToolResult, NotesError> {
        let note = self.client.get_note_content(&input.note_name).await?;
        let text = render_note(&note);
        structured_result_with_text(&note, Some(text))
    }

    async fn update_note_content(
        &self,
        input: UpdateNoteContentInput,
    ) -> Result<CallToolResult, NotesError> {
        self.client
            .update_note_content(&input.note_name, &input.new_content)
            .await?;
        let text = format!("Note '{}' content updated successfully", input.note_name);
        structured_result_with_text(&json!({"note_name": input.note_name}), Some(text))
    }

    async fn update_note_title(
        &self,
        input: UpdateNoteTitleInput,
    ) -> Result<CallToolResult, NotesError> {
        self.client
            .update_note_title(&input.old_name, &input.new_name)
            .await?;
        let text = format!(
            "Note title updated from '{}' to '{}'",
            input.old_name, input.new_name
        );
        structured_result_with_text(
            &json!({"old_name": input.old_name, "new_name": input.new_name}),
            Some(text),
        )
    }

    async fn search_notes(&self, input: SearchNotesInput) -> Result<CallToolResult, NotesError> {
        let notes = self.client.search_notes(&input.search_term).await?;
        let text = if notes.is_empty() {
            format!("No notes found containing '{}'", input.search_term)
        } else {
            bullet_list(
                &format!("Notes containing '{}':", input.search_term),
                &notes,
            )
        };
        structured_result_with_text(
            &json!({"search_term": input.search_term, "notes": notes}),
            Some(text),
        )
    }

    async fn create_folder(&self, input: FolderNameInput) -> Result<CallToolResult, NotesError> {
        self.client.create_folder(&input.folder_name).await?;
        let text = format!("Folder '{}' created successfully", input.folder_name);
        structured_result_with_text(&json!({"folder_name": input.folder_name}), Some(text))
    }

    async fn list_folders(&self) -> Result<CallToolResult, NotesError> {
        let folders = self.client.list_folders().await?;
        let text = if folders.is_empty() {
            "No folders found".to_string()
        } else {
            bullet_list("Folders in Apple Notes:", &folders)
        };
        structured_result_with_text(&json!({"folders": folders}), Some(text))
    }

    async fn get_folder_info(&self, input: FolderNameInput) -> Result<CallToolResult, NotesError> {
        let info = self.client.get_folder_info(&input.folder_name).await?;
        let text = render_folder_info(&info);
        structured_result_with_text(&info, Some(text))
    }

    async fn move_note_to_folder(
        &self,
        input: MoveNoteInput,
    ) -> Result<CallToolResult, NotesError> {
        self.client
            .move_note_to_folder(&input.note_name, &input.folder_name)
            .await?;
        let text = format!(
            "Note '{}' moved to folder '{}'",
            input.note_name, input.folder_name
        );
        structured_result_with_text(
            &json!({"note_name": input.note_name, "folder_name": input.folder_name}),
            Some(text),
        )
    }
}

fn tool<T: JsonSchema>(
    name: &'static str,
    title: &str,
    description: &'static str,
) -> Result<Tool, NotesError> {
    Ok(Tool {
        name: Cow::Borrowed(name),
        title: Some(title.to_string()),
        description: Some(Cow::Borrowed(description)),
        input_schema: input_schema::<T>()?,
        output_schema: None,
        annotations: None,
        icons: None,
    })
}

fn resource_template(uri_template: &str, name: &str, description: &str) -> ResourceTemplate {
    RawResourceTemplate {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        mime_type: Some("text/plain".to_string()),
    }
    .no_annotation()
}

fn parse_args<T: DeserializeOwned>(args: JsonObject) -> Result<T, NotesError> {
    serde_json::from_value(serde_json::Value::Object(args))
        .map_err(|e| NotesError::InvalidParams(e.to_string()))
}

fn decode_uri_name(raw: &str) -> Result<String, NotesError> {
    urlencoding::decode(raw)
        .map(|name| name.into_owned())
        .map_err(|e| NotesError::InvalidParams(format!("invalid resource name: {}", e)))
}

pub fn render_note(note: &Note) -> String {
    let folder = note
        .folder
        .as_ref()
        .map(|f| format!(" (in folder: {})", f))
        .unwrap_or_default();
    format!("Note: {}{}\n\n{}", note.name, folder, note.content)
}

pub fn render_folder_info(info: &FolderInfo) -> String {
    let count = info
        .note_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("Folder: {}\nNotes: {}", info.name, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_note() {
        let note = Note {
            name: "Test Note".into(),
            content: "This is a test note".into(),
            folder: Some("Test Folder".into()),
        };
        assert_eq!(
            render_note(&note),
            "Note: Test Note (in folder: Test Folder)\n\nThis is a test note"
        );

        let loose = Note {
            folder: None,
            ..note
        };
        assert!(!render_note(&loose).contains("(in folder:"));
    }

    #[test]
    fn test_render_folder_info() {
        let info = FolderInfo {
            name: "Test Folder".into(),
            note_count: Some(5),
        };
        assert_eq!(render_folder_info(&info), "Folder: Test Folder\nNotes: 5");
        let unknown = FolderInfo {
            note_count: None,
            ..info
        };
        assert_eq!(
            render_folder_info(&unknown),
            "Folder: Test Folder\nNotes: unknown"
        );
    }

    #[test]
    fn test_decode_uri_name() {
        assert_eq!(decode_uri_name("Shopping%20List").unwrap(), "Shopping List");
        assert_eq!(decode_uri_name("plain").unwrap(), "plain");
    }

    #[test]
    fn test_parse_args_reports_missing_field() {
        let err = parse_args::<GetNoteContentInput>(JsonObject::new()).unwrap_err();
        assert!(matches!(err, NotesError::InvalidParams(msg) if msg.contains("note_name")));
    }
}
