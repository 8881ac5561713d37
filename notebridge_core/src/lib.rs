// src/lib.rs
pub mod codec;
pub mod config;
pub mod error;
pub mod mcp_server;
pub mod notes;
pub mod runner;
pub mod script;
pub mod tools;
pub mod transport;
pub mod utils;

// Re-export types from rmcp that users of the library might need
pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListResourcesResult, ListToolsResult, ProtocolVersion, RawContent,
    ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities, Tool,
};

pub use crate::codec::{FolderInfo, Note};
pub use crate::config::NotebridgeConfig;
pub use crate::error::NotesError;
pub use crate::notes::{CreatedNote, NotesClient};
pub use crate::runner::{OsaScriptRunner, ScriptOutput, ScriptRunner};
pub use crate::script::{DuplicatePolicy, NotesOperation, NotesScript, ScriptBuilder};
pub use crate::tools::NotesConnector;
