// src/error.rs
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A required tool parameter was missing, empty, or carried a reserved character.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// osascript exited non-zero or wrote to stderr. Carries the raw host text.
    #[error("{0}")]
    HostExecution(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Host output did not match the record layout the script was built to emit.
    #[error("Unexpected host output: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Tool not found")]
    ToolNotFound,

    #[error("Method not found")]
    MethodNotFound,
}

impl NotesError {
    pub fn code_str(&self) -> &'static str {
        match self {
            NotesError::Validation(_) => "invalid_input",
            NotesError::InvalidParams(_) => "invalid_params",
            NotesError::HostExecution(_) => "host_error",
            NotesError::Timeout(_) => "timeout",
            NotesError::Parse(_) => "parse_error",
            NotesError::Config(_) => "config_error",
            NotesError::ResourceNotFound => "not_found",
            NotesError::ToolNotFound => "tool_not_found",
            NotesError::MethodNotFound => "method_not_found",
            NotesError::Io(_) | NotesError::SerdeJson(_) => "internal_error",
        }
    }

    /// Failures that belong to a tool's result rather than to the JSON-RPC envelope.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            NotesError::Validation(_)
                | NotesError::HostExecution(_)
                | NotesError::Timeout(_)
                | NotesError::Parse(_)
                | NotesError::Io(_)
        )
    }

    pub fn to_jsonrpc_error(&self) -> serde_json::Value {
        let (code, message) = match self {
            NotesError::ResourceNotFound => (-32602, "Resource not found".to_string()),
            NotesError::ToolNotFound => (-32602, "Tool not found".to_string()),
            NotesError::InvalidParams(msg) => (-32602, msg.to_string()),
            NotesError::Validation(msg) => (-32602, msg.to_string()),
            NotesError::MethodNotFound => (-32601, "Method not found".to_string()),
            NotesError::SerdeJson(e) => (-32602, e.to_string()),
            err => (-32603, err.to_string()),
        };

        json!({
            "code": code,
            "message": message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_keeps_raw_text() {
        let err = NotesError::HostExecution("execution error: Note not found: x (-2700)".into());
        assert_eq!(err.to_string(), "execution error: Note not found: x (-2700)");
        assert_eq!(err.code_str(), "host_error");
        assert!(err.is_tool_error());
    }

    #[test]
    fn test_jsonrpc_codes() {
        assert_eq!(NotesError::MethodNotFound.to_jsonrpc_error()["code"], -32601);
        assert_eq!(NotesError::ToolNotFound.to_jsonrpc_error()["code"], -32602);
        assert_eq!(
            NotesError::Config("bad".into()).to_jsonrpc_error()["code"],
            -32603
        );
        assert!(!NotesError::ToolNotFound.is_tool_error());
    }
}
