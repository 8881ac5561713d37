use rmcp::model::{CallToolResult, Content, JsonObject};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;

use crate::error::NotesError;

/// Build a tool result carrying `data` as structured content plus a text
/// block for clients that only read text. Non-object data is wrapped under `data`.
pub fn structured_result_with_text<T: Serialize>(
    data: &T,
    text_fallback: Option<String>,
) -> Result<CallToolResult, NotesError> {
    let value = serde_json::to_value(data)?;

    let map: JsonMap<String, JsonValue> = match value {
        JsonValue::Object(m) => m,
        other => {
            let mut m = JsonMap::new();
            m.insert("data".to_string(), other);
            m
        }
    };

    let text = match text_fallback {
        Some(text) => text,
        None => serde_json::to_string_pretty(&map)?,
    };

    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(JsonValue::Object(map)),
        is_error: Some(false),
        meta: None,
    })
}

/// A failed tool call, reported inside the result so the caller sees the host's message.
pub fn tool_error_result(err: &NotesError) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}

/// JSON schema object for a tool input type.
pub fn input_schema<T: JsonSchema>() -> Result<Arc<JsonObject>, NotesError> {
    match serde_json::to_value(schemars::schema_for!(T))? {
        JsonValue::Object(map) => Ok(Arc::new(map)),
        _ => Err(NotesError::Parse("schema is not a JSON object".to_string())),
    }
}

/// `header` followed by one bullet per item, as shown to assistants.
pub fn bullet_list(header: &str, items: &[String]) -> String {
    let mut out = String::from(header);
    for item in items {
        out.push_str("\n• ");
        out.push_str(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_is_wrapped() {
        let result = structured_result_with_text(&vec!["a", "b"], None).unwrap();
        assert_eq!(
            result.structured_content,
            Some(json!({"data": ["a", "b"]}))
        );
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn test_text_fallback_is_first_content() {
        let result =
            structured_result_with_text(&json!({"ok": true}), Some("done".to_string())).unwrap();
        let text = result.content[0].as_text().map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("done"));
    }

    #[test]
    fn test_error_result_flags_error() {
        let result = tool_error_result(&NotesError::HostExecution("boom".into()));
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.content[0].as_text().map(|t| t.text.as_str()),
            Some("boom")
        );
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(
            bullet_list("Folders:", &["A".to_string(), "B".to_string()]),
            "Folders:\n• A\n• B"
        );
    }
}
