use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::NotesError;
use crate::tools::NotesConnector;
use rmcp::model::*;

pub const SERVER_NAME: &str = "notebridge";

/// MCP Server implementation that wraps the Notes connector
pub struct McpServer {
    connector: NotesConnector,
}

impl McpServer {
    pub fn new(connector: NotesConnector) -> Self {
        Self { connector }
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: InitializeRequestParam,
    ) -> Result<InitializeResult, NotesError> {
        info!(
            client = %request.client_info.name,
            client_version = %request.client_info.version,
            "MCP Server initializing"
        );

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.connector.capabilities(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Apple Notes".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Create, read, update, search, and organize notes and folders in Apple Notes. \
                 Notes and folders are addressed by name."
                    .to_string(),
            ),
        })
    }

    pub async fn handle_list_resources(&self) -> Result<ListResourcesResult, NotesError> {
        Ok(self.connector.list_resources())
    }

    pub async fn handle_list_resource_templates(
        &self,
    ) -> Result<ListResourceTemplatesResult, NotesError> {
        Ok(self.connector.list_resource_templates())
    }

    pub async fn handle_read_resource(
        &self,
        request: ReadResourceRequestParam,
    ) -> Result<ReadResourceResult, NotesError> {
        self.connector.read_resource(request).await
    }

    pub async fn handle_list_tools(&self) -> Result<ListToolsResult, NotesError> {
        self.connector.list_tools()
    }

    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, NotesError> {
        self.connector.call_tool(request).await
    }
}

/// JSON-RPC message handler for the MCP server
pub struct JsonRpcHandler {
    server: McpServer,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Process a JSON-RPC message. Notifications (no `id`) get no response.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        debug!("Handling JSON-RPC request: {:?}", request);

        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let Some(id) = request.get("id").cloned() else {
            debug!(method, "notification received");
            return None;
        };
        let params = request.get("params").cloned().unwrap_or(json!({}));

        let result = match method {
            "initialize" => match serde_json::from_value::<InitializeRequestParam>(params) {
                Ok(req) => respond(self.server.handle_initialize(req).await),
                Err(e) => Err(NotesError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "ping" => Ok(json!({})),
            "tools/list" => respond(self.server.handle_list_tools().await),
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(req) => respond(self.server.handle_call_tool(req).await),
                Err(e) => Err(NotesError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "resources/list" => respond(self.server.handle_list_resources().await),
            "resources/templates/list" => {
                respond(self.server.handle_list_resource_templates().await)
            }
            "resources/read" => match serde_json::from_value::<ReadResourceRequestParam>(params) {
                Ok(req) => respond(self.server.handle_read_resource(req).await),
                Err(e) => Err(NotesError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            _ => Err(NotesError::MethodNotFound.to_jsonrpc_error()),
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}

fn respond<T: serde::Serialize>(result: Result<T, NotesError>) -> Result<Value, Value> {
    result
        .and_then(|r| serde_json::to_value(r).map_err(NotesError::SerdeJson))
        .map_err(|e| e.to_jsonrpc_error())
}
