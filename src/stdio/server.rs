use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
    transport::stdio,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::metadata::{DescribeTableArgs, RunQueryArgs, all_tool_metadata};
use crate::tools::{DESCRIBE_INDEXES_AND_FOREIGN_KEYS, DESCRIBE_TABLE, DatabaseTools, RUN_QUERY};

/// MCP server exposing [`DatabaseTools`] over stdio.
pub struct MysqlToolServer {
    tools: DatabaseTools,

    /// Enabled tool names (filtered by --tool/--tools CLI args)
    enabled_tools: Option<HashSet<String>>,
}

impl MysqlToolServer {
    pub fn new(tools: DatabaseTools, enabled_tools: Option<HashSet<String>>) -> Self {
        Self {
            tools,
            enabled_tools,
        }
    }

    /// Serve until the client disconnects or `shutdown_token` is cancelled.
    pub async fn serve_stdio(self, shutdown_token: CancellationToken) -> Result<()> {
        log::info!("Starting stdio server");

        let service = self
            .serve_with_ct(stdio(), shutdown_token)
            .await
            .inspect_err(|e| {
                log::error!("serving error: {e:?}");
            })?;
        service.waiting().await?;

        log::info!("Stdio server stopped");
        Ok(())
    }

    fn is_enabled(&self, tool_name: &str) -> bool {
        self.enabled_tools
            .as_ref()
            .is_none_or(|enabled| enabled.contains(tool_name))
    }

    /// Run one tool call.
    ///
    /// Database failures come back as error-flagged tool results; only
    /// unknown tools and malformed arguments are protocol errors.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, McpError> {
        if !self.is_enabled(tool_name) {
            return Err(McpError::invalid_params(
                format!("Tool '{tool_name}' is not enabled"),
                None,
            ));
        }

        match tool_name {
            RUN_QUERY => {
                let args: RunQueryArgs = parse_args(tool_name, arguments)?;
                tool_result(tool_name, self.tools.run_query(&args.sql).await)
            }
            DESCRIBE_TABLE => {
                let args: DescribeTableArgs = parse_args(tool_name, arguments)?;
                let result = self
                    .tools
                    .describe_table(&args.schema, &args.table_name)
                    .await;
                tool_result(tool_name, result)
            }
            DESCRIBE_INDEXES_AND_FOREIGN_KEYS => {
                let args: DescribeTableArgs = parse_args(tool_name, arguments)?;
                let result = self
                    .tools
                    .describe_indexes_and_foreign_keys(&args.schema, &args.table_name)
                    .await;
                tool_result(tool_name, result)
            }
            _ => Err(McpError::invalid_params(
                format!("Unknown tool: {tool_name}"),
                None,
            )),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool_name: &str, arguments: JsonObject) -> Result<T, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments)).map_err(|e| {
        McpError::invalid_params(format!("Invalid arguments for '{tool_name}': {e}"), None)
    })
}

fn tool_result<T: Serialize>(
    tool_name: &str,
    result: crate::error::Result<T>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => {
            log::warn!("Tool '{tool_name}' failed: {e}");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

impl ServerHandler for MysqlToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "MySQL database tools: run_query executes unrestricted SQL; describe_table and describe_indexes_and_foreign_keys inspect table structure.".to_string(),
            ),
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        log::debug!("Tool call '{}'", request.name);
        let arguments = request.arguments.unwrap_or_default();
        self.dispatch(&request.name, arguments).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut tools = Vec::new();

        for tool_meta in all_tool_metadata() {
            if !self.is_enabled(tool_meta.name) {
                continue;
            }

            // Convert schema Value to Arc<JsonObject>
            let schema_obj = match tool_meta.schema {
                serde_json::Value::Object(obj) => Arc::new(obj),
                _ => Arc::new(JsonObject::new()),
            };

            tools.push(Tool::new(tool_meta.name, tool_meta.description, schema_obj));
        }

        log::debug!("Serving {} tools", tools.len());

        Ok(ListToolsResult::with_all_items(tools))
    }
}
