use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Implementation, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, ErrorData as McpError, RoleServer, ServerHandler,
};
use tracing::{debug, warn};

use crate::config::ShellConfig;
use crate::executor::Gateway;
use crate::request::ShellExecRequest;
use crate::resources::{RegistryError, ResourceTable};
use crate::response::into_call_tool_result;
use crate::security::Validatable;

#[derive(Clone)]
pub struct ShellServer {
    config: Arc<ShellConfig>,
    gateway: Arc<Gateway>,
    resources: ResourceTable,
    tool_router: ToolRouter<Self>,
}

impl ShellServer {
    /// Build the server, validating the resource table
    pub fn new(config: Arc<ShellConfig>) -> Result<Self, RegistryError> {
        Ok(Self {
            gateway: Arc::new(Gateway::new(Arc::clone(&config))),
            config,
            resources: ResourceTable::new()?,
            tool_router: Self::tool_router(),
        })
    }
}

const SERVER_INSTRUCTIONS: &str = r#"An MCP server that runs shell commands and reports host information.

Tool:
- shell_exec: run a command line through the configured shell.
  - command: the command line (required, non-empty)
  - workingDir: directory to run in; must be under $HOME (defaults to the server's working directory)

Resources:
- hostname://, platform://, shell://, username://
- system-info://: JSON with hostname, platform, shell, username, cpus, totalmem, freemem and uptime"#;

#[rmcp::tool_router]
impl ShellServer {
    #[tool(description = "Executes commands in the specified shell")]
    async fn shell_exec(
        &self,
        Parameters(req): Parameters<ShellExecRequest>,
    ) -> Result<CallToolResult, McpError> {
        if let Err(e) = req.validate() {
            return Err(McpError::invalid_params(e.to_string(), None));
        }
        let outcome = self.gateway.execute_isolated(req).await;
        Ok(into_call_tool_result(outcome))
    }
}

#[rmcp::tool_handler]
impl ServerHandler for ShellServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resources.list()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        read_resource_contents(&self.resources, &self.config, &request.uri)
    }
}

fn read_resource_contents(
    resources: &ResourceTable,
    config: &ShellConfig,
    uri: &str,
) -> Result<ReadResourceResult, McpError> {
    debug!(uri, "Reading resource");
    match resources.read(uri, config) {
        Some(text) => Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        }),
        None => {
            warn!(uri, "Unknown resource");
            Err(McpError::resource_not_found(
                format!("Resource not found: {}", uri),
                None,
            ))
        }
    }
}
