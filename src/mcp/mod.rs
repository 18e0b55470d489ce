//! MCP (Model Context Protocol) server.
//!
//! Exposes the ticket operations as four tools over STDIO. Stdout carries
//! the protocol, so nothing else may write to it while the server runs.
//!
//! - `tools.rs` - tool implementations and the tool router
//! - `requests.rs` - argument bags and their JSON schemas
//! - `format.rs` - markdown rendering of results

pub mod format;
pub mod requests;
pub mod tools;

use rmcp::{
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool_handler, ServerHandler, ServiceExt,
};
use tracing::info;

use crate::tickets::TicketService;
use tools::JiraTools;

const INSTRUCTIONS: &str = "Jira ticket tools.\n\
    - create_ticket: returns a preview first; repeat the call with confirm: true to create\n\
    - get_ticket: full details of one ticket (key like FRON-123)\n\
    - update_ticket: change summary, append to or replace the description, add or remove labels\n\
    - list_tickets: tickets in a project filtered by assignee and status\n\
    Project names such as 'frontend' or 'backend' are mapped to their keys.";

#[tool_handler]
impl ServerHandler for JiraTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                description: None,
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }
}

/// Serves the tools on stdin/stdout until the client disconnects.
pub async fn serve(service: TicketService) -> anyhow::Result<()> {
    info!("starting MCP server on stdio");

    let running = JiraTools::new(service)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))?;

    let reason = running.waiting().await?;
    info!(?reason, "MCP session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::test_service;

    #[test]
    fn test_server_info() {
        let server = JiraTools::new(test_service("http://localhost"));
        let info = server.get_info();

        let instructions = info.instructions.unwrap();
        for tool in ["create_ticket", "get_ticket", "update_ticket", "list_tickets"] {
            assert!(instructions.contains(tool));
        }
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.server_info.description.is_none());
    }
}
