//! MCP tool implementations.
//!
//! | Tool | Description |
//! |------|-------------|
//! | `create_ticket` | Preview, then (with `confirm: true`) create a ticket |
//! | `get_ticket` | Full ticket details with recent comments |
//! | `update_ticket` | Change summary, description or labels |
//! | `list_tickets` | Filtered, ordered ticket list for a project |

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ErrorData as McpError},
    tool, tool_router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors;
use crate::tickets::TicketService;

use super::format::{format_created, format_page, format_preview, format_record, format_updated};
use super::requests::{
    CreateTicketRequest, GetTicketRequest, ListTicketsRequest, UpdateTicketRequest,
};

#[derive(Clone)]
pub struct JiraTools {
    service: Arc<TicketService>,
    // One tool call runs at a time.
    gate: Arc<Mutex<()>>,
    pub(super) tool_router: ToolRouter<Self>,
}

/// Turns an operation outcome into a tool result. Failures are reported
/// in-band with the error flag set so the session stays up.
fn respond(tool: &str, outcome: errors::Result<String>) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            if e.is_validation() {
                debug!(tool, error = %e, "rejected tool call");
            } else {
                warn!(tool, error = %e, "tool call failed");
            }
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

#[tool_router]
impl JiraTools {
    pub fn new(service: TicketService) -> Self {
        Self {
            service: Arc::new(service),
            gate: Arc::new(Mutex::new(())),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "create_ticket",
        description = "Create a Jira ticket with a Current/Desired description. The first call \
                       returns a preview and creates nothing; call again with confirm: true to \
                       create it."
    )]
    async fn create_ticket(
        &self,
        Parameters(request): Parameters<CreateTicketRequest>,
    ) -> Result<CallToolResult, McpError> {
        let _turn = self.gate.lock().await;
        respond("create_ticket", self.run_create(&request).await)
    }

    #[tool(
        name = "get_ticket",
        description = "Get a ticket's details: status, assignee, priority, labels, components, \
                       fix versions, description and the most recent comments."
    )]
    async fn get_ticket(
        &self,
        Parameters(request): Parameters<GetTicketRequest>,
    ) -> Result<CallToolResult, McpError> {
        let _turn = self.gate.lock().await;
        let outcome = self
            .service
            .read(request.ticket_key.trim())
            .await
            .map(|record| format_record(&record));
        respond("get_ticket", outcome)
    }

    #[tool(
        name = "update_ticket",
        description = "Update a ticket's summary, description (append or replace) or labels \
                       (add or remove). At least one change is required."
    )]
    async fn update_ticket(
        &self,
        Parameters(request): Parameters<UpdateTicketRequest>,
    ) -> Result<CallToolResult, McpError> {
        let _turn = self.gate.lock().await;
        let outcome = self
            .service
            .update(&request.into_spec())
            .await
            .map(|updated| format_updated(&updated));
        respond("update_ticket", outcome)
    }

    #[tool(
        name = "list_tickets",
        description = "List tickets in a project, optionally filtered by assignee (me, \
                       unassigned, all, or a user) and status, ordered by rank, created, \
                       updated or priority."
    )]
    async fn list_tickets(
        &self,
        Parameters(request): Parameters<ListTicketsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let _turn = self.gate.lock().await;
        respond("list_tickets", self.run_list(&request).await)
    }
}

impl JiraTools {
    /// Without `confirm` this stops at the preview and sends nothing.
    async fn run_create(&self, request: &CreateTicketRequest) -> errors::Result<String> {
        let ticket = self.service.prepare_ticket(&request.as_new_ticket())?;
        if !request.confirm {
            return Ok(format_preview(&ticket));
        }
        let created = self.service.create(&ticket).await?;
        Ok(format_created(&created))
    }

    async fn run_list(&self, request: &ListTicketsRequest) -> errors::Result<String> {
        let query = self.service.list_query(
            &request.project,
            request.assignee.as_deref(),
            request.status.as_deref(),
            request.order_by.as_deref(),
            request.max_results,
        )?;
        let page = self.service.list(&query).await?;
        Ok(format_page(&page))
    }
}
