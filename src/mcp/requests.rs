//! Argument bags for the MCP tools.
//!
//! Each tool takes one of these structs; `rmcp` derives the JSON schema it
//! advertises from them and rejects bags that do not deserialize.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::ticket::UpdateSpec;
use crate::tickets::create::NewTicket;

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[schemars(description = "Short summary of the ticket")]
    pub title: String,

    #[schemars(description = "What happens today (shown under a bold 'Current' heading)")]
    pub current_state: String,

    #[schemars(description = "What should happen instead (shown under a bold 'Desired' heading)")]
    pub desired_state: String,

    #[schemars(description = "Labels to attach")]
    pub labels: Option<Vec<String>>,

    #[schemars(description = "Issue type: Task (default) or Bug")]
    pub issue_type: Option<String>,

    #[schemars(
        description = "Project key or friendly name (e.g. FRON, frontend). Defaults to the configured project"
    )]
    pub project: Option<String>,

    #[schemars(
        description = "Set to true to actually create the ticket. Without it only a preview is returned"
    )]
    #[serde(default)]
    pub confirm: bool,
}

impl CreateTicketRequest {
    pub fn as_new_ticket(&self) -> NewTicket<'_> {
        NewTicket {
            title: &self.title,
            current_state: &self.current_state,
            desired_state: &self.desired_state,
            labels: self.labels.as_deref().unwrap_or_default(),
            issue_type: self.issue_type.as_deref(),
            project: self.project.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetTicketRequest {
    #[schemars(description = "Ticket key, e.g. FRON-123")]
    pub ticket_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[schemars(description = "Ticket key, e.g. FRON-123")]
    pub ticket_key: String,

    #[schemars(description = "New summary")]
    pub summary: Option<String>,

    #[schemars(
        description = "Text appended below the existing description after a horizontal rule. Supports # headings, - and 1. lists, **bold** lines"
    )]
    pub append_description: Option<String>,

    #[schemars(
        description = "Text replacing the whole description. Takes precedence over appendDescription"
    )]
    pub replace_description: Option<String>,

    #[schemars(description = "Labels to add")]
    pub add_labels: Option<Vec<String>>,

    #[schemars(description = "Labels to remove")]
    pub remove_labels: Option<Vec<String>>,
}

impl UpdateTicketRequest {
    /// Blank strings and empty label lists count as not supplied.
    pub fn into_spec(self) -> UpdateSpec {
        UpdateSpec {
            ticket_key: self.ticket_key.trim().to_string(),
            summary: non_blank(self.summary),
            append_description: non_blank(self.append_description),
            replace_description: non_blank(self.replace_description),
            add_labels: label_set(self.add_labels),
            remove_labels: label_set(self.remove_labels),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTicketsRequest {
    #[schemars(description = "Project key or friendly name (e.g. FRON, frontend)")]
    pub project: String,

    #[schemars(
        description = "Assignee filter: 'me', 'unassigned', 'all' (default), or a user name or account id"
    )]
    pub assignee: Option<String>,

    #[schemars(description = "Status name, e.g. 'In Progress'")]
    pub status: Option<String>,

    #[schemars(description = "Ordering: rank (default), created, updated or priority")]
    pub order_by: Option<String>,

    #[schemars(description = "Maximum number of tickets to return (default 50, max 100)")]
    pub max_results: Option<u32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn label_set(labels: Option<Vec<String>>) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = labels?
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    (!set.is_empty()).then_some(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_camel_case() {
        let request: CreateTicketRequest = serde_json::from_value(json!({
            "title": "T",
            "currentState": "now",
            "desiredState": "later",
            "issueType": "Bug"
        }))
        .unwrap();

        assert!(!request.confirm);
        assert_eq!(request.issue_type.as_deref(), Some("Bug"));
        assert!(request.as_new_ticket().labels.is_empty());
    }

    #[test]
    fn test_create_request_requires_states() {
        let result: Result<CreateTicketRequest, _> =
            serde_json::from_value(json!({ "title": "T" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_drops_blank_fields() {
        let spec = UpdateTicketRequest {
            ticket_key: " FRON-1 ".to_string(),
            summary: Some("  ".to_string()),
            add_labels: Some(vec!["".to_string(), " ".to_string()]),
            remove_labels: Some(vec![" old ".to_string()]),
            ..Default::default()
        }
        .into_spec();

        assert_eq!(spec.ticket_key, "FRON-1");
        assert_eq!(spec.summary, None);
        assert_eq!(spec.add_labels, None);
        assert_eq!(
            spec.remove_labels,
            Some(BTreeSet::from(["old".to_string()]))
        );
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let schema = serde_json::to_value(schemars::schema_for!(UpdateTicketRequest)).unwrap();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required, &vec![json!("ticketKey")]);
        assert!(schema["properties"]["appendDescription"].is_object());
    }
}
