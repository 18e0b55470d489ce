use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::TrackerError;

// Wire shapes returned by the Jira REST API. Only the fields the tools
// read are modelled; everything is optional where Jira may send null.

#[derive(Debug, Deserialize, Serialize)]
pub struct JiraTicket {
    pub key: String,
    pub fields: TicketFields,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TicketFields {
    pub summary: String,
    pub description: Option<Value>,
    pub status: Option<Named>,
    pub assignee: Option<User>,
    pub priority: Option<Named>,
    #[serde(rename = "issuetype")]
    pub issue_type: Option<Named>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<Named>,
    #[serde(rename = "fixVersions")]
    pub fix_versions: Vec<Named>,
    pub comment: Option<CommentPage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Named {
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CommentPage {
    pub comments: Vec<JiraComment>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct JiraComment {
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// One page of `/search/jql`. The endpoint reports no total, only whether
/// more pages follow.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<JiraTicket>,
    #[serde(rename = "isLast")]
    pub is_last: Option<bool>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some() || self.is_last == Some(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApproximateCount {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct Myself {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IssueType {
    #[default]
    Task,
    Bug,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::Task => write!(f, "Task"),
            IssueType::Bug => write!(f, "Bug"),
        }
    }
}

impl FromStr for IssueType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "task" => Ok(IssueType::Task),
            "bug" => Ok(IssueType::Bug),
            other => Err(TrackerError::Validation(format!(
                "Unknown issue type '{}'. Use Task or Bug.",
                other
            ))),
        }
    }
}

/// A ticket about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketRequest {
    pub title: String,
    pub current_state: String,
    pub desired_state: String,
    pub labels: BTreeSet<String>,
    pub issue_type: IssueType,
    pub project_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedTicket {
    pub key: String,
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub author: String,
    pub created_at: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub assignee_email: Option<String>,
    pub priority: String,
    pub issue_type: String,
    pub created_at: String,
    pub updated_at: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub fix_versions: Vec<String>,
    pub description: String,
    pub comments: Vec<Comment>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub priority: String,
    pub issue_type: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketPage {
    pub total: u64,
    pub tickets: Vec<TicketSummary>,
    pub query_description: String,
}

/// Requested changes to an existing ticket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub ticket_key: String,
    pub summary: Option<String>,
    pub append_description: Option<String>,
    pub replace_description: Option<String>,
    pub add_labels: Option<BTreeSet<String>>,
    pub remove_labels: Option<BTreeSet<String>>,
}

impl UpdateSpec {
    pub fn has_changes(&self) -> bool {
        self.summary.is_some()
            || self.append_description.is_some()
            || self.replace_description.is_some()
            || self.add_labels.is_some()
            || self.remove_labels.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatedTicket {
    pub key: String,
    pub changes: Vec<String>,
    pub url: String,
}

pub(crate) fn name_or(named: &Option<Named>, fallback: &str) -> String {
    named
        .as_ref()
        .map(|n| n.name.clone())
        .unwrap_or_else(|| fallback.to_string())
}
