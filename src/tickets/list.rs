use super::TicketService;
use crate::api::jira::SEARCH_FIELDS;
use crate::errors::{Result, TrackerError};
use crate::models::ticket::{name_or, TicketPage, TicketSummary};
use tracing::warn;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    Rank,
    Created,
    Updated,
    Priority,
}

impl OrderBy {
    /// Unrecognised values fall back to rank ordering.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("rank") => OrderBy::Rank,
            Some("created") => OrderBy::Created,
            Some("updated") => OrderBy::Updated,
            Some("priority") => OrderBy::Priority,
            Some(other) => {
                warn!(order_by = other, "unknown ordering, using rank");
                OrderBy::Rank
            }
        }
    }

    fn clause(self) -> &'static str {
        match self {
            OrderBy::Rank => "ORDER BY Rank ASC",
            OrderBy::Created => "ORDER BY created DESC",
            OrderBy::Updated => "ORDER BY updated DESC",
            OrderBy::Priority => "ORDER BY priority DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeFilter {
    Me,
    Unassigned,
    All,
    User(String),
}

impl AssigneeFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => AssigneeFilter::All,
            Some(value) => match value.to_lowercase().as_str() {
                "me" => AssigneeFilter::Me,
                "unassigned" => AssigneeFilter::Unassigned,
                "all" => AssigneeFilter::All,
                _ => AssigneeFilter::User(value.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub project: String,
    pub assignee: AssigneeFilter,
    pub status: Option<String>,
    pub order_by: OrderBy,
    pub limit: u32,
}

impl ListQuery {
    pub fn jql(&self) -> String {
        let mut clauses = vec![format!("project = \"{}\"", escape(&self.project))];

        match &self.assignee {
            AssigneeFilter::Me => clauses.push("assignee = currentUser()".to_string()),
            AssigneeFilter::Unassigned => clauses.push("assignee is EMPTY".to_string()),
            AssigneeFilter::All => {}
            AssigneeFilter::User(user) => clauses.push(format!("assignee = \"{}\"", escape(user))),
        }

        if let Some(status) = &self.status {
            clauses.push(format!("status = \"{}\"", escape(status)));
        }

        format!("{} {}", clauses.join(" AND "), self.order_by.clause())
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl TicketService {
    /// Builds a query from loosely typed tool arguments.
    pub fn list_query(
        &self,
        project: &str,
        assignee: Option<&str>,
        status: Option<&str>,
        order_by: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ListQuery> {
        if project.trim().is_empty() {
            return Err(TrackerError::Validation("Project is required".to_string()));
        }

        Ok(ListQuery {
            project: self.aliases.resolve(project),
            assignee: AssigneeFilter::parse(assignee),
            status: status
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            order_by: OrderBy::parse_lenient(order_by),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        })
    }

    pub async fn list(&self, query: &ListQuery) -> Result<TicketPage> {
        let jql = query.jql();
        let page = self.client.search(&jql, query.limit, SEARCH_FIELDS).await?;
        let returned = page.issues.len() as u64;

        let total = if page.has_more() {
            match self.client.count(&jql).await {
                Ok(count) => count.max(returned),
                Err(e) => {
                    warn!(error = %e, "could not count matching tickets");
                    returned
                }
            }
        } else {
            returned
        };

        let tickets: Vec<TicketSummary> = page
            .issues
            .into_iter()
            .map(|issue| {
                let fields = issue.fields;
                TicketSummary {
                    key: issue.key,
                    summary: fields.summary,
                    status: name_or(&fields.status, "Unknown"),
                    assignee: fields.assignee.map(|a| a.display_name),
                    priority: name_or(&fields.priority, "None"),
                    issue_type: name_or(&fields.issue_type, "Unknown"),
                    updated_at: fields.updated.unwrap_or_default(),
                }
            })
            .collect();

        Ok(TicketPage {
            total,
            tickets,
            query_description: jql,
        })
    }
}
