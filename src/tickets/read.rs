use super::{validate_key, TicketService};
use crate::api::jira::TICKET_FIELDS;
use crate::errors::Result;
use crate::models::document::render_plain;
use crate::models::ticket::{name_or, Comment, JiraTicket, TicketRecord};
use serde_json::Value;

impl TicketService {
    pub async fn read(&self, key: &str) -> Result<TicketRecord> {
        validate_key(key)?;
        let ticket = self.client.get_ticket(key, TICKET_FIELDS).await?;
        Ok(to_record(
            ticket,
            self.settings.comment_limit,
            &self.settings.browse_url(key),
        ))
    }
}

/// Maps a fetched ticket, keeping the newest `comment_limit` comments in
/// chronological order.
pub fn to_record(ticket: JiraTicket, comment_limit: usize, url: &str) -> TicketRecord {
    let fields = ticket.fields;

    let mut comments: Vec<Comment> = fields
        .comment
        .map(|page| page.comments)
        .unwrap_or_default()
        .into_iter()
        .map(|c| Comment {
            author: c
                .author
                .map(|a| a.display_name)
                .unwrap_or_else(|| "Unknown".to_string()),
            created_at: c.created.unwrap_or_default(),
            body: render_plain(c.body.as_ref().unwrap_or(&Value::Null)),
        })
        .collect();
    if comments.len() > comment_limit {
        comments.drain(..comments.len() - comment_limit);
    }

    TicketRecord {
        key: ticket.key,
        summary: fields.summary,
        status: name_or(&fields.status, "Unknown"),
        assignee: fields.assignee.as_ref().map(|a| a.display_name.clone()),
        assignee_email: fields.assignee.and_then(|a| a.email_address),
        priority: name_or(&fields.priority, "None"),
        issue_type: name_or(&fields.issue_type, "Unknown"),
        created_at: fields.created.unwrap_or_default(),
        updated_at: fields.updated.unwrap_or_default(),
        labels: fields.labels,
        components: fields.components.into_iter().map(|c| c.name).collect(),
        fix_versions: fields.fix_versions.into_iter().map(|v| v.name).collect(),
        description: render_plain(fields.description.as_ref().unwrap_or(&Value::Null)),
        comments,
        url: url.to_string(),
    }
}
