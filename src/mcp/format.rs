//! Markdown rendering of tool results for LLM consumption.

use crate::models::ticket::{
    CreatedTicket, TicketPage, TicketRecord, TicketRequest, UpdatedTicket,
};

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// What `create_ticket` would send, shown before anything is created.
pub fn format_preview(request: &TicketRequest) -> String {
    let labels: Vec<String> = request.labels.iter().cloned().collect();

    let mut out = String::from("# Ticket preview (not created yet)\n\n");
    out.push_str(&format!("**Project:** {}\n", request.project_key));
    out.push_str(&format!("**Type:** {}\n", request.issue_type));
    out.push_str(&format!("**Title:** {}\n", request.title));
    out.push_str(&format!("**Labels:** {}\n\n", list_or_none(&labels)));
    out.push_str("## Current\n\n");
    out.push_str(&request.current_state);
    out.push_str("\n\n## Desired\n\n");
    out.push_str(&request.desired_state);
    out.push_str(
        "\n\n---\nReview the details above. To create this ticket, call create_ticket \
         again with the same arguments and `confirm: true`.",
    );
    out
}

pub fn format_created(created: &CreatedTicket) -> String {
    format!(
        "Created **{}** (id {})\n\n{}",
        created.key, created.id, created.url
    )
}

pub fn format_record(record: &TicketRecord) -> String {
    let mut out = format!("# {}: {}\n\n", record.key, record.summary);

    out.push_str("| Field | Value |\n|-------|-------|\n");
    out.push_str(&format!("| Status | {} |\n", record.status));
    out.push_str(&format!("| Type | {} |\n", record.issue_type));
    out.push_str(&format!("| Priority | {} |\n", record.priority));
    let assignee = match (&record.assignee, &record.assignee_email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.clone(),
        (None, _) => "Unassigned".to_string(),
    };
    out.push_str(&format!("| Assignee | {} |\n", assignee));
    out.push_str(&format!("| Created | {} |\n", or_dash(&record.created_at)));
    out.push_str(&format!("| Updated | {} |\n", or_dash(&record.updated_at)));
    out.push_str(&format!("| Labels | {} |\n", list_or_none(&record.labels)));
    out.push_str(&format!("| Components | {} |\n", list_or_none(&record.components)));
    out.push_str(&format!("| Fix versions | {} |\n", list_or_none(&record.fix_versions)));

    out.push_str("\n## Description\n\n");
    if record.description.is_empty() {
        out.push_str("_No description_\n");
    } else {
        out.push_str(&record.description);
        out.push('\n');
    }

    if !record.comments.is_empty() {
        out.push_str(&format!("\n## Recent comments ({})\n", record.comments.len()));
        for comment in &record.comments {
            out.push_str(&format!(
                "\n**{}** ({})\n{}\n",
                comment.author,
                or_dash(&comment.created_at),
                comment.body
            ));
        }
    }

    out.push_str(&format!("\n{}", record.url));
    out
}

pub fn format_updated(updated: &UpdatedTicket) -> String {
    let mut out = format!("Updated **{}**\n\n", updated.key);
    for change in &updated.changes {
        out.push_str(&format!("- {}\n", change));
    }
    out.push_str(&format!("\n{}", updated.url));
    out
}

pub fn format_page(page: &TicketPage) -> String {
    let mut out = format!(
        "Showing {} of {} tickets\n\nQuery: `{}`\n\n",
        page.tickets.len(),
        page.total,
        page.query_description
    );

    if page.tickets.is_empty() {
        out.push_str("No tickets found.");
        return out;
    }

    out.push_str("| Key | Summary | Status | Assignee | Priority | Type |\n");
    out.push_str("|-----|---------|--------|----------|----------|------|\n");
    for ticket in &page.tickets {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            ticket.key,
            ticket.summary.replace('|', "\\|"),
            ticket.status,
            ticket.assignee.as_deref().unwrap_or("Unassigned"),
            ticket.priority,
            ticket.issue_type,
        ));
    }
    out
}
