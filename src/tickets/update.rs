use super::{validate_key, TicketService};
use crate::errors::{Result, TrackerError};
use crate::models::document::Document;
use crate::models::ticket::{JiraTicket, UpdateSpec, UpdatedTicket};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, info};

const CURRENT_STATE_FIELDS: &[&str] = &["description", "labels", "updated"];

impl UpdateSpec {
    /// Appending to the description or merging both label directions needs
    /// the ticket's current state.
    pub fn needs_current_state(&self) -> bool {
        let appends = self.replace_description.is_none() && self.append_description.is_some();
        let merges_labels = self.add_labels.is_some() && self.remove_labels.is_some();
        appends || merges_labels
    }
}

impl TicketService {
    /// Applies `spec` to the ticket.
    ///
    /// When the current state is needed this reads and then writes with no
    /// version check in between, so an edit made by someone else between
    /// the two requests is overwritten.
    pub async fn update(&self, spec: &UpdateSpec) -> Result<UpdatedTicket> {
        validate_key(&spec.ticket_key)?;
        if !spec.has_changes() {
            return Err(TrackerError::Validation(
                "Nothing to update. Provide at least one of summary, append_description, \
                 replace_description, add_labels or remove_labels."
                    .to_string(),
            ));
        }

        let current = if spec.needs_current_state() {
            let ticket = self
                .client
                .get_ticket(&spec.ticket_key, CURRENT_STATE_FIELDS)
                .await?;
            debug!(
                key = %spec.ticket_key,
                updated = ticket.fields.updated.as_deref().unwrap_or("unknown"),
                "read current state before update"
            );
            Some(ticket)
        } else {
            None
        };

        let (body, changes) = update_body(spec, current.as_ref());
        self.client.update_ticket(&spec.ticket_key, &body).await?;
        info!(key = %spec.ticket_key, changes = changes.len(), "updated ticket");

        Ok(UpdatedTicket {
            key: spec.ticket_key.clone(),
            changes,
            url: self.settings.browse_url(&spec.ticket_key),
        })
    }
}

/// Builds the edit request and a readable list of what it changes.
pub fn update_body(spec: &UpdateSpec, current: Option<&JiraTicket>) -> (Value, Vec<String>) {
    let mut fields = Map::new();
    let mut update = Map::new();
    let mut changes = Vec::new();

    if let Some(summary) = &spec.summary {
        fields.insert("summary".to_string(), json!(summary));
        changes.push(format!("Summary set to \"{}\"", summary));
    }

    if let Some(text) = &spec.replace_description {
        fields.insert(
            "description".to_string(),
            Document::format(text).to_adf(),
        );
        changes.push("Description replaced".to_string());
    } else if let Some(text) = &spec.append_description {
        let existing = current
            .and_then(|t| t.fields.description.as_ref())
            .map(Document::from_adf)
            .unwrap_or_default();
        let document = if existing.is_empty() {
            Document::format(text)
        } else {
            existing.append(text)
        };
        fields.insert("description".to_string(), document.to_adf());
        changes.push("Description appended".to_string());
    }

    match (&spec.add_labels, &spec.remove_labels) {
        (Some(add), Some(remove)) => {
            let existing = current.map(|t| t.fields.labels.as_slice()).unwrap_or_default();
            let merged = merge_labels(existing, add, remove);
            changes.push(format!("Labels set to [{}]", merged.join(", ")));
            fields.insert("labels".to_string(), json!(merged));
        }
        (Some(add), None) if !add.is_empty() => {
            let ops: Vec<Value> = add.iter().map(|l| json!({ "add": l })).collect();
            update.insert("labels".to_string(), Value::Array(ops));
            changes.push(format!("Labels added: {}", join(add)));
        }
        (None, Some(remove)) if !remove.is_empty() => {
            let ops: Vec<Value> = remove.iter().map(|l| json!({ "remove": l })).collect();
            update.insert("labels".to_string(), Value::Array(ops));
            changes.push(format!("Labels removed: {}", join(remove)));
        }
        _ => {}
    }

    let mut body = Map::new();
    if !fields.is_empty() {
        body.insert("fields".to_string(), Value::Object(fields));
    }
    if !update.is_empty() {
        body.insert("update".to_string(), Value::Object(update));
    }

    (Value::Object(body), changes)
}

/// Current labels in their order, then new ones, minus removals.
fn merge_labels(existing: &[String], add: &BTreeSet<String>, remove: &BTreeSet<String>) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for label in add {
        if !merged.contains(label) {
            merged.push(label.clone());
        }
    }
    merged.retain(|label| !remove.contains(label));
    merged
}

fn join(labels: &BTreeSet<String>) -> String {
    labels.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::test_service;

    fn set(items: &[&str]) -> Option<BTreeSet<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    fn spec(key: &str) -> UpdateSpec {
        UpdateSpec {
            ticket_key: key.to_string(),
            ..Default::default()
        }
    }

    fn current(description: Value, labels: &[&str]) -> JiraTicket {
        serde_json::from_value(json!({
            "key": "FRON-1",
            "fields": { "summary": "", "description": description, "labels": labels }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_bad_keys_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let service = test_service(&server.url());

        for key in ["abc-1", "FRON1", ""] {
            let mut request = spec(key);
            request.summary = Some("New".to_string());
            let err = service.update(&request).await.unwrap_err();
            assert!(err.is_validation(), "{key:?} should be rejected");
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejects_empty_change_set_without_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = test_service(&server.url())
            .update(&spec("FRON-1"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Nothing to update"));
        mock.assert_async().await;
    }

    #[test]
    fn test_needs_current_state() {
        let mut request = spec("FRON-1");
        request.summary = Some("x".to_string());
        assert!(!request.needs_current_state());

        request.add_labels = set(&["a"]);
        assert!(!request.needs_current_state());

        request.remove_labels = set(&["b"]);
        assert!(request.needs_current_state());

        let mut request = spec("FRON-1");
        request.append_description = Some("more".to_string());
        assert!(request.needs_current_state());

        request.replace_description = Some("fresh".to_string());
        assert!(!request.needs_current_state());
    }

    #[test]
    fn test_replace_wins_over_append() {
        let mut request = spec("FRON-1");
        request.append_description = Some("appended".to_string());
        request.replace_description = Some("replaced".to_string());

        let (body, changes) = update_body(&request, None);
        let content = body["fields"]["description"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["content"][0]["text"], "replaced");
        assert_eq!(changes, vec!["Description replaced"]);
    }

    #[test]
    fn test_append_keeps_existing_description() {
        let existing = json!({ "type": "doc", "version": 1, "content": [
            { "type": "codeBlock", "content": [{ "type": "text", "text": "panic!()" }] }
        ]});
        let ticket = current(existing.clone(), &[]);
        let mut request = spec("FRON-1");
        request.append_description = Some("## Update\nFixed".to_string());

        let (body, _) = update_body(&request, Some(&ticket));
        let content = body["fields"]["description"]["content"].as_array().unwrap();
        assert_eq!(content[0], existing["content"][0]);
        assert_eq!(content[2]["type"], "rule");
        assert_eq!(content[4]["type"], "heading");
        assert_eq!(content[5]["content"][0]["text"], "Fixed");
    }

    #[test]
    fn test_append_to_empty_description_has_no_separator() {
        let ticket = current(Value::Null, &[]);
        let mut request = spec("FRON-1");
        request.append_description = Some("First words".to_string());

        let (body, _) = update_body(&request, Some(&ticket));
        let content = body["fields"]["description"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
    }

    #[test]
    fn test_single_direction_labels_use_update_ops() {
        let mut request = spec("FRON-1");
        request.add_labels = set(&["b", "a"]);

        let (body, changes) = update_body(&request, None);
        assert_eq!(body["update"]["labels"], json!([{ "add": "a" }, { "add": "b" }]));
        assert!(body.get("fields").is_none());
        assert_eq!(changes, vec!["Labels added: a, b"]);

        let mut request = spec("FRON-1");
        request.remove_labels = set(&["old"]);
        let (body, _) = update_body(&request, None);
        assert_eq!(body["update"]["labels"], json!([{ "remove": "old" }]));
    }

    #[test]
    fn test_both_label_directions_merge() {
        let ticket = current(Value::Null, &["keep", "drop"]);
        let mut request = spec("FRON-1");
        request.add_labels = set(&["new", "keep"]);
        request.remove_labels = set(&["drop"]);

        let (body, _) = update_body(&request, Some(&ticket));
        assert_eq!(body["fields"]["labels"], json!(["keep", "new"]));
        assert!(body.get("update").is_none());
    }

    #[tokio::test]
    async fn test_update_reads_then_writes() {
        let mut server = mockito::Server::new_async().await;
        let read = server
            .mock("GET", "/rest/api/3/issue/FRON-9")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "key": "FRON-9",
                    "fields": {
                        "summary": "Old",
                        "labels": ["a"],
                        "updated": "2024-05-02T09:00:00.000+0000"
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;
        let write = server
            .mock("PUT", "/rest/api/3/issue/FRON-9")
            .match_body(mockito::Matcher::PartialJson(json!({
                "fields": { "summary": "New", "labels": ["a", "b"] }
            })))
            .with_status(204)
            .create_async()
            .await;

        let mut request = spec("FRON-9");
        request.summary = Some("New".to_string());
        request.add_labels = set(&["b"]);
        request.remove_labels = set(&["zzz"]);

        let updated = test_service(&server.url()).update(&request).await.unwrap();
        assert_eq!(updated.key, "FRON-9");
        assert_eq!(updated.changes.len(), 2);
        read.assert_async().await;
        write.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_maps_forbidden() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/rest/api/3/issue/FRON-9")
            .with_status(403)
            .create_async()
            .await;

        let mut request = spec("FRON-9");
        request.summary = Some("New".to_string());
        let err = test_service(&server.url()).update(&request).await.unwrap_err();
        assert!(matches!(err, TrackerError::Permission(ref k) if k == "FRON-9"));
    }
}
