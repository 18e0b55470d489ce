use super::TicketService;
use crate::errors::{Result, TrackerError};
use crate::models::document::Document;
use crate::models::ticket::{CreatedTicket, IssueType, TicketRequest};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::info;

/// Raw create arguments, before defaults and aliases are applied.
#[derive(Debug, Clone, Default)]
pub struct NewTicket<'a> {
    pub title: &'a str,
    pub current_state: &'a str,
    pub desired_state: &'a str,
    pub labels: &'a [String],
    pub issue_type: Option<&'a str>,
    pub project: Option<&'a str>,
}

impl TicketService {
    /// Applies defaults and resolves the project. Never touches the network.
    pub fn prepare_ticket(&self, new: &NewTicket<'_>) -> Result<TicketRequest> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(TrackerError::Validation("Title must not be empty".to_string()));
        }

        let project = new
            .project
            .filter(|p| !p.trim().is_empty())
            .or(self.settings.default_project.as_deref())
            .ok_or_else(|| {
                TrackerError::Validation(
                    "No project given and no default project configured (JIRA_DEFAULT_PROJECT)"
                        .to_string(),
                )
            })?;

        let issue_type = match new.issue_type {
            Some(raw) => raw.parse::<IssueType>()?,
            None => IssueType::default(),
        };

        let labels: BTreeSet<String> = new
            .labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(TicketRequest {
            title: title.to_string(),
            current_state: new.current_state.to_string(),
            desired_state: new.desired_state.to_string(),
            labels,
            issue_type,
            project_key: self.aliases.resolve(project),
        })
    }

    pub async fn create(&self, request: &TicketRequest) -> Result<CreatedTicket> {
        let created = self.client.create_ticket(&create_body(request)).await?;
        info!(key = %created.key, project = %request.project_key, "created ticket");

        Ok(CreatedTicket {
            url: self.settings.browse_url(&created.key),
            key: created.key,
            id: created.id,
        })
    }
}

pub fn create_body(request: &TicketRequest) -> Value {
    let description = Document::two_section(&request.current_state, &request.desired_state);
    json!({
        "fields": {
            "project": { "key": request.project_key },
            "summary": request.title,
            "description": description.to_adf(),
            "issuetype": { "name": request.issue_type.to_string() },
            "labels": request.labels,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::test_service;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prepare_applies_defaults_and_aliases() {
        let service = test_service("http://localhost");
        let tags = labels(&["ui", " ", "ui", "login"]);

        let request = service
            .prepare_ticket(&NewTicket {
                title: "  Login button misaligned ",
                current_state: "Button overlaps footer",
                desired_state: "Button sits above footer",
                labels: &tags,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(request.title, "Login button misaligned");
        assert_eq!(request.project_key, "FRON");
        assert_eq!(request.issue_type, IssueType::Task);
        assert_eq!(
            request.labels.iter().cloned().collect::<Vec<_>>(),
            labels(&["login", "ui"])
        );

        let request = service
            .prepare_ticket(&NewTicket {
                title: "Crash",
                project: Some("Backend"),
                issue_type: Some("bug"),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(request.project_key, "BACK");
        assert_eq!(request.issue_type, IssueType::Bug);
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let service = test_service("http://localhost");

        let err = service
            .prepare_ticket(&NewTicket {
                title: "   ",
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());

        let err = service
            .prepare_ticket(&NewTicket {
                title: "Something",
                issue_type: Some("epic"),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_create_body_uses_template() {
        let service = test_service("http://localhost");
        let tags = labels(&["ui"]);
        let request = service
            .prepare_ticket(&NewTicket {
                title: "Title",
                current_state: "now",
                desired_state: "later",
                labels: &tags,
                ..Default::default()
            })
            .unwrap();

        let body = create_body(&request);
        let fields = &body["fields"];
        assert_eq!(fields["project"]["key"], "FRON");
        assert_eq!(fields["issuetype"]["name"], "Task");
        assert_eq!(fields["labels"], json!(["ui"]));

        let content = fields["description"]["content"].as_array().unwrap();
        assert_eq!(content.len(), 5);
        assert_eq!(content[0]["content"][0]["text"], "Current");
        assert_eq!(content[1]["content"][0]["text"], "now");
        assert_eq!(content[3]["content"][0]["text"], "Desired");
        assert_eq!(content[4]["content"][0]["text"], "later");
    }

    #[tokio::test]
    async fn test_create_returns_key_and_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/3/issue")
            .match_body(mockito::Matcher::PartialJson(json!({
                "fields": { "summary": "Title", "project": { "key": "FRON" } }
            })))
            .with_status(201)
            .with_body(r#"{"id":"10042","key":"FRON-42","self":"ignored"}"#)
            .create_async()
            .await;

        let service = test_service(&server.url());
        let request = service
            .prepare_ticket(&NewTicket {
                title: "Title",
                ..Default::default()
            })
            .unwrap();
        let created = service.create(&request).await.unwrap();

        assert_eq!(created.key, "FRON-42");
        assert_eq!(created.id, "10042");
        assert_eq!(created.url, format!("{}/browse/FRON-42", server.url()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_surfaces_upstream_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(400)
            .with_body(r#"{"errors":{"labels":"bad label"}}"#)
            .create_async()
            .await;

        let service = test_service(&server.url());
        let request = service
            .prepare_ticket(&NewTicket {
                title: "Title",
                ..Default::default()
            })
            .unwrap();

        match service.create(&request).await {
            Err(TrackerError::Remote { status, body }) => {
                assert_eq!(status, Some(400));
                assert!(body.contains("bad label"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
