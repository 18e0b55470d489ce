//! The four ticket operations: create, read, update and list.
//!
//! Each operation validates its input locally, builds the Jira request,
//! and maps the response into one of the records in `models::ticket`.

pub mod create;
pub mod list;
pub mod read;
pub mod update;

use crate::api::jira::JiraClient;
use crate::config::aliases::ProjectAliases;
use crate::config::settings::Settings;
use crate::errors::{Result, TrackerError};
use regex::Regex;
use std::sync::LazyLock;

static TICKET_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]+-\d+$").expect("regex should compile"));

pub struct TicketService {
    client: JiraClient,
    settings: Settings,
    aliases: ProjectAliases,
}

impl TicketService {
    pub fn new(settings: Settings, aliases: ProjectAliases) -> Result<Self> {
        let client = JiraClient::new(&settings)?;
        Ok(Self {
            client,
            settings,
            aliases,
        })
    }
}

/// Rejects anything that is not an uppercase `PROJECT-NUMBER` key.
pub fn validate_key(key: &str) -> Result<()> {
    if TICKET_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(TrackerError::Validation(format!(
            "'{}' is not a ticket key. Expected the form PROJECT-123 (uppercase project key).",
            key
        )))
    }
}

#[cfg(test)]
pub(crate) fn test_service(base_url: &str) -> TicketService {
    use crate::config::settings::test_settings;

    TicketService::new(
        test_settings(base_url),
        ProjectAliases::builtin().expect("builtin aliases are valid"),
    )
    .expect("client builds")
}
