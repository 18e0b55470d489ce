use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    // Configuration errors
    Config(String),
    ConfigMissing(Vec<&'static str>),

    // Local validation, raised before any request is sent
    Validation(String),

    // Jira errors
    Auth(u16),
    Permission(String),
    NotFound(String),
    Remote { status: Option<u16>, body: String },
}

impl TrackerError {
    /// Maps a non-success HTTP status to the matching error.
    ///
    /// `subject` is the ticket key the request was about, if any. A 404
    /// without a subject has nothing to point at and is reported as a
    /// plain remote error.
    pub fn from_status(status: u16, body: String, subject: Option<&str>) -> Self {
        match (status, subject) {
            (401, _) => TrackerError::Auth(status),
            (403, Some(key)) => TrackerError::Permission(key.to_string()),
            (403, None) => TrackerError::Permission("this resource".to_string()),
            (404, Some(key)) => TrackerError::NotFound(key.to_string()),
            _ => TrackerError::Remote {
                status: Some(status),
                body,
            },
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TrackerError::Validation(_))
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            TrackerError::Config(msg) => {
                writeln!(f, "Invalid configuration")?;
                writeln!(f, "   {}\n", msg)?;
                writeln!(f, "   To fix:")?;
                writeln!(f, "   1. Check your config file: ~/.jira-tools/config.toml")?;
                write!(f, "   2. Check the JIRA_* environment variables")
            }
            TrackerError::ConfigMissing(vars) => {
                writeln!(f, "Missing required configuration: {}", vars.join(", "))?;
                writeln!(f, "   Credentials are read from the environment at startup\n")?;
                writeln!(f, "   To fix:")?;
                writeln!(f, "   1. Create a token: https://id.atlassian.com/manage-profile/security/api-tokens")?;
                write!(f, "   2. Export JIRA_EMAIL and JIRA_API_TOKEN before starting the server")
            }

            TrackerError::Validation(msg) => {
                writeln!(f, "Invalid request")?;
                write!(f, "   {}", msg)
            }

            // Jira errors
            TrackerError::Auth(status) => {
                writeln!(f, "Jira authentication failed ({})", status)?;
                writeln!(f, "   Your API token may have expired or is invalid\n")?;
                writeln!(f, "   To fix:")?;
                writeln!(f, "   1. Generate new token: https://id.atlassian.com/manage-profile/security/api-tokens")?;
                write!(f, "   2. Check JIRA_EMAIL and JIRA_API_TOKEN")
            }
            TrackerError::Permission(subject) => {
                writeln!(f, "Permission denied for {}", subject)?;
                writeln!(f, "   The account is authenticated but not allowed to do this\n")?;
                writeln!(f, "   To fix:")?;
                writeln!(f, "   1. Verify you have access to this project")?;
                write!(f, "   2. Ask a project administrator for the missing permission")
            }
            TrackerError::NotFound(key) => {
                writeln!(f, "Ticket '{}' not found", key)?;
                writeln!(f, "   The ticket doesn't exist or you don't have access to it\n")?;
                writeln!(f, "   To fix:")?;
                writeln!(f, "   1. Check the ticket key is correct")?;
                write!(f, "   2. Search for tickets with list_tickets")
            }
            TrackerError::Remote { status, body } => {
                match status {
                    Some(code) => writeln!(f, "Jira API error ({})", code)?,
                    None => writeln!(f, "Jira request failed")?,
                }
                writeln!(f, "   {}\n", body)?;
                write!(f, "   Try again or check your network connection")
            }
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TrackerError::from_status(status.as_u16(), err.to_string(), None),
            None => TrackerError::Remote {
                status: None,
                body: err.to_string(),
            },
        }
    }
}

impl From<::config::ConfigError> for TrackerError {
    fn from(err: ::config::ConfigError) -> Self {
        TrackerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            TrackerError::from_status(401, String::new(), Some("FRON-1")),
            TrackerError::Auth(401)
        ));
        assert!(matches!(
            TrackerError::from_status(403, String::new(), Some("FRON-1")),
            TrackerError::Permission(ref k) if k == "FRON-1"
        ));
        assert!(matches!(
            TrackerError::from_status(404, String::new(), Some("FRON-1")),
            TrackerError::NotFound(ref k) if k == "FRON-1"
        ));
        assert!(matches!(
            TrackerError::from_status(500, "boom".to_string(), Some("FRON-1")),
            TrackerError::Remote { status: Some(500), ref body } if body == "boom"
        ));
    }

    #[test]
    fn test_unkeyed_not_found_is_remote() {
        let err = TrackerError::from_status(404, "no such project".to_string(), None);
        assert!(matches!(err, TrackerError::Remote { status: Some(404), .. }));
    }

    #[test]
    fn test_display_carries_details() {
        let err = TrackerError::NotFound("FRON-42".to_string());
        assert!(err.to_string().contains("Ticket 'FRON-42' not found"));

        let err = TrackerError::Remote {
            status: Some(400),
            body: r#"{"errors":{"summary":"required"}}"#.to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("Jira API error (400)"));
        assert!(text.contains(r#"{"errors":{"summary":"required"}}"#));

        let err = TrackerError::ConfigMissing(vec!["JIRA_EMAIL", "JIRA_API_TOKEN"]);
        assert!(err.to_string().contains("JIRA_EMAIL, JIRA_API_TOKEN"));
    }
}
