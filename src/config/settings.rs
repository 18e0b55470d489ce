use crate::errors::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://jira.atlassian.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COMMENT_LIMIT: usize = 5;

/// Process-wide configuration, built once at startup and never mutated.
#[derive(Clone, Deserialize, Serialize)]
pub struct Settings {
    pub email: String,
    pub api_token: String,
    pub base_url: String,
    #[serde(default)]
    pub default_project: Option<String>,
    pub timeout_secs: u64,
    pub comment_limit: usize,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Shape of the merged sources before the required fields are checked.
#[derive(Deserialize)]
struct RawSettings {
    email: Option<String>,
    api_token: Option<String>,
    base_url: String,
    default_project: Option<String>,
    timeout_secs: u64,
    comment_limit: usize,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl Settings {
    /// Loads defaults, then `~/.jira-tools/config.toml` if present, then
    /// `JIRA_*` environment variables.
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok();
        Self::from_sources(path.as_deref(), None)
    }

    /// Same as [`Settings::load`], with an optional replacement for the
    /// process environment.
    pub fn from_sources(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("comment_limit", DEFAULT_COMMENT_LIMIT as u64)?;

        if let Some(path) = file {
            builder = builder.add_source(
                ::config::File::from(path.to_path_buf())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let raw: RawSettings = builder
            .add_source(
                ::config::Environment::with_prefix("JIRA")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        raw.validate()
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        use anyhow::Context;

        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".jira-tools").join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    pub fn masked_token(&self) -> String {
        let visible: String = self.api_token.chars().take(4).collect();
        if self.api_token.chars().count() <= 8 {
            "****".to_string()
        } else {
            format!("{}****", visible)
        }
    }

    /// Copy of the settings safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            api_token: self.masked_token(),
            ..self.clone()
        }
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings> {
        let email = self.email.filter(|v| !v.trim().is_empty());
        let api_token = self.api_token.filter(|v| !v.trim().is_empty());

        let (email, api_token) = match (email, api_token) {
            (Some(email), Some(token)) => (email, token),
            (email, token) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("JIRA_EMAIL");
                }
                if token.is_none() {
                    missing.push("JIRA_API_TOKEN");
                }
                return Err(TrackerError::ConfigMissing(missing));
            }
        };

        if self.timeout_secs == 0 {
            return Err(TrackerError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Settings {
            email,
            api_token,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            default_project: self.default_project.filter(|p| !p.trim().is_empty()),
            timeout_secs: self.timeout_secs,
            comment_limit: self.comment_limit,
            aliases: self.aliases,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("email", &self.email)
            .field("api_token", &self.masked_token())
            .field("base_url", &self.base_url)
            .field("default_project", &self.default_project)
            .field("timeout_secs", &self.timeout_secs)
            .field("comment_limit", &self.comment_limit)
            .field("aliases", &self.aliases)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_settings(base_url: &str) -> Settings {
    Settings {
        email: "test@example.com".to_string(),
        api_token: "test-token".to_string(),
        base_url: base_url.to_string(),
        default_project: Some("FRON".to_string()),
        timeout_secs: 5,
        comment_limit: DEFAULT_COMMENT_LIMIT,
        aliases: BTreeMap::new(),
    }
}
