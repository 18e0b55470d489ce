use crate::errors::{Result, TrackerError};
use std::collections::BTreeMap;

/// Human-friendly project names, in lookup order.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("FRON", "FRON"),
    ("frontend", "FRON"),
    ("front", "FRON"),
    ("web", "FRON"),
    ("BACK", "BACK"),
    ("backend", "BACK"),
    ("api", "BACK"),
    ("PLAT", "PLAT"),
    ("platform", "PLAT"),
    ("infra", "PLAT"),
    ("infrastructure", "PLAT"),
    ("MOB", "MOB"),
    ("mobile", "MOB"),
    ("app", "MOB"),
    ("DES", "DES"),
    ("design", "DES"),
];

/// Maps free-form project names to canonical project keys.
#[derive(Debug, Clone)]
pub struct ProjectAliases {
    entries: Vec<(String, String)>,
}

impl ProjectAliases {
    /// Builds a table from `(alias, key)` pairs.
    ///
    /// Fails when two aliases are equal once case is ignored, since the
    /// case-insensitive lookup could not tell them apart.
    pub fn new<I, A, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, K)>,
        A: Into<String>,
        K: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();

        for (alias, key) in pairs {
            let alias = alias.into();
            if let Some((existing, _)) = entries
                .iter()
                .find(|(other, _)| other.to_lowercase() == alias.to_lowercase())
            {
                return Err(TrackerError::Config(format!(
                    "project aliases '{}' and '{}' collide when case is ignored",
                    existing, alias
                )));
            }
            entries.push((alias, key.into()));
        }

        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_ALIASES.iter().copied())
    }

    /// Built-in table followed by entries from the config file.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Result<Self> {
        Self::new(
            BUILTIN_ALIASES
                .iter()
                .map(|(alias, key)| (alias.to_string(), key.to_string()))
                .chain(
                    extra
                        .iter()
                        .map(|(alias, key)| (alias.clone(), key.trim().to_uppercase())),
                ),
        )
    }

    /// Never returns an empty key for non-empty input; whitespace-only
    /// input is passed through uppercased as-is.
    pub fn resolve(&self, raw: &str) -> String {
        let input = raw.trim();
        if input.is_empty() {
            return raw.to_uppercase();
        }

        if let Some((_, key)) = self.entries.iter().find(|(alias, _)| alias == input) {
            return key.clone();
        }

        let folded = input.to_lowercase();
        if let Some((_, key)) = self
            .entries
            .iter()
            .find(|(alias, _)| alias.to_lowercase() == folded)
        {
            return key.clone();
        }

        input.to_uppercase()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
