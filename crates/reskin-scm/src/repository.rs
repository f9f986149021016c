//! SCM connection strings (`scm:<provider>:<provider-specific url>`)

use std::fmt;

use crate::error::{Result, ScmError};

/// A parsed connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmRepository {
    pub provider: String,
    pub url: String,
}

impl ScmRepository {
    /// Parse `scm:git:https://...`. The provider is followed by `:` or `|`,
    /// whichever comes first.
    pub fn parse(connection: &str) -> Result<Self> {
        let invalid = |reason: &str| ScmError::InvalidConnection {
            connection: connection.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = connection.trim();
        let rest = trimmed
            .strip_prefix("scm")
            .ok_or_else(|| invalid("must start with 'scm'"))?;
        let mut chars = rest.chars();
        let delimiter = chars
            .next()
            .filter(|c| *c == ':' || *c == '|')
            .ok_or_else(|| invalid("missing delimiter after 'scm'"))?;
        let rest = chars.as_str();

        let (provider, url) = rest
            .split_once(delimiter)
            .ok_or_else(|| invalid("missing provider"))?;
        if provider.is_empty() {
            return Err(invalid("missing provider"));
        }
        if url.is_empty() {
            return Err(invalid("missing repository url"));
        }

        Ok(Self {
            provider: provider.to_ascii_lowercase(),
            url: url.to_string(),
        })
    }
}

impl fmt::Display for ScmRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scm:{}:{}", self.provider, self.url)
    }
}
