// ABOUTME: Email normalization for credential identifiers
// ABOUTME: Applies the configured policy to identifiers that lack an @ sign

use serde::Deserialize;
use std::fmt;

/// What to do with an identifier that has no `@`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierPolicy {
    /// Treat it as a user name and append `@<default domain>`
    #[default]
    AppendDomain,
    /// Skip the line
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    Empty,
    MissingAt(String),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Empty => write!(f, "email is empty"),
            NormalizeError::MissingAt(email) => {
                write!(f, "'{}' is not an email address (no '@')", email)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Turns the identifier half of an input line into an email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    policy: IdentifierPolicy,
    domain: String,
}

impl Normalizer {
    /// `domain` may be given with or without a leading `@`
    pub fn new(policy: IdentifierPolicy, domain: &str) -> Self {
        Self {
            policy,
            domain: domain.trim().trim_start_matches('@').to_string(),
        }
    }

    pub fn policy(&self) -> IdentifierPolicy {
        self.policy
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Normalize a trimmed identifier
    ///
    /// Identifiers that already contain `@` are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use d1_apikey_loader::credentials::{IdentifierPolicy, Normalizer};
    /// let normalizer = Normalizer::new(IdentifierPolicy::AppendDomain, "gmail.com");
    /// assert_eq!(normalizer.normalize("alice").unwrap(), "alice@gmail.com");
    /// assert_eq!(normalizer.normalize("bob@corp.io").unwrap(), "bob@corp.io");
    ///
    /// let strict = Normalizer::new(IdentifierPolicy::Reject, "gmail.com");
    /// assert!(strict.normalize("alice").is_err());
    /// ```
    pub fn normalize(&self, identifier: &str) -> Result<String, NormalizeError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(NormalizeError::Empty);
        }

        if identifier.contains('@') {
            return Ok(identifier.to_string());
        }

        match self.policy {
            IdentifierPolicy::AppendDomain if !self.domain.is_empty() => {
                Ok(format!("{}@{}", identifier, self.domain))
            }
            _ => Err(NormalizeError::MissingAt(identifier.to_string())),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(IdentifierPolicy::AppendDomain, "gmail.com")
    }
}
