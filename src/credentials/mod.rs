// ABOUTME: Credential input handling for email:api_key files
// ABOUTME: Exposes the line reader, the email normalizer, and the record type

pub mod normalize;
pub mod reader;

pub use normalize::{IdentifierPolicy, NormalizeError, Normalizer};
pub use reader::{parse_credentials, read_credentials, ParsedCredentials, SkippedLine};

use std::fmt;

/// One `email:api_key` pair accepted from the input file
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub email: String,
    pub api_key: String,
}

impl CredentialRecord {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }

    /// API key with everything but the first four characters hidden, for logs
    pub fn masked_key(&self) -> String {
        let visible: String = self.api_key.chars().take(4).collect();
        format!("{}****", visible)
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("email", &self.email)
            .field("api_key", &self.masked_key())
            .finish()
    }
}
