// ABOUTME: TOML configuration for the SQL generator
// ABOUTME: Holds output layout, identifier policy, and external CLI settings

use crate::credentials::IdentifierPolicy;
use crate::wrangler::{CliConfig, Target};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How the companion command files are written next to the SQL file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptorStyle {
    /// `local_commands.sh` and `remote_commands.sh`
    #[default]
    Scripts,
    /// A single `wrangler_commands.txt` listing both targets
    Listing,
}

/// Generator settings, loadable from a TOML file
///
/// Every key is optional; omitted keys take the defaults below.
///
/// ```toml
/// migrations-dir = "migrations"
/// identifier-policy = "append-domain"
/// default-domain = "gmail.com"
/// timestamped-output = false
/// descriptor = "scripts"
/// execute-target = "local"
/// verify-after-execute = true
///
/// [cli]
/// program = "wrangler"
/// subcommand = ["d1"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub migrations_dir: PathBuf,
    pub identifier_policy: IdentifierPolicy,
    pub default_domain: String,
    pub timestamped_output: bool,
    pub descriptor: DescriptorStyle,
    pub execute_target: Target,
    pub verify_after_execute: bool,
    pub cli: CliConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("migrations"),
            identifier_policy: IdentifierPolicy::AppendDomain,
            default_domain: "gmail.com".to_string(),
            timestamped_output: false,
            descriptor: DescriptorStyle::Scripts,
            execute_target: Target::Local,
            verify_after_execute: true,
            cli: CliConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid generator configuration")
    }

    /// Default domain without a leading `@`
    pub fn domain(&self) -> &str {
        self.default_domain.trim().trim_start_matches('@')
    }
}

/// Load configuration from a TOML file, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(GeneratorConfig::default());
    };

    tracing::info!("Loading configuration from {}", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    GeneratorConfig::from_toml_str(&text)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.migrations_dir, PathBuf::from("migrations"));
        assert_eq!(config.cli.program, "wrangler");
    }

    #[test]
    fn test_full_config_parses() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            migrations-dir = "out"
            identifier-policy = "reject"
            default-domain = "@example.org"
            timestamped-output = true
            descriptor = "listing"
            execute-target = "remote"
            verify-after-execute = false

            [cli]
            program = "npx"
            subcommand = ["wrangler", "d1"]
            "#,
        )
        .unwrap();

        assert_eq!(config.migrations_dir, PathBuf::from("out"));
        assert_eq!(config.identifier_policy, IdentifierPolicy::Reject);
        assert_eq!(config.domain(), "example.org");
        assert!(config.timestamped_output);
        assert_eq!(config.descriptor, DescriptorStyle::Listing);
        assert_eq!(config.execute_target, Target::Remote);
        assert!(!config.verify_after_execute);
        assert_eq!(config.cli.subcommand, vec!["wrangler", "d1"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(GeneratorConfig::from_toml_str("table = \"users\"").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default-domain = \"corp.example\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.domain(), "corp.example");
        assert_eq!(config.identifier_policy, IdentifierPolicy::AppendDomain);
    }

    #[test]
    fn test_load_config_missing_file_fails() {
        let result = load_config(Some(Path::new("/nonexistent/keyload.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_without_path() {
        assert_eq!(load_config(None).unwrap(), GeneratorConfig::default());
    }
}
