// ABOUTME: Utility functions for argument validation and tool discovery
// ABOUTME: Provides database name checks, truthy flag parsing, and log sanitizing

use anyhow::{bail, Result};
use which::which;

/// Validate a D1 database name
///
/// The name ends up in generated shell scripts, so only ASCII letters,
/// digits, `-` and `_` are accepted.
///
/// # Errors
///
/// Returns an error if the name is empty or contains any other character.
///
/// # Examples
///
/// ```
/// # use d1_apikey_loader::utils::validate_database_name;
/// assert!(validate_database_name("apikeys-pool").is_ok());
/// assert!(validate_database_name("").is_err());
/// assert!(validate_database_name("pool; rm -rf /").is_err());
/// ```
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Database name cannot be empty");
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        bail!(
            "Invalid database name '{}': character {:?} is not allowed.\n\
             Use only letters, digits, '-' and '_'.",
            sanitize_identifier(name),
            bad
        );
    }

    Ok(())
}

/// Interpret the auto-execute argument
///
/// `true`, `1`, `yes` and `auto` (any case) are truthy; everything else is false.
///
/// # Examples
///
/// ```
/// # use d1_apikey_loader::utils::parse_truthy;
/// assert!(parse_truthy("YES"));
/// assert!(!parse_truthy("no"));
/// ```
pub fn parse_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "auto"
    )
}

/// Check that the external CLI is available before executing anything
///
/// # Errors
///
/// Returns an error with installation hints if `program` is not on `PATH`
/// (or, for a path, does not point at an executable).
pub fn check_required_tool(program: &str) -> Result<()> {
    if which(program).is_err() {
        bail!(
            "Required command-line tool not found: {}\n\
             \n\
             Install wrangler with one of:\n\
             - npm install -g wrangler\n\
             - npx wrangler (set [cli] program = \"npx\" and subcommand = [\"wrangler\", \"d1\"])",
            program
        );
    }

    Ok(())
}

/// Sanitize text for display
///
/// Removes control characters and limits length so raw input lines can be
/// logged without corrupting the terminal.
///
/// # Examples
///
/// ```
/// # use d1_apikey_loader::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("table\x00name"), "tablename");
/// assert_eq!(sanitize_identifier(&"a".repeat(200)).len(), 100);
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}
