// ABOUTME: Model of the external D1 command-line tool and its invocations
// ABOUTME: Builds argument vectors and shell lines, and runs commands sequentially

use crate::migration::verification_queries;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// How to invoke the D1 command-line tool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Executable name or path
    pub program: String,
    /// Arguments placed before `execute`
    pub subcommand: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            program: "wrangler".to_string(),
            subcommand: vec!["d1".to_string()],
        }
    }
}

/// Which copy of the database a command runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[default]
    Local,
    Remote,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Local => write!(f, "local"),
            Target::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    File(PathBuf),
    Sql(String),
}

/// One `execute` invocation of the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    /// Shown in logs and as an `echo` line in scripts
    pub label: String,
    pub database: String,
    pub target: Target,
    pub payload: Payload,
}

impl CliCommand {
    pub fn apply_file(database: &str, target: Target, sql_file: &Path) -> Self {
        Self {
            label: "Applying upsert file".to_string(),
            database: database.to_string(),
            target,
            payload: Payload::File(sql_file.to_path_buf()),
        }
    }

    pub fn query(database: &str, target: Target, label: &str, sql: &str) -> Self {
        Self {
            label: label.to_string(),
            database: database.to_string(),
            target,
            payload: Payload::Sql(sql.to_string()),
        }
    }

    /// Arguments passed to the program, without any shell quoting
    pub fn args(&self, cli: &CliConfig) -> Vec<String> {
        let mut args = cli.subcommand.clone();
        args.push("execute".to_string());
        args.push(self.database.clone());
        if self.target == Target::Remote {
            args.push("--remote".to_string());
        }
        args.push(match &self.payload {
            Payload::File(path) => format!("--file={}", path.display()),
            Payload::Sql(sql) => format!("--command={}", sql),
        });
        args
    }

    /// The same invocation as a single POSIX shell line
    ///
    /// # Examples
    ///
    /// ```
    /// # use d1_apikey_loader::wrangler::{CliCommand, CliConfig, Target};
    /// let cmd = CliCommand::query("apikeys-pool", Target::Remote, "count", "SELECT COUNT(*) FROM api_keys;");
    /// assert_eq!(
    ///     cmd.shell_line(&CliConfig::default()),
    ///     r#"wrangler d1 execute apikeys-pool --remote --command="SELECT COUNT(*) FROM api_keys;""#
    /// );
    /// ```
    pub fn shell_line(&self, cli: &CliConfig) -> String {
        let mut words = vec![shell_word(&cli.program)];
        words.extend(cli.subcommand.iter().map(|s| shell_word(s)));
        words.push("execute".to_string());
        words.push(shell_word(&self.database));
        if self.target == Target::Remote {
            words.push("--remote".to_string());
        }
        words.push(match &self.payload {
            Payload::File(path) => format!("--file={}", shell_word(&path.display().to_string())),
            Payload::Sql(sql) => format!("--command={}", double_quoted(sql)),
        });
        words.join(" ")
    }
}

/// Quote a word for a POSIX shell only when it needs it
fn shell_word(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Wrap in double quotes, escaping the characters a shell expands inside them
pub(crate) fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Commands that apply the upsert file, then (optionally) run the verification battery
pub fn command_plan(
    database: &str,
    sql_file: &Path,
    target: Target,
    domain: &str,
    verify: bool,
) -> Vec<CliCommand> {
    let mut commands = vec![CliCommand::apply_file(database, target, sql_file)];
    if verify {
        commands.extend(
            verification_queries(domain)
                .iter()
                .map(|q| CliCommand::query(database, target, &q.label, &q.sql)),
        );
    }
    commands
}

/// Run commands one at a time, stopping at the first failure
///
/// Each command runs as a direct subprocess (no shell) with its output
/// captured. Returns the number of commands that succeeded, which on
/// success is all of them.
///
/// # Errors
///
/// Returns an error if a command cannot be spawned or exits non-zero.
/// Commands after the failing one are not started.
pub async fn run_commands(cli: &CliConfig, commands: &[CliCommand]) -> Result<usize> {
    let total = commands.len();

    for (idx, command) in commands.iter().enumerate() {
        let step = idx + 1;
        tracing::info!("Running command {}/{}: {}", step, total, command.label);
        tracing::debug!("  {}", command.shell_line(cli));

        let output = Command::new(&cli.program)
            .args(command.args(cli))
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to execute {}. Is it installed and on PATH?",
                    cli.program
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            tracing::error!("✗ Command {}/{} failed (exit {}): {}", step, total, code, stderr.trim());
            bail!(
                "Command {}/{} ({}) failed with exit code {}: {}",
                step,
                total,
                command.label,
                code,
                stderr.trim()
            );
        }

        tracing::info!("✓ Command {}/{} succeeded", step, total);
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::info!("Output:\n{}", stdout.trim_end());
        }
    }

    tracing::info!("All {} command(s) completed", total);
    Ok(total)
}
