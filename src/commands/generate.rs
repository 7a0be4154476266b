// ABOUTME: The generate command: credential file to upsert SQL, scripts, and optional execution
// ABOUTME: Runs the whole pipeline once and reports what was produced

use crate::config::GeneratorConfig;
use crate::credentials::{read_credentials, Normalizer};
use crate::migration::{self, OutputLayout};
use crate::{utils, wrangler};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Inputs of one generator run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub database: String,
    pub auto_execute: bool,
    pub config: GeneratorConfig,
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    pub records: usize,
    pub skipped: usize,
    pub sql_file: PathBuf,
    pub descriptors: Vec<PathBuf>,
    /// Number of CLI commands run; zero unless auto-execute was on
    pub executed: usize,
}

/// Generate upsert SQL and companion scripts from a credential file
///
/// Steps:
/// 1. Reads and normalizes `email:api_key` lines from the input file
/// 2. Renders one insert-or-update statement per record into the SQL file
/// 3. Writes local/remote command scripts (or a command listing)
/// 4. With auto-execute, applies the SQL file through the external CLI and
///    runs the verification queries, stopping at the first failure
///
/// # Errors
///
/// This function will return an error if:
/// - The database name is invalid
/// - The input file is missing, unreadable, or has no valid records
///   (no output files are written in that case)
/// - An output file cannot be written
/// - The external CLI is not installed or a command exits non-zero
///
/// # Examples
///
/// ```no_run
/// # use anyhow::Result;
/// # use d1_apikey_loader::commands::{generate, GenerateOptions};
/// # use d1_apikey_loader::config::GeneratorConfig;
/// # async fn example() -> Result<()> {
/// let summary = generate(&GenerateOptions {
///     input: "apikeys.txt".into(),
///     database: "apikeys-pool".to_string(),
///     auto_execute: false,
///     config: GeneratorConfig::default(),
/// })
/// .await?;
/// println!("{} record(s) written to {}", summary.records, summary.sql_file.display());
/// # Ok(())
/// # }
/// ```
pub async fn generate(options: &GenerateOptions) -> Result<GenerateSummary> {
    let config = &options.config;
    utils::validate_database_name(&options.database)?;

    tracing::info!("Processing {}", options.input.display());

    // Step 1: Read credentials
    let normalizer = Normalizer::new(config.identifier_policy, config.domain());
    let parsed = read_credentials(&options.input, &normalizer)?;
    if parsed.is_empty() {
        bail!(
            "No valid API key records read from {}",
            options.input.display()
        );
    }

    // Step 2: Render and write SQL
    let sql = migration::render_upsert_file(
        &parsed.records,
        &options.input.display().to_string(),
    )
    .context("Failed to generate upsert SQL")?;
    let layout = OutputLayout::new(config.migrations_dir.clone(), config.timestamped_output);
    let sql_file = migration::write_sql_file(&layout, &sql)?;

    // Step 3: Companion scripts
    let descriptors = migration::write_descriptors(
        &layout,
        config.descriptor,
        &config.cli,
        &options.database,
        &sql_file,
        config.domain(),
    )?;

    // Step 4: Optional execution
    let executed = if options.auto_execute {
        tracing::info!(
            "Applying {} to the {} database '{}'...",
            sql_file.display(),
            config.execute_target,
            options.database
        );
        utils::check_required_tool(&config.cli.program)?;

        let plan = wrangler::command_plan(
            &options.database,
            &sql_file,
            config.execute_target,
            config.domain(),
            config.verify_after_execute,
        );
        wrangler::run_commands(&config.cli, &plan)
            .await
            .with_context(|| format!("Failed to apply {}", sql_file.display()))?
    } else {
        0
    };

    tracing::info!(
        "✅ Generated {} upsert statement(s) in {}",
        parsed.records.len(),
        layout.dir().display()
    );

    Ok(GenerateSummary {
        records: parsed.records.len(),
        skipped: parsed.skipped.len(),
        sql_file,
        descriptors,
        executed,
    })
}
