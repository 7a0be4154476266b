// ABOUTME: CLI entry point for d1-apikey-loader
// ABOUTME: Parses arguments, merges configuration, and runs the generate pipeline

use clap::Parser;
use d1_apikey_loader::commands::{self, GenerateOptions};
use d1_apikey_loader::config;
use d1_apikey_loader::credentials::IdentifierPolicy;
use d1_apikey_loader::migration;
use d1_apikey_loader::utils;
use d1_apikey_loader::wrangler::Target;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "d1-apikey-loader")]
#[command(
    about = "Generate api_keys upsert SQL from an email:api_key file and apply it to Cloudflare D1",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Input file with one email:api_key pair per line
    #[arg(default_value = "apikeys.txt")]
    input: PathBuf,
    /// D1 database name passed to wrangler
    #[arg(default_value = "apikeys-pool")]
    database: String,
    /// Apply the generated SQL right away (true, 1, yes or auto)
    #[arg(default_value = "false")]
    auto_execute: String,
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Policy for identifiers without an '@'
    #[arg(long, value_enum)]
    policy: Option<IdentifierPolicy>,
    /// Domain appended to bare user names (append-domain policy)
    #[arg(long)]
    default_domain: Option<String>,
    /// Directory for the generated SQL and scripts
    #[arg(long)]
    migrations_dir: Option<PathBuf>,
    /// Add a timestamp suffix to generated file names
    #[arg(long)]
    timestamped: bool,
    /// Execute against the remote database instead of the local one
    #[arg(long)]
    remote: bool,
    /// D1 command-line tool to invoke (defaults to $D1_CLI, then the config file)
    #[arg(long, env = "D1_CLI")]
    cli: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Command-line options override the configuration file
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(policy) = cli.policy {
        config.identifier_policy = policy;
    }
    if let Some(domain) = cli.default_domain {
        config.default_domain = domain;
    }
    if let Some(dir) = cli.migrations_dir {
        config.migrations_dir = dir;
    }
    if cli.timestamped {
        config.timestamped_output = true;
    }
    if cli.remote {
        config.execute_target = Target::Remote;
    }
    if let Some(program) = cli.cli {
        config.cli.program = program;
    }

    let auto_execute = utils::parse_truthy(&cli.auto_execute);
    let options = GenerateOptions {
        input: cli.input,
        database: cli.database,
        auto_execute,
        config,
    };

    let summary = commands::generate(&options).await?;

    println!("\n🎉 Done!");
    println!("📊 Processed {} API key record(s)", summary.records);
    if summary.skipped > 0 {
        println!("⚠ Skipped {} malformed line(s), see warnings above", summary.skipped);
    }
    println!("📄 Generated files:");
    println!("  - Upsert SQL: {}", summary.sql_file.display());
    for descriptor in &summary.descriptors {
        println!("  - Commands: {}", descriptor.display());
    }

    if auto_execute {
        println!(
            "✅ Ran {} command(s) against the {} database '{}'",
            summary.executed, options.config.execute_target, options.database
        );
    } else {
        let steps = migration::next_steps(&summary.descriptors);
        if !steps.is_empty() {
            println!("\n🚀 Next steps:");
            for step in steps {
                println!("{}", step);
            }
        }
        println!("\n💡 Usage: d1-apikey-loader [INPUT] [DATABASE] [AUTO_EXECUTE]");
        println!("   Example: d1-apikey-loader apikeys.txt apikeys-pool true");
    }

    Ok(())
}
