// ABOUTME: Writes the upsert SQL file and its companion command files
// ABOUTME: Emits local/remote bash scripts or a plain command listing

use crate::config::DescriptorStyle;
use crate::wrangler::{command_plan, double_quoted, CliConfig, Target};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const UPSERT_FILE_STEM: &str = "apikeys_upsert";

/// Where output files go and how they are named
#[derive(Debug, Clone)]
pub struct OutputLayout {
    dir: PathBuf,
    suffix: Option<String>,
}

impl OutputLayout {
    /// With `timestamped`, every file name gets a `_YYYYmmdd_HHMMSS` suffix
    pub fn new(dir: impl Into<PathBuf>, timestamped: bool) -> Self {
        let suffix =
            timestamped.then(|| chrono::Local::now().format("%Y%m%d_%H%M%S").to_string());
        Self::with_suffix(dir, suffix)
    }

    pub fn with_suffix(dir: impl Into<PathBuf>, suffix: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        let name = match &self.suffix {
            Some(suffix) => format!("{}_{}.{}", stem, suffix, extension),
            None => format!("{}.{}", stem, extension),
        };
        self.dir.join(name)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create output directory {}", self.dir.display())
        })
    }
}

/// Write the rendered upsert SQL, creating the output directory if needed
pub fn write_sql_file(layout: &OutputLayout, sql: &str) -> Result<PathBuf> {
    layout.ensure_dir()?;
    let path = layout.path_for(UPSERT_FILE_STEM, "sql");
    std::fs::write(&path, sql)
        .with_context(|| format!("Failed to write SQL file {}", path.display()))?;

    tracing::info!("✓ Wrote upsert SQL to {}", path.display());
    Ok(path)
}

/// Bash script applying the SQL file and running the verification battery
pub fn render_script(
    cli: &CliConfig,
    database: &str,
    sql_file: &Path,
    target: Target,
    domain: &str,
) -> String {
    let mut script = format!(
        "#!/bin/bash\n\
         # Apply generated api_keys upserts to the {target} D1 database '{database}'\n\
         set -e\n\
         \n\
         echo \"Running {target} database operations...\"\n"
    );

    for command in command_plan(database, sql_file, target, domain, true) {
        script.push('\n');
        script.push_str(&format!("echo {}\n", double_quoted(&format!("{}...", command.label))));
        script.push_str(&command.shell_line(cli));
        script.push('\n');
    }

    script.push_str(&format!("\necho \"{} database operations complete\"\n", target));
    script
}

/// Plain-text listing of the commands for both targets
pub fn render_listing(cli: &CliConfig, database: &str, sql_file: &Path, domain: &str) -> String {
    let mut listing = String::new();
    for target in [Target::Local, Target::Remote] {
        if !listing.is_empty() {
            listing.push('\n');
        }
        listing.push_str(&format!("# {} database\n", target));
        for command in command_plan(database, sql_file, target, domain, true) {
            listing.push_str(&format!("# {}\n{}\n", command.label, command.shell_line(cli)));
        }
    }
    listing
}

/// Write the companion command files for `sql_file`
///
/// Returns the paths written, local before remote for the script style.
pub fn write_descriptors(
    layout: &OutputLayout,
    style: DescriptorStyle,
    cli: &CliConfig,
    database: &str,
    sql_file: &Path,
    domain: &str,
) -> Result<Vec<PathBuf>> {
    layout.ensure_dir()?;

    let files: Vec<(PathBuf, String, bool)> = match style {
        DescriptorStyle::Scripts => [Target::Local, Target::Remote]
            .into_iter()
            .map(|target| {
                (
                    layout.path_for(&format!("{}_commands", target), "sh"),
                    render_script(cli, database, sql_file, target, domain),
                    true,
                )
            })
            .collect(),
        DescriptorStyle::Listing => vec![(
            layout.path_for("wrangler_commands", "txt"),
            render_listing(cli, database, sql_file, domain),
            false,
        )],
    };

    let mut written = Vec::with_capacity(files.len());
    for (path, content, executable) in files {
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if executable {
            make_executable(&path)?;
        }
        tracing::info!("✓ Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to make {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Commands printed to the user as next steps when nothing was executed
pub fn next_steps(descriptors: &[PathBuf]) -> Vec<String> {
    descriptors
        .iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "sh"))
        .map(|p| format!("chmod +x {0} && {0}", p.display()))
        .collect()
}
