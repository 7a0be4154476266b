// ABOUTME: Renders insert-or-update SQL for the api_keys table
// ABOUTME: Escapes string literals by doubling single quotes

use crate::credentials::CredentialRecord;
use anyhow::{bail, Result};

pub const TABLE_NAME: &str = "api_keys";

/// DDL of the target table as it exists in D1
///
/// Only used for documentation and tests; the generator never writes schema.
pub const API_KEYS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    api_key TEXT NOT NULL UNIQUE,
    gmail_email TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    last_used_at DATETIME,
    total_requests INTEGER NOT NULL DEFAULT 0,
    error_count INTEGER NOT NULL DEFAULT 0
);";

/// Escape a value for use inside a single-quoted SQL literal
///
/// # Examples
///
/// ```
/// # use d1_apikey_loader::migration::escape_sql_literal;
/// assert_eq!(escape_sql_literal("o'brien"), "o''brien");
/// ```
pub fn escape_sql_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render the upsert statement for one record
pub fn render_upsert(record: &CredentialRecord) -> String {
    format!(
        "INSERT INTO {table} (api_key, gmail_email, is_active, created_at, updated_at, total_requests, error_count)\n\
         VALUES ('{key}', '{email}', 1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP, 0, 0)\n\
         ON CONFLICT(api_key) DO UPDATE SET\n    \
         gmail_email = excluded.gmail_email,\n    \
         updated_at = CURRENT_TIMESTAMP,\n    \
         is_active = 1;",
        table = TABLE_NAME,
        key = escape_sql_literal(&record.api_key),
        email = escape_sql_literal(&record.email),
    )
}

/// Render the whole upsert file: a comment header and one statement per record
pub fn render_upsert_file(records: &[CredentialRecord], source: &str) -> Result<String> {
    if records.is_empty() {
        bail!("No API key records to render");
    }

    let mut lines = vec![
        "-- Generated api_keys upsert statements".to_string(),
        format!("-- Source: {}", source.replace('\n', " ")),
        format!("-- Records: {}", records.len()),
        "-- Keyed on api_key, so applying this file again converges to the same rows".to_string(),
        String::new(),
    ];
    lines.extend(records.iter().map(render_upsert));

    let mut sql = lines.join("\n");
    sql.push('\n');
    Ok(sql)
}
