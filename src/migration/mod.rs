// ABOUTME: SQL generation and output files for api_keys upserts
// ABOUTME: Renders statements, verification queries, and companion scripts

pub mod scripts;
pub mod upsert;
pub mod verify;

pub use scripts::{
    next_steps, render_listing, render_script, write_descriptors, write_sql_file, OutputLayout,
};
pub use upsert::{escape_sql_literal, render_upsert, render_upsert_file, API_KEYS_SCHEMA};
pub use verify::{verification_queries, VerificationQuery};
