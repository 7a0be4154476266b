// ABOUTME: Command implementations for the SQL generator
// ABOUTME: Exports the generate pipeline and its options

pub mod generate;

pub use generate::{generate, GenerateOptions, GenerateSummary};
