// ABOUTME: Library module for d1-apikey-loader
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod credentials;
pub mod migration;
pub mod utils;
pub mod wrangler;
