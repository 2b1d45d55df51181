// ABOUTME: Library root for bosun - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod admin;
pub mod build;
pub mod compose;
pub mod config;
pub mod deploy;
pub mod deployment;
pub mod error;
pub mod output;
pub mod store;
pub mod types;
