//! # Workasana Shared Library
//!
//! Domain types, persistence and the query/reporting engines used by the
//! Workasana API server.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, JWTs, request authentication, ownership checks
//! - `db`: connection pool and schema migrations
//! - `models`: users, projects, teams, tags and tasks with their queries
//! - `query`: name-based task filtering
//! - `reports`: pending-work, last-week and closed-task aggregates

pub mod auth;
pub mod db;
pub mod models;
pub mod query;
pub mod reports;

/// Current version of the Workasana shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
