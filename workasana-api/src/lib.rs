//! # Workasana API Server Library
//!
//! HTTP layer for Workasana: routing, configuration, request validation and
//! error mapping. Persistence, authentication and reporting live in
//! `workasana-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
