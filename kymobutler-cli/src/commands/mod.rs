//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`analyze`] - Submit a kymograph and export the results
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`init`] - Configuration initialization
//! - [`parse`] - Decode a saved response offline
//! - [`stats`] - Service usage statistics
//! - [`upload`] - Send corrected tracks back to the service

pub mod analyze;
pub mod common;
pub mod config;
pub mod init;
pub mod parse;
pub mod stats;
pub mod upload;
