//! # Arena Common Library
//!
//! Shared code for the arena scoring services:
//! - Error and result types
//! - TOML bootstrap configuration
//! - Database initialization and durable record models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
