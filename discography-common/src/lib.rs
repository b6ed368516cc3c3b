//! # Discography Common Library
//!
//! Shared code for the discography services including:
//! - Database initialization and schema migrations
//! - API authentication helpers and shared request/response types
//! - Configuration loading
//! - Utility functions

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
