//! # iSongify Common Library
//!
//! Shared code for the iSongify crates including:
//! - Error type and result alias
//! - TOML configuration loading and data file resolution
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
