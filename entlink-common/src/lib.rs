//! # entlink Common Library
//!
//! Shared code for the entlink crates:
//! - Error types
//! - Bootstrap configuration loading and resolution
//! - Tracing initialization
//! - Content hashing for cache keys

pub mod config;
pub mod error;
pub mod hashing;
pub mod logging;

pub use error::{Error, Result};

/// Identifying client header sent with every outbound HTTP request
pub fn get_user_agent() -> String {
    format!(
        "entlink/{} (+https://github.com/entlink/entlink)",
        env!("CARGO_PKG_VERSION")
    )
}
