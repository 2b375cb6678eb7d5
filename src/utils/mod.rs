//! Utility module for StemSplit
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Display helpers shared by the player widget

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{Config, GeneralConfig, PlayerConfig, SeparationConfig};
pub use error::{Result, StemSplitError};

/// Format a position in seconds for display
///
/// Produces "M:SS" with unpadded minutes, e.g. `204.0` becomes "3:24".
/// Negative and non-finite inputs render as "0:00".
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    format!("{}:{:02}", total / 60, total % 60)
}
