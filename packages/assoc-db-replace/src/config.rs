//! Association store configuration.

use serde::{Deserialize, Serialize};

/// Association store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Maximum retry attempts for retryable failures
    pub max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,      // Default retry attempts
            retry_delay_ms: 100, // 100ms delay between retries
        }
    }
}
