//! Folder hierarchy engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the folder service and its queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Upper bound on a single folder operation, in seconds (0 = no limit).
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_seconds: u64,
    /// Maximum number of folders a single list query may return.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u64,
    /// Display name of the root sentinel in breadcrumb trails.
    #[serde(default = "default_root_label")]
    pub root_label: String,
}

impl HierarchyConfig {
    /// The operation timeout, or `None` when disabled.
    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.operation_timeout_seconds))
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            operation_timeout_seconds: default_operation_timeout(),
            max_list_limit: default_max_list_limit(),
            root_label: default_root_label(),
        }
    }
}

fn default_operation_timeout() -> u64 {
    30
}

fn default_max_list_limit() -> u64 {
    1000
}

fn default_root_label() -> String {
    "Home".to_string()
}
