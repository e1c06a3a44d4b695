//! Queue construction and start options
//!
//! [`QueueOptions`] can be built in code or read from the `[queue]` table of
//! a TOML configuration file:
//!
//! ```toml
//! [queue]
//! name = "orders"
//! stack_size = 262144
//! priority = "high"
//! ```

use serde::{Deserialize, Serialize};

/// Scheduling hint for the worker thread
///
/// Recorded and logged when the worker starts; std threads expose no
/// portable priority control.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThreadPriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Options for one worker start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StartOptions {
    /// Worker thread stack size in bytes; platform default when unset
    pub stack_size: Option<usize>,
    pub priority: ThreadPriority,
}

/// Construction options for a processing queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueOptions {
    /// Queue and worker thread name; generated when absent or blank
    pub name: Option<String>,
    pub stack_size: Option<usize>,
    pub priority: ThreadPriority,
}

impl QueueOptions {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Start options used by a plain `start()`
    pub fn start_options(&self) -> StartOptions {
        StartOptions {
            stack_size: self.stack_size,
            priority: self.priority,
        }
    }
}

/// The trimmed name, or a generated unique token for blank names
pub fn resolve_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => uuid::Uuid::new_v4().simple().to_string().to_uppercase(),
    }
}
