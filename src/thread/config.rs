/*!
 * Thread Configuration
 * Worker naming and stack sizing, with environment overrides
 */

use crate::core::limits::{
    DEFAULT_THREAD_NAME_PREFIX, ENV_STACK_SIZE, ENV_THREAD_NAME, MAX_THREAD_NAME_LEN,
    MIN_STACK_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings applied to every worker a builder spawns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadConfig {
    /// Worker names are `<prefix>-<id>`, truncated to the OS limit
    pub name_prefix: String,
    /// Stack size in bytes; `None` keeps the pthread default
    pub stack_size: Option<usize>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl ThreadConfig {
    /// Defaults overridden by `SIGNAL_THREAD_NAME` and `SIGNAL_THREAD_STACK_SIZE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(prefix) = std::env::var(ENV_THREAD_NAME) {
            if !prefix.is_empty() {
                config.name_prefix = prefix;
            }
        }

        if let Ok(raw) = std::env::var(ENV_STACK_SIZE) {
            match raw.trim().parse::<usize>() {
                Ok(size) => config.stack_size = Some(size),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_STACK_SIZE),
            }
        }

        config
    }

    /// Name for the worker of context `id`
    pub(crate) fn thread_name(&self, id: u64) -> String {
        let mut name = format!("{}-{}", self.name_prefix, id);
        if name.len() > MAX_THREAD_NAME_LEN {
            let mut cut = MAX_THREAD_NAME_LEN;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        name
    }

    /// Requested stack size, raised to the platform minimum
    pub(crate) fn effective_stack_size(&self) -> Option<usize> {
        self.stack_size.map(|size| size.max(MIN_STACK_SIZE))
    }
}
