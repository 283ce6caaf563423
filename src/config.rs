//! Runtime configuration read from the environment.
//!
//! ## Environment Variables
//!
//! - `GUEST_THREADS_STACK_BYTES`: stack size of every native thread spawned
//!   for guest code (default: 1 MiB, minimum: 64 KiB)
//! - `GUEST_THREADS_NAME_PREFIX`: prefix for native thread names (default: `guest`)
use crate::utils::sync::OnceLock;
use std::env;
use tracing::warn;

pub const DEFAULT_STACK_BYTES: usize = 1024 * 1024;
pub const MIN_STACK_BYTES: usize = 64 * 1024;
const DEFAULT_NAME_PREFIX: &str = "guest";

const STACK_BYTES_VAR: &str = "GUEST_THREADS_STACK_BYTES";
const NAME_PREFIX_VAR: &str = "GUEST_THREADS_NAME_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub stack_bytes: usize,
    pub thread_name_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_bytes: DEFAULT_STACK_BYTES,
            thread_name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// The process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static RuntimeConfig {
        static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }

    pub fn from_env() -> Self {
        Self::from_vars(env::var(STACK_BYTES_VAR).ok(), env::var(NAME_PREFIX_VAR).ok())
    }

    fn from_vars(stack_bytes: Option<String>, name_prefix: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = stack_bytes {
            match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes >= MIN_STACK_BYTES => config.stack_bytes = bytes,
                Ok(bytes) => warn!(
                    "{STACK_BYTES_VAR}={bytes} is below the minimum of {MIN_STACK_BYTES}; using {DEFAULT_STACK_BYTES}"
                ),
                Err(_) => warn!("ignoring unparsable {STACK_BYTES_VAR}={raw:?}"),
            }
        }

        if let Some(prefix) = name_prefix {
            match prefix.trim() {
                "" => warn!("ignoring empty {NAME_PREFIX_VAR}"),
                trimmed => config.thread_name_prefix = trimmed.to_string(),
            }
        }

        config
    }
}
