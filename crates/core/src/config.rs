use crate::error::{DeclscopeError, Result};
use serde::{Deserialize, Serialize};

pub const ENV_CACHE_MODULES: &str = "DECLSCOPE_CACHE_MODULES";
pub const ENV_PARALLEL_SCAN: &str = "DECLSCOPE_PARALLEL_SCAN";

/// Tuning knobs for the package existence cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upper bound on modules holding a package set at once. Overflow evicts
    /// the least recently used entry.
    pub max_modules: usize,
    /// Resolve file packages on the rayon pool during a scan.
    pub parallel_scan: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_modules: 256,
            parallel_scan: true,
        }
    }
}

impl CacheConfig {
    /// Defaults overridden by `DECLSCOPE_CACHE_MODULES` and
    /// `DECLSCOPE_PARALLEL_SCAN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CACHE_MODULES) {
            let max_modules: usize = raw.trim().parse().map_err(|_| {
                DeclscopeError::Config(format!("{ENV_CACHE_MODULES}: expected a number, got `{raw}`"))
            })?;
            if max_modules == 0 {
                return Err(DeclscopeError::Config(format!(
                    "{ENV_CACHE_MODULES} must be at least 1"
                )));
            }
            config.max_modules = max_modules;
        }

        if let Some(raw) = lookup(ENV_PARALLEL_SCAN) {
            config.parallel_scan = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(DeclscopeError::Config(format!(
                        "{ENV_PARALLEL_SCAN}: expected a boolean, got `{raw}`"
                    )));
                }
            };
        }

        Ok(config)
    }
}
