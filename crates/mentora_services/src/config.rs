//! Backend configuration.
//!
//! TOML-based configuration with a precedence system: bundled defaults
//! (`include_str!` of the workspace `mentora.toml`), then a user file in
//! the home config directory, then one in the current directory, later
//! sources winning.

use crate::retry::RetryPolicy;
use config::{Config, File, FileFormat};
use mentora_error::{ConfigError, MentoraResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Resilience knobs for one backend.
///
/// The original deployments disagreed on these values file by file; the
/// numbers in `mentora.toml` are the single source of truth now. All
/// fields except `base_url` have serde defaults, so a user override file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend base URL, e.g. `https://prediction.example.com`
    pub base_url: String,

    /// Per-attempt deadline for business calls (generous: cold starts)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-probe deadline for health checks (short: probes stay snappy)
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// How long a cached reply stays servable
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Minimum spacing between dispatches to this backend
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,

    /// Total attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Growth factor for subsequent delays
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Whether backoff delays are jittered
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_health_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_min_interval() -> u64 {
    1_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    2_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: default_request_timeout(),
            health_timeout_secs: default_health_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            min_interval_ms: default_min_interval(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
        }
    }
}

impl BackendConfig {
    /// Per-attempt business-call deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Per-probe health-check deadline.
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Cache TTL for successful replies.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Minimum dispatch spacing.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Retry schedule built from the configured knobs.
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            self.backoff_multiplier,
        );
        if self.jitter { policy } else { policy.without_jitter() }
    }
}

/// Top-level configuration: one [`BackendConfig`] per upstream service.
///
/// # Example
///
/// ```no_run
/// use mentora_services::ServicesConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServicesConfig::load()?;
/// println!("quiz backend: {}", config.quiz.base_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServicesConfig {
    /// Performance-prediction backend
    pub prediction: BackendConfig,
    /// Quiz-generation backend (also serves hints)
    pub quiz: BackendConfig,
    /// Tutoring backend
    pub tutor: BackendConfig,
}

impl ServicesConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> MentoraResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources
    /// override earlier):
    /// 1. Bundled defaults (mentora.toml shipped with the workspace)
    /// 2. User config in home directory (~/.config/mentora/mentora.toml)
    /// 3. User config in current directory (./mentora.toml)
    ///
    /// User config files are optional and silently skipped if absent.
    #[instrument]
    pub fn load() -> MentoraResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../mentora.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/mentora/mentora.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("mentora").required(false));

        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }
}
