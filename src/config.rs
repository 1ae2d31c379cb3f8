//! TOML configuration for the ServiceMedic daemon.
//!
//! Layered configuration with compiled-in defaults, environment variable
//! override for the config file path, and standard filesystem locations.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Root configuration for the servicemedic process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Default for MedicConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MedicConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Try to load configuration from, in order:
    /// 1. The path specified by the `SERVICEMEDIC_CONFIG` environment variable.
    /// 2. `/etc/servicemedic/servicemedic.toml`.
    /// 3. `servicemedic.toml` in the working directory.
    /// 4. Fall back to compiled-in defaults.
    pub fn load_or_default() -> Self {
        if let Ok(env_path) = std::env::var("SERVICEMEDIC_CONFIG") {
            let path = Path::new(&env_path);
            match Self::load(path) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "SERVICEMEDIC_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        for candidate in ["/etc/servicemedic/servicemedic.toml", "servicemedic.toml"] {
            let path = Path::new(candidate);
            if path.exists() {
                match Self::load(path) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable config file");
                    }
                }
            }
        }

        info!("using built-in default configuration");
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the triage API binds to.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}
