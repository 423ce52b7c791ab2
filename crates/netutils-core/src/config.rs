use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Transport timeouts (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a request whose throughput stays below this many bytes/sec...
    pub low_speed_limit: u32,
    /// ...for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard wall-clock limit per request in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Digest tuning (optional `[digest]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Read block size in bytes.
    pub block_size: usize,
    /// Worker threads for the residue reduction; 1 runs the sequential hasher.
    pub workers: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            block_size: crate::digest::DEFAULT_BLOCK_SIZE,
            workers: 1,
        }
    }
}

/// Global configuration loaded from `~/.config/netutils/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetutilsConfig {
    /// Bytes per upload chunk (one HTTP request each).
    pub chunk_size: u64,
    /// Capacity of the read-carry buffer between the source and request bodies.
    pub carry_buffer_bytes: usize,
    /// Sources up to this size go to OneDrive as a single PUT instead of a session.
    pub simple_upload_limit: u64,
    /// Optional transport timeouts; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
    /// Optional digest tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub digest: Option<DigestConfig>,
}

impl Default for NetutilsConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::transfer::DEFAULT_CHUNK_SIZE,
            carry_buffer_bytes: crate::transfer::DEFAULT_CARRY_BUFFER_BYTES,
            simple_upload_limit: 4 * 1024 * 1024,
            http: None,
            digest: None,
        }
    }
}

impl NetutilsConfig {
    /// Transport settings, falling back to defaults when the section is absent.
    pub fn http_or_default(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn digest_or_default(&self) -> DigestConfig {
        self.digest.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("netutils")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<NetutilsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = NetutilsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: NetutilsConfig = toml::from_str(&data)?;
    Ok(cfg)
}
