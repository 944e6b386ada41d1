use crate::error::{ErrorContext, Result, UploaderError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

// 1 MiB per chunk
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

// 10 MiB, inclusive
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_ACCEPTED_EXTENSION: &str = ".csv";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub server_url: String,
    pub chunk_size_bytes: u64,
    pub items_per_page: u32,
    pub poll_interval_ms: u64,
    pub max_file_size_bytes: u64,
    pub accepted_extension: String,
    /// No timeout unless set; a hung request stalls the upload.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE,
            accepted_extension: DEFAULT_ACCEPTED_EXTENSION.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.server_url).map_err(|e| {
            UploaderError::Config(format!("invalid server URL '{}': {}", self.server_url, e))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_bytes == 0 {
            return Err(UploaderError::Config(
                "chunkSizeBytes must be greater than zero".to_string(),
            ));
        }
        if self.items_per_page == 0 {
            return Err(UploaderError::Config(
                "itemsPerPage must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(UploaderError::Config(
                "pollIntervalMs must be greater than zero".to_string(),
            ));
        }
        self.base_url().context("serverUrl")?;
        Ok(())
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(home_dir) = dirs::home_dir() {
        Ok(home_dir.join(".order-uploader"))
    } else {
        Err(UploaderError::Config(
            "Could not find home directory".to_string(),
        ))
    }
}

pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn get_logs_dir() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("logs"))
}

/// Create `dir` if missing, owner-only on Unix
pub fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(dir)?;
            let mut permissions = metadata.permissions();
            permissions.set_mode(0o700);
            fs::set_permissions(dir, permissions)?;
        }
    }
    Ok(())
}

/// Load the config at `path`, falling back to defaults when the file is absent
pub fn load_config_from(path: &Path) -> Result<ClientConfig> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        Ok(config)
    } else {
        Ok(ClientConfig::default())
    }
}

pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_private_dir(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;

    // Set permissions to 600 (read/write for owner only) on Unix systems
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path)?;
        let mut permissions = metadata.permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_service_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.chunk_size_bytes, 1_048_576);
        assert_eq!(config.items_per_page, 10);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.max_file_size_bytes, 10_485_760);
        assert_eq!(config.accepted_extension, ".csv");
        assert!(config.request_timeout_secs.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"serverUrl":"http://orders.internal:9000","itemsPerPage":25}"#)
            .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server_url, "http://orders.internal:9000");
        assert_eq!(config.items_per_page, 25);
        assert_eq!(config.chunk_size_bytes, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ClientConfig {
            poll_interval_ms: 250,
            request_timeout_secs: Some(30),
            ..ClientConfig::default()
        };

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_zero_values_and_bad_url() {
        let zero_chunk = ClientConfig {
            chunk_size_bytes: 0,
            ..ClientConfig::default()
        };
        assert!(zero_chunk.validate().is_err());

        let zero_interval = ClientConfig {
            poll_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert!(zero_interval.validate().is_err());

        let bad_url = ClientConfig {
            server_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(bad_url.validate(), Err(UploaderError::Config(_))));
    }
}
