//! Credentials of the Polygon API.
//!
//! The credentials are kept in plain text in a YAML file, by default
//! `~/.config/polygon_uploader/auth.yaml`:
//!
//! ```yaml
//! polygon_url: https://polygon.codeforces.com
//! api_key: ...
//! api_secret: ...
//! ```
//!
//! When the file is missing or incomplete the user is asked for the key and the secret, and the
//! file is written for the next runs.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use serde::{Deserialize, Serialize};

use polygon_uploader_api::PolygonClient;

pub const DEFAULT_POLYGON_URL: &str = "https://polygon.codeforces.com";

/// The content of the authentication file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_polygon_url")]
    pub polygon_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
}

fn default_polygon_url() -> String {
    DEFAULT_POLYGON_URL.to_string()
}

impl AuthConfig {
    /// Where the credentials are stored if no other path is given.
    pub fn default_path() -> Result<PathBuf, Error> {
        let project = directories::ProjectDirs::from("", "", "polygon_uploader")
            .ok_or_else(|| anyhow!("Cannot find the home directory"))?;
        Ok(project.config_dir().join("auth.yaml"))
    }

    /// Whether both the key and the secret are present.
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }

    /// Load the credentials from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<AuthConfig>, Error> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid authentication file {}", path.display()))?;
        Ok(Some(config))
    }

    /// Write the credentials to `path`, creating the parent directories.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Load the credentials from `path`, asking them with `ask` and storing them when the file is
    /// missing or incomplete.
    pub fn load_or_ask<F>(path: &Path, ask: F) -> Result<AuthConfig, Error>
    where
        F: FnOnce() -> Result<(String, String), Error>,
    {
        let stored = AuthConfig::load(path)?;
        if let Some(config) = &stored {
            if config.is_complete() {
                return Ok(config.clone());
            }
        }
        warn!(
            "Authentication data will be stored in plain text in {}",
            path.display()
        );
        let (api_key, api_secret) = ask()?;
        let config = AuthConfig {
            polygon_url: stored
                .map(|config| config.polygon_url)
                .unwrap_or_else(default_polygon_url),
            api_key,
            api_secret,
        };
        config.save(path)?;
        info!("Authentication data is stored in {}", path.display());
        Ok(config)
    }

    /// The base url of the API.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.polygon_url.trim_end_matches('/'))
    }

    /// Make a client of the API with these credentials.
    pub fn client(&self) -> Result<PolygonClient, Error> {
        PolygonClient::new(self.api_url(), self.api_key.clone(), self.api_secret.clone())
            .context("Failed to set up the Polygon client")
    }
}

/// Ask the API key and secret on the terminal.
pub fn ask_credentials() -> Result<(String, String), Error> {
    let key: String = dialoguer::Input::new()
        .with_prompt("API Key")
        .interact_text()
        .context("Failed to read the API key")?;
    let secret = dialoguer::Password::new()
        .with_prompt("API Secret")
        .interact()
        .context("Failed to read the API secret")?;
    Ok((key.trim().to_string(), secret.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn credentials() -> Result<(String, String), Error> {
        Ok(("key".to_string(), "secret".to_string()))
    }

    #[test]
    fn test_missing_file_asks_and_saves() {
        let tmpdir = TempDir::new().unwrap();
        let path = tmpdir.path().join("nested").join("auth.yaml");
        let config = AuthConfig::load_or_ask(&path, credentials).unwrap();
        assert_eq!(config.polygon_url, DEFAULT_POLYGON_URL);
        assert_eq!(config.api_key, "key");
        assert_eq!(config.api_secret, "secret");
        assert_eq!(AuthConfig::load(&path).unwrap(), Some(config));
    }

    #[test]
    fn test_complete_file_is_used() {
        let tmpdir = TempDir::new().unwrap();
        let path = tmpdir.path().join("auth.yaml");
        std::fs::write(
            &path,
            "polygon_url: https://polygon.example.com/\napi_key: abc\napi_secret: def\n",
        )
        .unwrap();
        let config = AuthConfig::load_or_ask(&path, || panic!("Should not ask")).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.api_secret, "def");
        assert_eq!(config.api_url(), "https://polygon.example.com/api");
    }

    #[test]
    fn test_incomplete_file_keeps_the_url() {
        let tmpdir = TempDir::new().unwrap();
        let path = tmpdir.path().join("auth.yaml");
        std::fs::write(&path, "polygon_url: http://localhost:8080\napi_key: abc\n").unwrap();
        let config = AuthConfig::load_or_ask(&path, credentials).unwrap();
        assert_eq!(config.polygon_url, "http://localhost:8080");
        assert_eq!(config.api_key, "key");
        assert!(AuthConfig::load(&path).unwrap().unwrap().is_complete());
    }

    #[test]
    fn test_failed_prompt_does_not_write() {
        let tmpdir = TempDir::new().unwrap();
        let path = tmpdir.path().join("auth.yaml");
        let result = AuthConfig::load_or_ask(&path, || Err(anyhow!("no terminal")));
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_default_url() {
        let config: AuthConfig = serde_yaml::from_str("api_key: a\napi_secret: b\n").unwrap();
        assert_eq!(config.api_url(), "https://polygon.codeforces.com/api");
    }
}
