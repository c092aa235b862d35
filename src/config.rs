//! Configuration management for the thumbnail service

use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid THUMBNAIL_SIZE '{0}': expected <width>x<height> with positive integers")]
    InvalidThumbnailSize(String),

    #[error("Invalid SERVER_PORT '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...)
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Settings for the ingestion pipeline itself
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Destination bucket override; thumbnails go next to the source when unset
    pub target_bucket: Option<String>,
    pub thumbnail_prefix: String,
    pub thumbnail_size: ThumbnailSize,
    /// Directory holding per-run workspaces
    pub work_dir: PathBuf,
}

/// Bounding box a thumbnail must fit within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
        }
    }
}

impl FromStr for ThumbnailSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidThumbnailSize(s.to_string());

        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;

        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(Self { width, height })
    }
}

impl TryFrom<String> for ThumbnailSize {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            target_bucket: None,
            thumbnail_prefix: "thumbnails/".to_string(),
            thumbnail_size: ThumbnailSize::default(),
            work_dir: env::temp_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                endpoint: None,
                region: "us-east-1".to_string(),
                access_key: None,
                secret_key: None,
            },
            database: DatabaseConfig {
                url: "sqlite:./thumbnails.db".to_string(),
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated as unset
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let port = match get("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 3000,
        };

        let thumbnail_size = match get("THUMBNAIL_SIZE") {
            Some(raw) => raw.parse()?,
            None => ThumbnailSize::default(),
        };

        Ok(Config {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            storage: StorageConfig {
                endpoint: get("S3_ENDPOINT"),
                region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                access_key: get("S3_ACCESS_KEY"),
                secret_key: get("S3_SECRET_KEY"),
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL").unwrap_or_else(|| "sqlite:./thumbnails.db".to_string()),
            },
            pipeline: PipelineConfig {
                target_bucket: get("TARGET_BUCKET_NAME"),
                // An explicitly empty prefix is meaningful, so read it raw
                thumbnail_prefix: var("THUMBNAIL_PREFIX").unwrap_or_else(|| "thumbnails/".to_string()),
                thumbnail_size,
                work_dir: get("WORK_DIR").map(PathBuf::from).unwrap_or_else(env::temp_dir),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.region, "us-east-1");
        assert!(config.storage.endpoint.is_none());
        assert!(config.pipeline.target_bucket.is_none());
        assert_eq!(config.pipeline.thumbnail_prefix, "thumbnails/");
        assert_eq!(config.pipeline.thumbnail_size, ThumbnailSize { width: 200, height: 200 });
    }

    #[test]
    fn test_pipeline_overrides() {
        let config = config_from(&[
            ("TARGET_BUCKET_NAME", "previews"),
            ("THUMBNAIL_PREFIX", "thumbs/"),
            ("THUMBNAIL_SIZE", "320x240"),
            ("WORK_DIR", "/var/tmp/pdf"),
        ])
        .unwrap();

        assert_eq!(config.pipeline.target_bucket.as_deref(), Some("previews"));
        assert_eq!(config.pipeline.thumbnail_prefix, "thumbs/");
        assert_eq!(config.pipeline.thumbnail_size.to_string(), "320x240");
        assert_eq!(config.pipeline.work_dir, PathBuf::from("/var/tmp/pdf"));
    }

    #[test]
    fn test_empty_target_bucket_is_unset() {
        let config = config_from(&[("TARGET_BUCKET_NAME", "")]).unwrap();
        assert!(config.pipeline.target_bucket.is_none());
    }

    #[test]
    fn test_thumbnail_size_parsing() {
        assert_eq!(
            "640X480".parse::<ThumbnailSize>().unwrap(),
            ThumbnailSize { width: 640, height: 480 }
        );
        assert!("200".parse::<ThumbnailSize>().is_err());
        assert!("0x200".parse::<ThumbnailSize>().is_err());
        assert!("ax200".parse::<ThumbnailSize>().is_err());
        assert!(config_from(&[("THUMBNAIL_SIZE", "big")]).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("SERVER_PORT", "http")]);
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }
}
