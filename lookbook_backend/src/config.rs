use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LookbookConfig {
    pub api_port: u16,
    pub paths: LookbookPaths,
    pub feed: FeedConfig,
}

impl LookbookConfig {
    pub fn from_env() -> Result<Self> {
        let paths = LookbookPaths::discover()?;
        let api_port = env::var("LOOKBOOK_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        let feed = FeedConfig::from_env();
        Ok(Self {
            api_port,
            paths,
            feed,
        })
    }

    pub fn new(api_port: u16, paths: LookbookPaths) -> Self {
        Self {
            api_port,
            paths,
            feed: FeedConfig::from_env(),
        }
    }

    pub fn with_feed(api_port: u16, paths: LookbookPaths, feed: FeedConfig) -> Self {
        Self {
            api_port,
            paths,
            feed,
        }
    }
}

/// Defaults applied when a feed or catalogue request does not name a limit.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub default_feed_limit: usize,
    pub default_catalog_limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_feed_limit: 50,
            default_catalog_limit: 50,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_feed_limit = env::var("LOOKBOOK_FEED_LIMIT")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(defaults.default_feed_limit);
        let default_catalog_limit = env::var("LOOKBOOK_CATALOG_LIMIT")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(defaults.default_catalog_limit);
        Self {
            default_feed_limit,
            default_catalog_limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LookbookPaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl LookbookPaths {
    pub fn discover() -> Result<Self> {
        if let Some(base) = env::var_os("LOOKBOOK_BASE_DIR") {
            return Self::from_base_dir(PathBuf::from(base));
        }
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("lookbook.db");
        let logs_dir = base.join("logs");

        Ok(Self {
            base,
            data_dir,
            db_path,
            logs_dir,
        })
    }
}
