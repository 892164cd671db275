use std::path::{Path, PathBuf};

use anyhow::Context;

const DEFAULT_DOWNLOAD_DIR_NAME: &str = "Satchel";

#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Where remote files land before being handed to a viewer.
    pub download_root: PathBuf,
    /// Override for the drive API endpoint; `None` uses the built-in default.
    pub api_base_url: Option<String>,
}

impl ManagerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let home = dirs::home_dir().context("home directory is unavailable")?;
        let download_root = std::env::var("SATCHEL_DOWNLOAD_DIR")
            .ok()
            .map(|value| expand_with_home(&value, &home))
            .unwrap_or_else(default_download_root);
        let api_base_url = std::env::var("SATCHEL_API_URL").ok();
        Ok(Self {
            download_root,
            api_base_url,
        })
    }
}

fn default_download_root() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_DOWNLOAD_DIR_NAME)
}

fn expand_with_home(value: &str, home: &Path) -> PathBuf {
    if value == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = value.strip_prefix("~/") {
        return home.join(rest);
    }
    PathBuf::from(value)
}
