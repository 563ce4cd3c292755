use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional config file looked up in the working directory.
pub const CONFIG_FILE: &str = "tempmap.json";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Where the static data lives and how the catalog is shaped.
///
/// Layout on disk:
/// ```text
/// <data_dir>/<catalog_file>            site catalog
/// <data_dir>/<sites_subdir>/<CODE>.csv per-site time series
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root directory of the static data files.
    pub data_dir: PathBuf,
    /// Catalog file name inside `data_dir`.
    pub catalog_file: String,
    /// Subdirectory of `data_dir` holding one CSV per site code.
    pub sites_subdir: String,
    /// Whether the catalog carries a header row. Older catalog exports
    /// are headerless with the same column order.
    pub catalog_has_headers: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_file: "sites.csv".to_string(),
            sites_subdir: "sites".to_string(),
            catalog_has_headers: true,
        }
    }
}

impl AppConfig {
    /// Read `tempmap.json` if present, otherwise fall back to defaults.
    /// A malformed config file is logged and ignored rather than fatal.
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.is_file() {
            return Self::default();
        }
        match Self::read_from(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    fn read_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading config file")?;
        serde_json::from_str(&text).context("parsing config file")
    }

    /// Full path of the catalog file.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    /// Directory holding the per-site CSV files.
    pub fn sites_dir(&self) -> PathBuf {
        self.data_dir.join(&self.sites_subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn defaults_point_at_data_dir() {
        let config = AppConfig::default();
        assert_eq!(config.catalog_path(), std::path::Path::new("data/sites.csv"));
        assert_eq!(config.sites_dir(), std::path::Path::new("data/sites"));
        assert!(config.catalog_has_headers);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "data_dir": "/srv/tempmap", "catalog_has_headers": false }"#)
                .unwrap();
        assert_eq!(config.data_dir, std::path::PathBuf::from("/srv/tempmap"));
        assert!(!config.catalog_has_headers);
        assert_eq!(config.catalog_file, "sites.csv");
    }
}
