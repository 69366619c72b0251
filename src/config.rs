//! Where the application keeps its files and which validation rules it runs
//! with. Everything lives in one hidden folder under the user's home so a
//! backup is a single copy.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::validate::ValidationRules;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "school_management.db";
/// Log file written next to the database; the terminal itself is owned by the UI.
const LOG_FILE_NAME: &str = "school-manager.log";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_path: PathBuf,
    pub rules: ValidationRules,
}

impl AppConfig {
    /// Resolve the default layout inside the user's home directory.
    pub fn load() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Same layout rooted at an arbitrary directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            database_path: dir.join(DB_FILE_NAME),
            log_path: dir.join(LOG_FILE_NAME),
            rules: ValidationRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_share_one_directory() {
        let config = AppConfig::in_dir("/tmp/school");
        assert_eq!(
            config.database_path,
            PathBuf::from("/tmp/school/school_management.db")
        );
        assert_eq!(
            config.log_path,
            PathBuf::from("/tmp/school/school-manager.log")
        );
        assert_eq!(config.rules, ValidationRules::default());
    }
}
