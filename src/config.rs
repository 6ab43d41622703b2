//! Report configuration, optionally read from `dropchance.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DropChanceError, Result};

pub const CONFIG_FILE_NAME: &str = "dropchance.toml";

/// Widest fixed-point precision that still carries information for an f64.
pub const MAX_PRECISION: usize = 17;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DropChanceConfig {
    /// Directory the table directories and output directory are resolved against.
    pub root: PathBuf,

    /// Where the CSV reports are written.
    pub output_dir: PathBuf,

    /// Directories searched, in order, for each table file.
    pub table_dirs: Vec<PathBuf>,

    /// Decimal places for probability columns.
    pub precision: usize,

    pub tables: TableNames,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableNames {
    pub drop_table: String,
    pub drop_package_table: String,
    pub item_table: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            drop_table: "DropTable.json".to_string(),
            drop_package_table: "DropPackageTable.json".to_string(),
            item_table: "ItemTable.json".to_string(),
        }
    }
}

impl Default for DropChanceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("drop_chance"),
            table_dirs: vec![PathBuf::from("."), PathBuf::from("ztable")],
            precision: 6,
            tables: TableNames::default(),
        }
    }
}

impl DropChanceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(DropChanceError::Config(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        if self.table_dirs.is_empty() {
            return Err(DropChanceError::Config(
                "table_dirs must name at least one directory".to_string(),
            ));
        }
        let names = [
            ("tables.drop_table", &self.tables.drop_table),
            ("tables.drop_package_table", &self.tables.drop_package_table),
            ("tables.item_table", &self.tables.item_table),
        ];
        if let Some((field, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(DropChanceError::Config(format!("{field} must not be empty")));
        }
        Ok(())
    }

    /// Table directories resolved against `root`.
    pub fn table_dirs(&self) -> Vec<PathBuf> {
        self.table_dirs.iter().map(|dir| self.resolve(dir)).collect()
    }

    /// Output directory resolved against `root`.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DropChanceConfig::default()`.
pub fn load_config(path: &Path) -> Result<DropChanceConfig> {
    if !path.exists() {
        let cfg = DropChanceConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).map_err(|source| DropChanceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: DropChanceConfig =
        toml::from_str(&contents).map_err(|source| DropChanceError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
    cfg.validate()?;
    Ok(cfg)
}
