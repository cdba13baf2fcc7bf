use std::{
    fs,
    path::{Path, PathBuf},
};

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::{debug, info};

use crate::{
    annotations::annotate_toml_table,
    display::{DisplaySettings, TableStyle},
    error::{ConfigError, Result},
    path::{resolve_path, xdg_config_home, xdg_data_home},
};

/// Path that selects an in-memory database.
pub const MEMORY_DB: &str = ":memory:";

const JOURNAL_MODES: [&str; 6] = ["delete", "truncate", "persist", "memory", "wal", "off"];

/// litequery configuration
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Path to the SQLite database file. Use ":memory:" for a throwaway database.
    /// Default: $XDG_DATA_HOME/litequery/litequery.db
    pub db_path: Option<String>,

    /// Enforce foreign key constraints.
    /// Default: true
    pub foreign_keys: Option<bool>,

    /// SQLite journal mode: "delete", "truncate", "persist", "memory", "wal" or "off".
    /// Unset keeps SQLite's default.
    pub journal_mode: Option<String>,

    /// Milliseconds to wait for a locked database before giving up.
    /// Default: 5000
    pub busy_timeout_ms: Option<u64>,

    /// Schema files applied by `litequery apply` when no file is given.
    pub schema_paths: Option<Vec<String>>,

    /// Display settings for query output.
    pub display: Option<DisplaySettings>,
}

/// Location of the config file: `$LITEQUERY_CONFIG`, else
/// `$XDG_CONFIG_HOME/litequery/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var("LITEQUERY_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("litequery").join("config.toml"),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            db_path: Some(format!(
                "{}/litequery/litequery.db",
                xdg_data_home().display()
            )),
            foreign_keys: Some(true),
            journal_mode: None,
            busy_timeout_ms: Some(5000),
            schema_paths: Some(Vec::new()),
            display: Some(DisplaySettings {
                null_text: Some("NULL".into()),
                max_cell_width: Some(0),
                table_style: Some(TableStyle::Rounded),
            }),
        }
    }

    /// Loads the configuration from [`default_config_path`].
    pub fn new() -> Result<Self> {
        Self::from_path(default_config_path())
    }

    /// Loads the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset fields with their defaults and validates the rest.
    pub fn resolve(&mut self) -> Result<()> {
        self.foreign_keys.get_or_insert(true);
        self.busy_timeout_ms.get_or_insert(5000);

        if let Some(mode) = self.journal_mode.take() {
            let normalized = mode.trim().to_ascii_lowercase();
            if !JOURNAL_MODES.contains(&normalized.as_str()) {
                return Err(ConfigError::InvalidJournalMode(mode));
            }
            self.journal_mode = Some(normalized);
        }

        Ok(())
    }

    /// Database location, `$LITEQUERY_DB` taking precedence over `db_path`.
    ///
    /// `:memory:` is returned as-is.
    pub fn get_db_path(&self) -> Result<PathBuf> {
        let raw = match std::env::var("LITEQUERY_DB") {
            Ok(env_path) => env_path,
            Err(_) => match &self.db_path {
                Some(db_path) => db_path.clone(),
                None => return Ok(xdg_data_home().join("litequery").join("litequery.db")),
            },
        };

        if raw.trim() == MEMORY_DB {
            return Ok(PathBuf::from(MEMORY_DB));
        }
        Ok(resolve_path(&raw)?)
    }

    pub fn get_schema_paths(&self) -> Result<Vec<PathBuf>> {
        self.schema_paths
            .iter()
            .flatten()
            .map(|p| resolve_path(p).map_err(ConfigError::from))
            .collect()
    }

    pub fn foreign_keys(&self) -> bool {
        self.foreign_keys.unwrap_or(true)
    }

    pub fn busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5000)
    }

    pub fn display(&self) -> DisplaySettings {
        self.display.clone().unwrap_or_default()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serialized)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(display_table) = doc.get_mut("display").and_then(|i| i.as_table_mut()) {
            annotate_toml_table::<DisplaySettings>(display_table, false)?;
        }

        Ok(doc)
    }
}

/// Writes an annotated default configuration to `path`.
///
/// Refuses to overwrite an existing file.
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config_path = path.as_ref();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}
