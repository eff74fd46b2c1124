use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.yml";

/// Overrides the data directory (defaults to the working directory).
pub const DATA_DIR_ENV: &str = "STATUP_DIR";

/// Database and site settings read from `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: String, // "sqlite" | "mysql" | "postgres"
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    pub location: String, // data directory the sqlite file lives in
    pub api_key: String,
    pub api_secret: String,
    pub project: String,
    pub description: String,
    pub domain: String,
    pub username: String,
    pub email: String,
    pub sqlfile: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the working directory: {0}")]
    NoWorkingDir(#[source] std::io::Error),
    #[error("{} file not found in {}", CONFIG_FILE, .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid DB_PORT value {0:?}")]
    InvalidPort(String),
}

/// `STATUP_DIR` if set, otherwise the current working directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    match std::env::var(DATA_DIR_ENV) {
        Ok(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => std::env::current_dir().map_err(ConfigError::NoWorkingDir),
    }
}

impl AppConfig {
    /// Load `<dir>/config.yml`.
    ///
    /// When the file does not exist but `DB_CONN` is set, the configuration is
    /// assembled from the environment instead, so containers can run without a
    /// config file.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => Self::parse(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                match Self::from_env()? {
                    Some(config) => config,
                    None => return Err(ConfigError::NotFound(dir.to_path_buf())),
                }
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        if config.location.is_empty() {
            config.location = dir.display().to_string();
        }
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes to unit, not to an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Build from `DB_*` variables; `None` when `DB_CONN` is unset.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let connection = match std::env::var("DB_CONN") {
            Ok(v) if !v.is_empty() => v,
            _ => return Ok(None),
        };

        let port = match std::env::var("DB_PORT") {
            Ok(v) if !v.is_empty() => v.parse().map_err(|_| ConfigError::InvalidPort(v))?,
            _ => default_port(&connection),
        };

        let var = |key: &str| std::env::var(key).unwrap_or_default();

        Ok(Some(Self {
            connection,
            host: var("DB_HOST"),
            user: var("DB_USER"),
            password: var("DB_PASS"),
            database: var("DB_DATABASE"),
            port,
            project: var("NAME"),
            description: var("DESCRIPTION"),
            domain: var("DOMAIN"),
            username: var("ADMIN_USER"),
            email: var("ADMIN_EMAIL"),
            ..Self::default()
        }))
    }
}

fn default_port(connection: &str) -> u16 {
    match connection {
        "mysql" => 3306,
        "postgres" => 5432,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ENV_LOCK;
    use tempfile::tempdir;

    const DB_VARS: &[&str] = &[
        "DB_CONN", "DB_HOST", "DB_USER", "DB_PASS", "DB_DATABASE", "DB_PORT", "NAME",
        "DESCRIPTION", "DOMAIN", "ADMIN_USER", "ADMIN_EMAIL",
    ];

    fn clear_db_vars() {
        for key in DB_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn loads_yaml_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "connection: postgres\nhost: db.local\nuser: statup\npassword: secret\ndatabase: statup\nport: 5432\nproject: Demo\n",
        )
        .unwrap();

        let config = AppConfig::load(dir.path()).unwrap();
        assert_eq!(config.connection, "postgres");
        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 5432);
        assert_eq!(config.project, "Demo");
        assert_eq!(config.location, dir.path().display().to_string());
    }

    #[test]
    fn missing_file_without_env_is_not_found() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_db_vars();
        let dir = tempdir().unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)), "got {err:?}");
        assert!(err.to_string().contains("config.yml file not found"));
    }

    #[test]
    fn missing_file_falls_back_to_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_db_vars();
        std::env::set_var("DB_CONN", "mysql");
        std::env::set_var("DB_HOST", "mysql.local");
        std::env::set_var("NAME", "Env Project");
        let dir = tempdir().unwrap();
        let config = AppConfig::load(dir.path());
        clear_db_vars();

        let config = config.unwrap();
        assert_eq!(config.connection, "mysql");
        assert_eq!(config.host, "mysql.local");
        assert_eq!(config.port, 3306);
        assert_eq!(config.project, "Env Project");
    }

    #[test]
    fn bad_db_port_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_db_vars();
        std::env::set_var("DB_CONN", "postgres");
        std::env::set_var("DB_PORT", "fivefourthreetwo");
        let result = AppConfig::from_env();
        clear_db_vars();
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "port: [unterminated\n").unwrap();
        let err = AppConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn empty_file_is_default_config() {
        let config = AppConfig::parse("  \n").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn data_dir_env_override_respected() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var(DATA_DIR_ENV, "/tmp/test-statup-dir-12345");
        let dir = data_dir();
        std::env::remove_var(DATA_DIR_ENV);
        assert_eq!(dir.unwrap(), PathBuf::from("/tmp/test-statup-dir-12345"));
    }
}
