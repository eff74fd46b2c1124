use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ENV_FILE: &str = ".env";

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("no {} file found in {}", ENV_FILE, .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Export `<dir>/.env` into the process environment.
///
/// Returns `Ok(false)` when there is no file. Variables that are already set
/// keep their value.
pub fn load_into_process(dir: &Path) -> Result<bool, EnvFileError> {
    let path = dir.join(ENV_FILE);
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(source) => Err(EnvFileError::Read { path, source }),
    }
}

/// Key/value pairs of `<dir>/.env` in file order.
pub fn read_pairs(dir: &Path) -> Result<Vec<(String, String)>, EnvFileError> {
    let path = dir.join(ENV_FILE);
    let iter = dotenvy::from_path_iter(&path).map_err(|source| {
        if source.not_found() {
            EnvFileError::NotFound(dir.to_path_buf())
        } else {
            EnvFileError::Read {
                path: path.clone(),
                source,
            }
        }
    })?;

    iter.map(|item| {
        item.map_err(|source| EnvFileError::Read {
            path: path.clone(),
            source,
        })
    })
    .collect()
}
