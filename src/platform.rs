//! Interface to the monitoring core.
//!
//! The health-check engine, storage, web server, plugin loader, asset pipeline and
//! desktop shell all live outside this crate. The CLI only reaches them
//! through [`Platform`] and the [`Store`] handle it hands out.

use std::path::Path;

use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} is not linked into this build")]
    Unavailable(&'static str),
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("core record not found")]
    CoreNotFound,
    #[error("service {0} not found")]
    ServiceNotFound(i64),
    #[error("{0}")]
    Collaborator(String),
}

/// The singleton application record kept by the core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreInfo {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub domain: String,
    pub latency: f64, // seconds
    pub online: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginInfo {
    pub name: String,
    pub author: String,
    pub description: String,
}

/// A live connection to the monitoring database.
pub trait Store {
    fn select_core(&self) -> Result<CoreInfo, CoreError>;

    /// Every registered service. `fresh` bypasses any cached list.
    fn select_all_services(&self, fresh: bool) -> Result<Vec<Service>, CoreError>;

    /// Re-read one service record.
    fn select_service(&self, id: i64) -> Result<Service, CoreError>;

    /// Run one synchronous health check and return the updated record.
    /// `record` persists the result as a hit or failure.
    fn check_service(&self, service: &Service, record: bool) -> Result<Service, CoreError>;
}

pub trait Platform {
    fn connect(&self, config: &AppConfig, data_dir: &Path) -> Result<Box<dyn Store>, CoreError>;
    fn launch_desktop(&self, ip: &str, port: u16) -> Result<(), CoreError>;
    fn create_all_assets(&self, data_dir: &Path) -> Result<(), CoreError>;
    fn compile_sass(&self, data_dir: &Path) -> Result<(), CoreError>;
    fn load_plugins(&self) -> Result<Vec<PluginInfo>, CoreError>;
    /// Render the public status page as a self-contained HTML document.
    fn export_index_html(&self, config: &AppConfig) -> Result<String, CoreError>;
    /// Run the long-lived HTTP server. Blocks until shutdown.
    fn serve(&self, ip: &str, port: u16) -> Result<(), CoreError>;
}

/// Platform used when the binary is built without a monitoring core.
///
/// Every collaborator reports itself as unavailable, which makes `run` degrade
/// to the "not set up yet" report instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlinked;

impl Platform for Unlinked {
    fn connect(&self, _config: &AppConfig, _data_dir: &Path) -> Result<Box<dyn Store>, CoreError> {
        Err(CoreError::Unavailable("database layer"))
    }

    fn launch_desktop(&self, _ip: &str, _port: u16) -> Result<(), CoreError> {
        Err(CoreError::Unavailable("desktop shell"))
    }

    fn create_all_assets(&self, _data_dir: &Path) -> Result<(), CoreError> {
        Err(CoreError::Unavailable("asset bundle"))
    }

    fn compile_sass(&self, _data_dir: &Path) -> Result<(), CoreError> {
        Err(CoreError::Unavailable("sass compiler"))
    }

    fn load_plugins(&self) -> Result<Vec<PluginInfo>, CoreError> {
        Err(CoreError::Unavailable("plugin loader"))
    }

    fn export_index_html(&self, _config: &AppConfig) -> Result<String, CoreError> {
        Err(CoreError::Unavailable("page renderer"))
    }

    fn serve(&self, _ip: &str, _port: u16) -> Result<(), CoreError> {
        Err(CoreError::Unavailable("web server"))
    }
}
