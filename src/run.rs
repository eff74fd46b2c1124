//! One-shot check pass.
//!
//! Every stage is an independent attempt: a failure is logged and the next
//! stage runs with whatever the earlier ones produced. The pass itself never
//! fails, it prints as much status as can be determined.

use std::fmt;
use std::io::Write;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::platform::{CoreInfo, Platform, Service, Store};

/// Printed when the core record cannot be selected.
pub const NOT_SET_UP: &str = "Core database was not found, Statup is not setup yet.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadConfig,
    Connect,
    SelectCore,
    LoadServices,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::LoadConfig => "load config",
            Stage::Connect => "connect",
            Stage::SelectCore => "select core",
            Stage::LoadServices => "load services",
        })
    }
}

/// One line of the one-shot report.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub name: String,
    pub domain: String,
    pub latency: f64, // seconds
    pub online: bool,
}

impl RunSummary {
    pub fn latency_ms(&self) -> f64 {
        self.latency * 1000.0
    }
}

impl From<&Service> for RunSummary {
    fn from(service: &Service) -> Self {
        Self {
            name: service.name.clone(),
            domain: service.domain.clone(),
            latency: service.latency,
            online: service.online,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "    Service {} | URL: {} | Latency: {:.0}ms | Online: {}",
            self.name,
            self.domain,
            self.latency_ms(),
            self.online
        )
    }
}

/// Keep the value of a successful stage, log the failure of any other.
fn attempt<T, E: fmt::Display>(stage: Stage, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(stage = %stage, error = %e, "stage failed, continuing");
            None
        }
    }
}

pub struct RunOnce<'a, P: Platform + ?Sized> {
    platform: &'a P,
    data_dir: &'a Path,
}

impl<'a, P: Platform + ?Sized> RunOnce<'a, P> {
    pub fn new(platform: &'a P, data_dir: &'a Path) -> Self {
        Self { platform, data_dir }
    }

    /// Check every registered service once and print one line per service.
    ///
    /// Returns the printed summaries. Write errors on `out` are logged and
    /// do not stop the pass.
    pub fn execute(&self, out: &mut dyn Write) -> Vec<RunSummary> {
        let config = attempt(Stage::LoadConfig, AppConfig::load(self.data_dir));
        if config.is_none() {
            warn!("config.yml file not found");
        }
        let config = config.unwrap_or_default();

        let store = attempt(Stage::Connect, self.platform.connect(&config, self.data_dir));
        let store = store.as_deref();

        match self.select_core(store) {
            Some(core) => info!(name = %core.name, "core selected"),
            None => emit(out, NOT_SET_UP),
        }

        let services = match store {
            Some(store) => attempt(Stage::LoadServices, store.select_all_services(true)),
            None => {
                warn!(stage = %Stage::LoadServices, "skipped, no database connection");
                None
            }
        }
        .unwrap_or_default();

        let mut summaries = Vec::with_capacity(services.len());
        if let Some(store) = store {
            for loaded in &services {
                let summary = check_one(store, loaded);
                emit(out, &summary.to_string());
                summaries.push(summary);
            }
        }
        info!(services = summaries.len(), "one-shot pass finished");
        summaries
    }

    fn select_core(&self, store: Option<&dyn Store>) -> Option<CoreInfo> {
        match store {
            Some(store) => attempt(Stage::SelectCore, store.select_core()),
            None => {
                warn!(stage = %Stage::SelectCore, "skipped, no database connection");
                None
            }
        }
    }
}

fn check_one(store: &dyn Store, loaded: &Service) -> RunSummary {
    let service = match store.select_service(loaded.id) {
        Ok(fresh) => fresh,
        Err(e) => {
            warn!(service = loaded.id, error = %e, "could not refresh service, using loaded copy");
            loaded.clone()
        }
    };

    match store.check_service(&service, true) {
        Ok(checked) => RunSummary::from(&checked),
        Err(e) => {
            error!(service = service.id, error = %e, "health check failed");
            RunSummary::from(&service)
        }
    }
}

fn emit(out: &mut dyn Write, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        error!(error = %e, "could not write to output");
    }
}
