//! Test doubles shared by the module tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::platform::{CoreError, CoreInfo, Platform, PluginInfo, Service, Store};

// Serialize env-var tests to prevent interference between parallel test threads.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Calls made against the fakes, in order.
pub type CallLog = Rc<RefCell<Vec<String>>>;

#[derive(Clone, Default)]
pub struct FakeStore {
    pub core: Option<CoreInfo>,
    pub services: Option<Vec<Service>>,
    /// Fresh copies returned by `select_service`; missing ids fail.
    pub fresh: HashMap<i64, Service>,
    /// Results of `check_service`; missing ids fail.
    pub checked: HashMap<i64, Service>,
    pub calls: CallLog,
}

impl Store for FakeStore {
    fn select_core(&self) -> Result<CoreInfo, CoreError> {
        self.calls.borrow_mut().push("select_core".to_string());
        self.core.clone().ok_or(CoreError::CoreNotFound)
    }

    fn select_all_services(&self, fresh: bool) -> Result<Vec<Service>, CoreError> {
        self.calls
            .borrow_mut()
            .push(format!("select_all_services fresh={fresh}"));
        self.services
            .clone()
            .ok_or_else(|| CoreError::Collaborator("services table missing".to_string()))
    }

    fn select_service(&self, id: i64) -> Result<Service, CoreError> {
        self.calls.borrow_mut().push(format!("select_service {id}"));
        self.fresh.get(&id).cloned().ok_or(CoreError::ServiceNotFound(id))
    }

    fn check_service(&self, service: &Service, record: bool) -> Result<Service, CoreError> {
        self.calls
            .borrow_mut()
            .push(format!("check_service {} record={record}", service.id));
        self.checked
            .get(&service.id)
            .cloned()
            .ok_or_else(|| CoreError::Collaborator(format!("check failed for {}", service.id)))
    }
}

#[derive(Default)]
pub struct FakePlatform {
    /// `None` makes `connect` fail.
    pub store: Option<FakeStore>,
    pub fail_assets: bool,
    pub fail_sass: bool,
    pub fail_desktop: bool,
    pub plugins: Option<Vec<PluginInfo>>,
    pub page: Option<String>,
    pub calls: CallLog,
    pub connected_with: RefCell<Option<AppConfig>>,
    pub dirs: RefCell<Vec<PathBuf>>,
}

impl FakePlatform {
    pub fn with_store(store: FakeStore) -> Self {
        let calls = store.calls.clone();
        Self {
            store: Some(store),
            calls,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl Platform for FakePlatform {
    fn connect(&self, config: &AppConfig, data_dir: &Path) -> Result<Box<dyn Store>, CoreError> {
        self.record("connect");
        *self.connected_with.borrow_mut() = Some(config.clone());
        self.dirs.borrow_mut().push(data_dir.to_path_buf());
        match &self.store {
            Some(store) => Ok(Box::new(store.clone())),
            None => Err(CoreError::Connection("connection refused".to_string())),
        }
    }

    fn launch_desktop(&self, ip: &str, port: u16) -> Result<(), CoreError> {
        self.record(format!("launch_desktop {ip}:{port}"));
        if self.fail_desktop {
            return Err(CoreError::Collaborator("no display".to_string()));
        }
        Ok(())
    }

    fn create_all_assets(&self, data_dir: &Path) -> Result<(), CoreError> {
        self.record("create_all_assets");
        self.dirs.borrow_mut().push(data_dir.to_path_buf());
        if self.fail_assets {
            return Err(CoreError::Collaborator("assets directory not writable".to_string()));
        }
        Ok(())
    }

    fn compile_sass(&self, data_dir: &Path) -> Result<(), CoreError> {
        self.record("compile_sass");
        self.dirs.borrow_mut().push(data_dir.to_path_buf());
        if self.fail_sass {
            return Err(CoreError::Collaborator("sass binary not found".to_string()));
        }
        Ok(())
    }

    fn load_plugins(&self) -> Result<Vec<PluginInfo>, CoreError> {
        self.record("load_plugins");
        self.plugins
            .clone()
            .ok_or_else(|| CoreError::Collaborator("plugins directory missing".to_string()))
    }

    fn export_index_html(&self, _config: &AppConfig) -> Result<String, CoreError> {
        self.record("export_index_html");
        self.page
            .clone()
            .ok_or_else(|| CoreError::Collaborator("template missing".to_string()))
    }

    fn serve(&self, ip: &str, port: u16) -> Result<(), CoreError> {
        self.record(format!("serve {ip}:{port}"));
        Ok(())
    }
}

pub fn service(id: i64, name: &str, domain: &str) -> Service {
    Service {
        id,
        name: name.to_string(),
        domain: domain.to_string(),
        latency: 0.0,
        online: false,
    }
}
