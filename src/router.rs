use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::cli::{usage, ArgsError, Command, ServerFlags};
use crate::config::{AppConfig, ConfigError};
use crate::envfile::{self, EnvFileError};
use crate::platform::{CoreError, Platform};
use crate::run::RunOnce;
use crate::update::{compare_version, UpdateChecker, VersionStatus};
use crate::{COMMIT, VERSION};

/// File written by `statup export`, relative to the working directory.
pub const EXPORT_FILE: &str = "index.html";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    EnvFile(#[from] EnvFileError),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write to stdout: {0}")]
    Output(#[source] std::io::Error),
}

/// What the caller does after a command ran.
#[derive(Debug)]
pub enum Disposition {
    /// No command matched; start the long-running server.
    Continue,
    /// The command finished; exit without starting the server.
    Handled,
    /// The command failed; report the cause and exit non-zero.
    Failed(CliError),
}

impl From<Result<(), CliError>> for Disposition {
    fn from(result: Result<(), CliError>) -> Self {
        match result {
            Ok(()) => Disposition::Handled,
            Err(e) => Disposition::Failed(e),
        }
    }
}

/// Per-invocation dispatch context. Holds no state beyond one process run.
pub struct Router<'a, P: Platform + ?Sized, W: Write> {
    platform: &'a P,
    /// Where `config.yml`, assets and logs live.
    data_dir: PathBuf,
    /// Where `.env` is read and `index.html` is written.
    work_dir: PathBuf,
    flags: ServerFlags,
    updates: UpdateChecker,
    out: W,
}

impl<'a, P: Platform + ?Sized, W: Write> Router<'a, P, W> {
    pub fn new(
        platform: &'a P,
        data_dir: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        out: W,
    ) -> Self {
        Self {
            platform,
            data_dir: data_dir.into(),
            work_dir: work_dir.into(),
            flags: ServerFlags::default(),
            updates: UpdateChecker::new(),
            out,
        }
    }

    pub fn with_flags(mut self, flags: ServerFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_update_checker(mut self, updates: UpdateChecker) -> Self {
        self.updates = updates;
        self
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }

    /// Run the command named by `args[0]`.
    pub fn dispatch(&mut self, args: &[String]) -> Disposition {
        let command = Command::parse(args);
        info!(?command, "dispatching");

        match command {
            Command::App => self.app().into(),
            Command::Version => self.version().into(),
            Command::Assets => self.assets().into(),
            Command::Sass => self.sass().into(),
            Command::Update => self.update(),
            Command::Test(sub) => {
                self.test(sub.as_deref());
                Disposition::Handled
            }
            Command::Export => self.export().into(),
            Command::Help => self.print(&usage()).into(),
            Command::Run => self.run().into(),
            Command::Env => self.env().into(),
            Command::Unknown(_) => Disposition::Continue,
        }
    }

    fn print(&mut self, text: &str) -> Result<(), CliError> {
        self.out.write_all(text.as_bytes()).map_err(CliError::Output)
    }

    fn app(&mut self) -> Result<(), CliError> {
        info!(ip = %self.flags.ip, port = self.flags.port, "launching desktop mode");
        self.platform
            .launch_desktop(&self.flags.ip, self.flags.port)?;
        Ok(())
    }

    fn version(&mut self) -> Result<(), CliError> {
        let line = match COMMIT {
            Some(commit) if !commit.is_empty() => {
                format!("Statup v{} ({})\n", VERSION, commit)
            }
            _ => format!("Statup v{}\n", VERSION),
        };
        self.print(&line)
    }

    fn assets(&mut self) -> Result<(), CliError> {
        self.platform.create_all_assets(&self.data_dir)?;
        info!(dir = %self.data_dir.display(), "assets written");
        Ok(())
    }

    fn sass(&mut self) -> Result<(), CliError> {
        self.platform.compile_sass(&self.data_dir)?;
        info!(dir = %self.data_dir.display(), "sass compiled");
        Ok(())
    }

    /// A failed fetch falls through to the server instead of failing the
    /// command. The cause is logged so it is not lost.
    fn update(&mut self) -> Disposition {
        let release = match self.updates.check_latest_release() {
            Ok(release) => release,
            Err(e) => {
                warn!(
                    endpoint = self.updates.endpoint(),
                    error = %e,
                    "update check failed, starting normally"
                );
                return Disposition::Continue;
            }
        };

        let status = compare_version(VERSION, &release.tag_name);
        if let VersionStatus::Different { direction, .. } = &status {
            info!(
                ?direction,
                tag = %release.tag_name,
                "running version differs from latest release"
            );
        }
        let report = format!(
            "Statup Version: v{}\nLatest Version: {}\n{}",
            VERSION, release.tag_name, status
        );
        self.print(&report).into()
    }

    fn test(&mut self, sub: Option<&str>) {
        match sub {
            Some("plugins") => match self.platform.load_plugins() {
                Ok(plugins) => {
                    let mut report = format!("Loaded {} plugin(s)\n", plugins.len());
                    for plugin in &plugins {
                        report.push_str(&format!(
                            "    Plugin {} by {} | {}\n",
                            plugin.name, plugin.author, plugin.description
                        ));
                    }
                    if let Err(e) = self.print(&report) {
                        error!(error = %e, "could not print plugin report");
                    }
                }
                Err(e) => error!(error = %e, "plugin self-test failed"),
            },
            Some(other) => warn!(sub = other, "unknown test target, expected 'plugins'"),
            None => warn!("missing test target, expected 'statup test plugins'"),
        }
    }

    fn export(&mut self) -> Result<(), CliError> {
        self.print(&format!(
            "Statup v{} Exporting Static '{}' page...\n",
            VERSION, EXPORT_FILE
        ))?;

        let config = AppConfig::load(&self.data_dir).inspect_err(|e| {
            error!(error = %e, "config.yml file not found");
        })?;
        let page = self.platform.export_index_html(&config)?;

        let path = self.work_dir.join(EXPORT_FILE);
        std::fs::write(&path, page.as_bytes()).map_err(|source| {
            error!(path = %path.display(), error = %source, "export failed");
            CliError::Write {
                path: path.clone(),
                source,
            }
        })?;

        info!(path = %path.display(), "exported Statup index page");
        Ok(())
    }

    fn run(&mut self) -> Result<(), CliError> {
        info!("running 1 time and saving to database");
        RunOnce::new(self.platform, &self.data_dir).execute(&mut self.out);
        self.print("Check is complete.\n")
    }

    fn env(&mut self) -> Result<(), CliError> {
        self.print("Statup Environment Variable\n")?;
        let pairs = envfile::read_pairs(&self.work_dir).inspect_err(|_| {
            error!("no .env file found in current directory");
        })?;
        let mut listing = String::new();
        for (key, value) in pairs {
            listing.push_str(&format!("{}={}\n", key, value));
        }
        self.print(&listing)
    }
}
