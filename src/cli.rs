//! Command tokens and server flags.
//!
//! Arguments are parsed by hand: the surface is one positional token plus two
//! flags, and flags use single-dash long names (`-ip`, `-port`).

use std::fmt::Write as _;

use thiserror::Error;

use crate::VERSION;

pub const DEFAULT_IP: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    App,
    Version,
    Assets,
    Sass,
    Update,
    /// `test <sub>`; only `plugins` does anything.
    Test(Option<String>),
    Export,
    Help,
    Run,
    Env,
    /// Anything else, including no token at all.
    Unknown(String),
}

impl Command {
    /// Match the first positional argument exactly.
    pub fn parse(args: &[String]) -> Self {
        let Some(token) = args.first() else {
            return Command::Unknown(String::new());
        };
        match token.as_str() {
            "app" => Command::App,
            "version" => Command::Version,
            "assets" => Command::Assets,
            "sass" => Command::Sass,
            "update" => Command::Update,
            "test" => Command::Test(args.get(1).cloned()),
            "export" => Command::Export,
            "help" => Command::Help,
            "run" => Command::Run,
            "env" => Command::Env,
            other => Command::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for flag -port: {reason}")]
    InvalidPort { value: String, reason: String },
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),
}

/// Address the server and desktop modes bind to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFlags {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerFlags {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerFlags {
    /// Consume leading flags and return them with the remaining positional
    /// arguments.
    ///
    /// Parsing stops at the first non-flag argument or at `--`, so
    /// `statup -port 9000 run` and `statup run` both leave `["run"]`.
    pub fn parse(args: &[String]) -> Result<(Self, Vec<String>), ArgsError> {
        let mut flags = Self::default();
        let mut i = 0;

        while let Some(arg) = args.get(i) {
            if arg == "--" {
                i += 1;
                break;
            }
            let Some(stripped) = arg.strip_prefix('-').filter(|s| !s.is_empty()) else {
                break;
            };
            let stripped = stripped.strip_prefix('-').unwrap_or(stripped);

            let (name, inline) = match stripped.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (stripped, None),
            };

            let value = match inline {
                Some(value) => value,
                None => {
                    i += 1;
                    args.get(i)
                        .cloned()
                        .ok_or_else(|| ArgsError::MissingValue(name.to_string()))?
                }
            };

            match name {
                "ip" => flags.ip = value,
                "port" => {
                    flags.port = value.parse().map_err(|e: std::num::ParseIntError| {
                        ArgsError::InvalidPort {
                            value: value.clone(),
                            reason: e.to_string(),
                        }
                    })?
                }
                other => return Err(ArgsError::UnknownFlag(other.to_string())),
            }
            i += 1;
        }

        Ok((flags, args[i..].to_vec()))
    }
}

pub fn usage() -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Statup v{} - Statup.io", VERSION);
    text.push_str("A simple Application Status Monitor that is opensource and lightweight.\n");
    text.push_str("Commands:\n");
    for (command, about) in [
        ("statup", "Main command to run Statup server"),
        ("statup version", "Returns the current version of Statup"),
        ("statup run", "Check all services 1 time and then quit"),
        ("statup test plugins", "Test all plugins for required information"),
        ("statup assets", "Dump all assets used locally to be edited."),
        ("statup sass", "Compile .scss files into the css directory"),
        ("statup env", "Show all environment variables being used for Statup"),
        ("statup export", "Exports the index page as a static HTML for pushing"),
        ("statup update", "Attempts to update to the latest version"),
        ("statup help", "Shows the user basic information about Statup"),
    ] {
        let _ = writeln!(text, "     {:<26}- {}", command, about);
    }
    text.push_str("Flags:\n");
    let _ = writeln!(
        text,
        "     {:<26}- Run HTTP server on specific IP address (default: {})",
        "-ip 127.0.0.1", DEFAULT_IP
    );
    let _ = writeln!(
        text,
        "     {:<26}- Run HTTP server on Port (default: {})",
        "-port 8080", DEFAULT_PORT
    );
    text.push_str("Give Statup a Star at https://github.com/hunterlong/statup\n");
    text
}
