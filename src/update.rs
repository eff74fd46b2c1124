use std::cmp::Ordering;
use std::fmt;

use semver::Version;
use thiserror::Error;

use crate::release::ReleaseDescriptor;
use crate::VERSION;

pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/hunterlong/statup/releases/latest";

/// Where operators are sent to fetch a release.
pub const DOWNLOAD_PAGE: &str = "https://github.com/hunterlong/statup";

/// Overrides [`LATEST_RELEASE_URL`] when set.
pub const RELEASES_URL_ENV: &str = "STATUP_RELEASES_URL";

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("could not reach the release server: {0}")]
    Network(#[source] reqwest::Error),
    #[error("release server answered with HTTP {0}")]
    Status(u16),
    #[error("release descriptor could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct UpdateChecker {
    endpoint: String,
}

impl UpdateChecker {
    pub fn new() -> Self {
        Self::with_endpoint(LATEST_RELEASE_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Honour `STATUP_RELEASES_URL`, otherwise the upstream GitHub endpoint.
    pub fn from_env() -> Self {
        match std::env::var(RELEASES_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_endpoint(url.trim()),
            _ => Self::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch and decode the latest published release.
    ///
    /// One blocking GET, no retry. A non-success status is an error of its own so
    /// that an API error body is never mistaken for a release.
    pub fn check_latest_release(&self) -> Result<ReleaseDescriptor, UpdateError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("statup/{}", VERSION))
            .build()
            .map_err(UpdateError::Network)?;

        let response = client
            .get(&self.endpoint)
            .send()
            .map_err(UpdateError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Status(status.as_u16()));
        }

        let body = response.text().map_err(UpdateError::Network)?;
        decode_release(&body)
    }
}

impl Default for UpdateChecker {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode_release(body: &str) -> Result<ReleaseDescriptor, UpdateError> {
    Ok(serde_json::from_str(body)?)
}

/// Drop exactly one leading `v` from a release tag.
pub fn strip_tag_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Newer,
    Older,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    UpToDate {
        current: String,
    },
    Different {
        current: String,
        latest: String, // tag without the "v"
        direction: Direction,
    },
}

/// Compare the running version against a release tag.
///
/// Equality of the strings is the only thing that decides "up to date", and
/// the printed report is the same whichever way the versions differ. The
/// semver direction is only logged; it is `Unknown` when either side does not
/// parse.
pub fn compare_version(current: &str, tag: &str) -> VersionStatus {
    let latest = strip_tag_prefix(tag);
    if current == latest {
        return VersionStatus::UpToDate {
            current: current.to_string(),
        };
    }

    let direction = match (Version::parse(current), Version::parse(latest)) {
        (Ok(current), Ok(latest)) => match latest.cmp_precedence(&current) {
            Ordering::Greater => Direction::Newer,
            Ordering::Less => Direction::Older,
            // Build metadata differs but precedence is equal.
            Ordering::Equal => Direction::Unknown,
        },
        _ => Direction::Unknown,
    };

    VersionStatus::Different {
        current: current.to_string(),
        latest: latest.to_string(),
        direction,
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionStatus::UpToDate { .. } => {
                writeln!(f, "You have the latest version of Statup!")
            }
            VersionStatus::Different { latest, .. } => {
                writeln!(f, "You don't have the latest version v{}!", latest)?;
                writeln!(f, "Download the latest release at: {}", DOWNLOAD_PAGE)
            }
        }
    }
}
