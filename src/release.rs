//! Data shapes for the GitHub "latest release" response.
//!
//! Only `tag_name` is required. Everything else defaults when absent so a
//! trimmed-down mirror response still decodes, and unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDescriptor {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub id: u64,
    pub tag_name: String, // "v0.79.1"
    #[serde(default)]
    pub target_commitish: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<Account>,
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
    #[serde(default)]
    pub tarball_url: String,
    #[serde(default)]
    pub zipball_url: String,
    #[serde(default)]
    pub body: String,
}

/// A downloadable file attached to a release. Decoded, never acted on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssetDescriptor {
    pub url: String,
    pub id: u64,
    pub name: String,
    pub label: Option<String>,
    pub uploader: Option<Account>,
    pub content_type: String,
    pub state: String,
    pub size: u64,
    pub download_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub browser_download_url: String,
}

/// Release author or asset uploader.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    pub login: String,
    pub id: u64,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub site_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "url": "https://api.github.com/repos/hunterlong/statup/releases/1",
        "id": 12345,
        "tag_name": "v0.79.1",
        "name": "Statup v0.79.1",
        "draft": false,
        "prerelease": false,
        "published_at": "2018-10-01T12:00:00Z",
        "author": { "login": "hunterlong", "id": 7, "type": "User", "site_admin": false },
        "assets": [
            {
                "name": "statup-linux-x64.tar.gz",
                "size": 10485760,
                "download_count": 42,
                "content_type": "application/gzip",
                "browser_download_url": "https://github.com/hunterlong/statup/releases/download/v0.79.1/statup-linux-x64.tar.gz",
                "created_at": "2018-10-01T11:00:00Z",
                "updated_at": "2018-10-01T11:05:00Z",
                "uploader": { "login": "travis" }
            },
            { "name": "statup-osx-x64.tar.gz", "size": 9000000 }
        ],
        "reactions": { "+1": 3 }
    }"#;

    #[test]
    fn decodes_github_release() {
        let release: ReleaseDescriptor = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(release.tag_name, "v0.79.1");
        assert_eq!(release.id, 12345);
        assert_eq!(release.author.as_ref().unwrap().kind, "User");
        assert_eq!(
            release.published_at.unwrap().to_rfc3339(),
            "2018-10-01T12:00:00+00:00"
        );
    }

    #[test]
    fn assets_keep_order_and_default_missing_fields() {
        let release: ReleaseDescriptor = serde_json::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["statup-linux-x64.tar.gz", "statup-osx-x64.tar.gz"]);
        assert_eq!(release.assets[0].download_count, 42);
        assert_eq!(release.assets[0].uploader.as_ref().unwrap().login, "travis");
        assert_eq!(release.assets[1].download_count, 0);
        assert!(release.assets[1].updated_at.is_none());
    }

    #[test]
    fn missing_tag_name_is_rejected() {
        // GitHub's error body for an unknown repository.
        let body = r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#;
        assert!(serde_json::from_str::<ReleaseDescriptor>(body).is_err());
    }
}
