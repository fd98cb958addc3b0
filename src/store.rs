//! Catalog store handle
//!
//! A store file is a JSON document whose `storeInfo` object describes the
//! catalog: title, author, the URL it updates itself from, its own file name,
//! and a format version. Entry parsing and querying live in the frontend;
//! this module only opens the envelope, reports validity, and refreshes the
//! file in place from its recorded URL.
//!
//! Opening never fails: a missing, unparsable, or unsupported file yields an
//! invalid handle the frontend presents as "invalid store", matching how the
//! application tolerates a broken SD card at boot.

use crate::error::{Error, Result};
use crate::fetch::{DownloadOptions, Fetcher};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Store format versions this build can read
pub const SUPPORTED_VERSIONS: RangeInclusive<i64> = 3..=4;

/// The `storeInfo` object of a catalog store file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Store title shown in the top bar
    #[serde(default)]
    pub title: String,

    /// Store author
    #[serde(default)]
    pub author: String,

    /// URL the store updates itself from (empty = not refreshable)
    #[serde(default)]
    pub url: String,

    /// File name the store wants to be saved under
    #[serde(default)]
    pub file: String,

    /// Store format version
    #[serde(default)]
    pub version: i64,
}

/// JSON envelope of a store file; everything but `storeInfo` is opaque here
#[derive(Deserialize)]
struct StoreEnvelope {
    #[serde(rename = "storeInfo")]
    store_info: Option<StoreInfo>,
}

/// Handle to one catalog store file on storage
#[derive(Clone, Debug)]
pub struct CatalogStore {
    path: PathBuf,
    file_name: String,
    info: Option<StoreInfo>,
}

impl CatalogStore {
    /// Open the store file at `path`
    ///
    /// Never fails; inspect [`is_valid`](Self::is_valid) afterwards. A file
    /// that is missing, not JSON, missing its `storeInfo`, or of an
    /// unsupported version produces an invalid handle.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let info = Self::parse(&path).await;
        match &info {
            Some(info) => {
                tracing::info!(title = %info.title, path = %path.display(), "store opened");
            }
            None => {
                tracing::warn!(path = %path.display(), "store missing or invalid");
            }
        }

        Self {
            path,
            file_name,
            info,
        }
    }

    async fn parse(path: &Path) -> Option<StoreInfo> {
        let bytes = tokio::fs::read(path).await.ok()?;
        let envelope: StoreEnvelope = serde_json::from_slice(&bytes).ok()?;
        let info = envelope.store_info?;

        if !SUPPORTED_VERSIONS.contains(&info.version) {
            tracing::warn!(
                version = info.version,
                path = %path.display(),
                "store format version not supported"
            );
            return None;
        }
        Some(info)
    }

    /// Whether the handle points at a readable, supported store file
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.info.is_some()
    }

    /// Store title, if the store is valid
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.title.as_str())
    }

    /// The parsed `storeInfo`, if the store is valid
    #[must_use]
    pub fn info(&self) -> Option<&StoreInfo> {
        self.info.as_ref()
    }

    /// Path of the store file on storage
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the store path
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Re-download the store file from its recorded URL and re-parse it
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStore`] when the handle records no update URL or the
    /// refreshed file does not parse as a supported store; any fetch error
    /// from [`Fetcher::download_to_file`] otherwise. A failed fetch leaves
    /// the on-disk file and this handle unchanged.
    pub async fn refresh(&mut self, fetcher: &Fetcher) -> Result<()> {
        let url = self
            .info
            .as_ref()
            .map(|info| info.url.clone())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::InvalidStore("store records no update URL".to_string()))?;

        tracing::info!(url, path = %self.path.display(), "refreshing store");
        fetcher
            .download_to_file(&url, &self.path, &DownloadOptions::default())
            .await?;

        self.info = Self::parse(&self.path).await;
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidStore(format!(
                "refreshed file at {} is not a valid store",
                self.path.display()
            )))
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_json(title: &str, url: &str, version: i64) -> String {
        format!(
            r#"{{"storeInfo": {{"title": "{title}", "author": "someone", "url": "{url}", "file": "db.unistore", "version": {version}}}, "storeContent": []}}"#
        )
    }

    #[tokio::test]
    async fn open_valid_store_exposes_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.unistore");
        tokio::fs::write(&path, store_json("Universal-DB", "", 4))
            .await
            .unwrap();

        let store = CatalogStore::open(&path).await;
        assert!(store.is_valid());
        assert_eq!(store.title(), Some("Universal-DB"));
        assert_eq!(store.file_name(), "db.unistore");
        assert_eq!(store.info().unwrap().version, 4);
    }

    #[tokio::test]
    async fn open_missing_file_is_invalid_not_an_error() {
        let dir = TempDir::new().unwrap();
        let store = CatalogStore::open(dir.path().join("absent.unistore")).await;
        assert!(!store.is_valid());
        assert_eq!(store.title(), None);
    }

    #[tokio::test]
    async fn open_unparsable_file_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.unistore");
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let store = CatalogStore::open(&path).await;
        assert!(!store.is_valid());
    }

    #[tokio::test]
    async fn open_json_without_store_info_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.unistore");
        tokio::fs::write(&path, br#"{"storeContent": []}"#).await.unwrap();

        let store = CatalogStore::open(&path).await;
        assert!(!store.is_valid());
    }

    #[tokio::test]
    async fn unsupported_version_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.unistore");
        tokio::fs::write(&path, store_json("Old", "", 2)).await.unwrap();

        let store = CatalogStore::open(&path).await;
        assert!(!store.is_valid(), "version 2 predates the supported range");

        tokio::fs::write(&path, store_json("Future", "", 5)).await.unwrap();
        let store = CatalogStore::open(&path).await;
        assert!(!store.is_valid(), "version 5 is newer than this build understands");
    }

    #[tokio::test]
    async fn refresh_downloads_and_reparses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/db.unistore"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(store_json(
                    "Universal-DB v2",
                    "https://example.com/db.unistore",
                    4,
                )),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.unistore");
        let update_url = format!("{}/db.unistore", server.uri());
        tokio::fs::write(&path, store_json("Universal-DB", &update_url, 4))
            .await
            .unwrap();

        let mut store = CatalogStore::open(&path).await;
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        store.refresh(&fetcher).await.unwrap();

        assert_eq!(store.title(), Some("Universal-DB v2"));
    }

    #[tokio::test]
    async fn refresh_without_url_reports_invalid_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.unistore");
        tokio::fs::write(&path, store_json("Universal-DB", "", 4))
            .await
            .unwrap();

        let mut store = CatalogStore::open(&path).await;
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let err = store.refresh(&fetcher).await.unwrap_err();
        assert!(matches!(err, Error::InvalidStore(_)));
    }

    #[tokio::test]
    async fn failed_refresh_leaves_store_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/db.unistore"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.unistore");
        let update_url = format!("{}/db.unistore", server.uri());
        let original = store_json("Universal-DB", &update_url, 4);
        tokio::fs::write(&path, &original).await.unwrap();

        let mut store = CatalogStore::open(&path).await;
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let err = store.refresh(&fetcher).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 500, .. }));

        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(on_disk, original, "a failed fetch must not clobber the file");
        assert_eq!(store.title(), Some("Universal-DB"));
    }
}
