//! HTTPS fetch engine
//!
//! One [`Fetcher`] wraps one configured [`reqwest::Client`] and is shared by
//! everything that downloads: catalog refreshes, package installs, the
//! optional font. A transfer accumulates body chunks into a
//! [`ChunkBuffer`](crate::buffer::ChunkBuffer) owned by the call, then either
//! hands the payload back or persists it to a destination path.
//!
//! Policy is single-attempt: a failed transfer is reported, never retried.
//! Redirects are followed up to the configured hop limit and TLS certificate
//! verification is on unless the config explicitly opts out.

use crate::buffer::ChunkBuffer;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Progress callback invoked after each received chunk
///
/// Arguments are the bytes received so far and the total advertised by
/// `Content-Length`, if any.
pub type ProgressFn = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Per-download options
#[derive(Clone, Default)]
pub struct DownloadOptions {
    /// Expected SHA-256 digest of the payload, lowercase or uppercase hex.
    /// On mismatch the payload is discarded before anything touches disk.
    pub expected_sha256: Option<String>,

    /// Progress callback, called once per received chunk
    pub progress: Option<ProgressFn>,
}

impl std::fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("expected_sha256", &self.expected_sha256)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// HTTPS fetch engine shared across downloads
///
/// Cheap to clone; clones share the underlying connection pool. Each call
/// owns its accumulation buffer, so concurrent downloads are safe.
///
/// # Examples
///
/// ```no_run
/// use homebrew_dl::config::FetchConfig;
/// use homebrew_dl::fetch::{DownloadOptions, Fetcher};
///
/// # async fn example() -> homebrew_dl::Result<()> {
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// let bytes = fetcher
///     .download_to_file(
///         "https://example.com/stores/universal-db.unistore",
///         std::path::Path::new("stores/universal-db.unistore"),
///         &DownloadOptions::default(),
///     )
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Build a fetcher from the given fetch configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the underlying HTTP client cannot be
    /// constructed (e.g., no TLS backend available).
    pub fn new(config: FetchConfig) -> Result<Self> {
        if config.danger_accept_invalid_certs {
            tracing::warn!("TLS certificate verification is DISABLED by configuration");
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.danger_accept_invalid_certs)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
                key: Some("fetch".to_string()),
            })?;

        Ok(Self { client, config })
    }

    /// The fetch configuration this fetcher was built from
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch the full contents of a URL and write them to `destination`
    ///
    /// The destination is opened in binary mode and overwritten if it exists.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] for transport failures (DNS, connect, TLS,
    ///   timeout, mid-body disconnect),
    /// - [`Error::HttpStatus`] when the server answers with a non-2xx status,
    /// - [`Error::InsufficientSpace`] / [`Error::DiskSpaceCheckFailed`] when
    ///   the free-space precheck is enabled and fails,
    /// - [`Error::ChecksumMismatch`] when `expected_sha256` is set and does
    ///   not match (nothing is written in that case),
    /// - [`Error::Destination`] when the destination cannot be created or
    ///   written. The payload is discarded, but the failure is the caller's
    ///   to see.
    pub async fn download_to_file(
        &self,
        url: &str,
        destination: &Path,
        options: &DownloadOptions,
    ) -> Result<u64> {
        let payload = self.fetch(url, options, Some(destination)).await?;
        let bytes = payload.len() as u64;

        tokio::fs::write(destination, &payload)
            .await
            .map_err(|source| Error::Destination {
                path: destination.to_path_buf(),
                source,
            })?;

        tracing::info!(url, path = %destination.display(), bytes, "download complete");
        Ok(bytes)
    }

    /// Fetch the full contents of a URL into memory
    ///
    /// Same transfer semantics as [`download_to_file`](Self::download_to_file)
    /// without the persistence step; used when the payload is parsed rather
    /// than installed (catalog refresh).
    pub async fn download_to_memory(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<Vec<u8>> {
        self.fetch(url, options, None).await
    }

    /// Perform the transfer and return the accumulated payload
    ///
    /// The accumulation buffer lives on this call's stack frame: every exit
    /// path, success or failure, releases it.
    async fn fetch(
        &self,
        url: &str,
        options: &DownloadOptions,
        destination: Option<&Path>,
    ) -> Result<Vec<u8>> {
        tracing::debug!(url, "starting transfer");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "transfer refused by server");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total = response.content_length();
        if let Some(dest) = destination
            && self.config.check_free_space
            && let Some(required) = total
        {
            self.ensure_free_space(dest, required)?;
        }

        let mut buffer = ChunkBuffer::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.append(&chunk);
            if let Some(progress) = &options.progress {
                progress(buffer.len() as u64, total);
            }
        }

        let payload = buffer.take();
        tracing::debug!(url, bytes = payload.len(), "transfer complete");

        if let Some(expected) = &options.expected_sha256 {
            let digest = Sha256::digest(&payload);
            let actual: String = digest.iter().map(|b| format!("{b:02x}")).collect();
            if !actual.eq_ignore_ascii_case(expected) {
                tracing::warn!(url, expected, actual, "payload failed checksum verification");
                return Err(Error::ChecksumMismatch {
                    expected: expected.to_lowercase(),
                    actual,
                });
            }
        }

        Ok(payload)
    }

    /// Verify the destination filesystem has room for `required` bytes
    fn ensure_free_space(&self, destination: &Path, required: u64) -> Result<()> {
        let dir = destination.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.unwrap_or_else(|| Path::new("."));

        let available = crate::utils::get_available_space(dir)
            .map_err(|e| Error::DiskSpaceCheckFailed(e.to_string()))?;

        if available < required {
            return Err(Error::InsufficientSpace {
                required,
                available,
            });
        }
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(FetchConfig::default()).expect("default client must build")
    }

    #[tokio::test]
    async fn download_to_memory_returns_payload_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payload.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"store payload".to_vec()))
            .mount(&server)
            .await;

        let bytes = fetcher()
            .download_to_memory(
                &format!("{}/payload.bin", server.uri()),
                &DownloadOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(bytes, b"store payload");
    }

    #[tokio::test]
    async fn requests_carry_the_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", "custom-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(FetchConfig {
            user_agent: "custom-agent/1.0".to_string(),
            ..FetchConfig::default()
        })
        .unwrap();

        // The mock only matches when the user-agent header is present.
        let bytes = fetcher
            .download_to_memory(&format!("{}/ua", server.uri()), &DownloadOptions::default())
            .await
            .unwrap();
        assert_eq!(bytes, b"ok");
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .download_to_memory(
                &format!("{}/missing", server.uri()),
                &DownloadOptions::default(),
            )
            .await
            .unwrap_err();

        match err {
            Error::HttpStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/missing"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network_error() {
        // Nothing listens on this port.
        let err = fetcher()
            .download_to_memory("http://127.0.0.1:9/void", &DownloadOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn progress_callback_sees_monotonic_counts_and_total() {
        let server = MockServer::start().await;
        let body = vec![7u8; 10_000];
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let seen: Arc<Mutex<Vec<(u64, Option<u64>)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let options = DownloadOptions {
            progress: Some(Arc::new(move |received, total| {
                seen_cb.lock().unwrap().push((received, total));
            })),
            ..DownloadOptions::default()
        };

        let bytes = fetcher()
            .download_to_memory(&format!("{}/big", server.uri()), &options)
            .await
            .unwrap();
        assert_eq!(bytes.len(), 10_000);

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty(), "progress must be reported at least once");
        assert!(
            seen.windows(2).all(|w| w[0].0 <= w[1].0),
            "received counts must be monotonic"
        );
        let (last_received, last_total) = *seen.last().unwrap();
        assert_eq!(last_received, 10_000);
        assert_eq!(last_total, Some(10_000));
    }

    #[tokio::test]
    async fn matching_checksum_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sum"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        // SHA-256 of "abc"
        let options = DownloadOptions {
            expected_sha256: Some(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string(),
            ),
            ..DownloadOptions::default()
        };

        let bytes = fetcher()
            .download_to_memory(&format!("{}/sum", server.uri()), &options)
            .await
            .unwrap();
        assert_eq!(bytes, b"abc");
    }

    #[tokio::test]
    async fn uppercase_expected_checksum_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sum"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let options = DownloadOptions {
            expected_sha256: Some(
                "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD".to_string(),
            ),
            ..DownloadOptions::default()
        };

        assert!(
            fetcher()
                .download_to_memory(&format!("{}/sum", server.uri()), &options)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn checksum_mismatch_discards_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sum"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tampered".to_vec()))
            .mount(&server)
            .await;

        let options = DownloadOptions {
            expected_sha256: Some("00".repeat(32)),
            ..DownloadOptions::default()
        };

        let err = fetcher()
            .download_to_memory(&format!("{}/sum", server.uri()), &options)
            .await
            .unwrap_err();

        match err {
            Error::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, "00".repeat(32));
                assert_eq!(actual.len(), 64, "actual digest must be hex-encoded SHA-256");
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn download_options_debug_does_not_require_callback_debug() {
        let options = DownloadOptions {
            expected_sha256: None,
            progress: Some(Arc::new(|_, _| {})),
        };
        let rendered = format!("{options:?}");
        assert!(rendered.contains("callback"));
    }
}
