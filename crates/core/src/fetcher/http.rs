//! HTTP(S) fetcher implementation.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::metrics::{FETCH_BYTES, FETCH_DURATION};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::{FetchedFile, Fetcher};

/// Streams remote files to disk with `reqwest`.
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("faceswap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }
}

/// A download in progress. The file is removed on drop unless committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn for_destination(destination: &Path) -> Self {
        let mut name = OsString::from(destination.as_os_str());
        name.push(".part");
        Self {
            path: PathBuf::from(name),
            committed: false,
        }
    }

    /// Atomically moves the finished download into place.
    async fn commit(mut self, destination: &Path) -> Result<(), FetchError> {
        tokio::fs::rename(&self.path, destination)
            .await
            .map_err(|e| FetchError::io(destination, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove partial download");
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &Url, destination: &Path) -> Result<FetchedFile, FetchError> {
        let start = Instant::now();
        debug!(url = %url, destination = %destination.display(), "Fetching remote file");

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let partial = PartialFile::for_destination(destination);
        let file = File::create(&partial.path)
            .await
            .map_err(|e| FetchError::io(&partial.path, e))?;
        let mut writer = BufWriter::with_capacity(self.config.buffer_size, file);

        let mut total_bytes = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::transport(url, &e))?
        {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(&partial.path, e))?;
            total_bytes += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| FetchError::io(&partial.path, e))?;
        drop(writer);

        partial.commit(destination).await?;

        FETCH_BYTES.inc_by(total_bytes);
        FETCH_DURATION.observe(start.elapsed().as_secs_f64());
        debug!(
            url = %url,
            bytes = total_bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched remote file"
        );

        Ok(FetchedFile {
            path: destination.to_path_buf(),
            bytes: total_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn parse(url: String) -> Url {
        Url::parse(&url).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/a.jpg");
            then.status(200).body("jpeg-bytes");
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.jpg");
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let fetched = fetcher.fetch(&parse(server.url("/a.jpg")), &dest).await.unwrap();

        mock.assert();
        assert_eq!(fetched.bytes, 10);
        assert_eq!(fetched.path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg-bytes");
        assert!(!dir.path().join("source.jpg.part").exists());
    }

    #[tokio::test]
    async fn test_non_success_status_leaves_no_file() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/missing.jpg");
            then.status(404).body("not found");
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("target.jpg");
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let err = fetcher
            .fetch(&parse(server.url("/missing.jpg")), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_destination() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/broken.jpg");
            then.status(500);
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("target.jpg");
        std::fs::write(&dest, b"previous").unwrap();
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let result = fetcher.fetch(&parse(server.url("/broken.jpg")), &dest).await;

        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
        assert_eq!(std::fs::read(&dest).unwrap(), b"previous");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.jpg");
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let url = parse(format!("http://127.0.0.1:{}/a.jpg", port));
        let result = fetcher.fetch(&url, &dest).await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_truncated_body_leaves_no_file() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Advertise more bytes than are sent, then hang up
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nfirst-bytes")
                .await
                .unwrap();
            socket.flush().await.unwrap();
        });

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("target.mp4");
        let fetcher = HttpFetcher::with_defaults().unwrap();

        let url = parse(format!("http://127.0.0.1:{}/clip.mp4", port));
        let result = fetcher.fetch(&url, &dest).await;
        server.await.unwrap();

        assert!(matches!(result, Err(FetchError::Transport { .. })));
        assert!(!dest.exists());
        assert!(!dir.path().join("target.mp4.part").exists());
    }

    #[test]
    fn test_partial_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("video.mp4");
        let partial = PartialFile::for_destination(&dest);
        assert_eq!(partial.path, dir.path().join("video.mp4.part"));

        std::fs::write(&partial.path, b"half").unwrap();
        let path = partial.path.clone();
        drop(partial);
        assert!(!path.exists());
    }
}
