use crate::error::{LapsecamError, Result};
use crate::registry::CameraDescriptor;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// One frame as returned by a camera's capture endpoint.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw JPEG payload
    pub data: Vec<u8>,
}

impl CapturedFrame {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Source of still frames, one camera at a time.
///
/// The production implementation talks HTTP; tests substitute stubs.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Fetch a single frame for `camera`. One attempt per call, no retries;
    /// the next scheduled pass is the next opportunity to succeed.
    async fn fetch(&self, camera: &CameraDescriptor) -> Result<CapturedFrame>;
}

/// Fetches frames over HTTP from each camera's capture endpoint.
pub struct HttpFrameFetcher {
    client: Client,
}

impl HttpFrameFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    ///
    /// Redirects are not followed, so a redirect status surfaces as a
    /// non-200 failure for the camera that produced it.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| LapsecamError::system(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn capture_url(camera: &CameraDescriptor) -> String {
        format!("http://{}/capture", camera.address)
    }
}

#[async_trait]
impl FrameSource for HttpFrameFetcher {
    async fn fetch(&self, camera: &CameraDescriptor) -> Result<CapturedFrame> {
        let url = Self::capture_url(camera);
        debug!("Requesting frame from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LapsecamError::fetch(&camera.name, e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(LapsecamError::fetch(
                &camera.name,
                format!("unexpected status code: {}", response.status()),
            ));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| LapsecamError::fetch(&camera.name, e.to_string()))?;

        Ok(CapturedFrame {
            data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn camera(address: &str) -> CameraDescriptor {
        CameraDescriptor {
            name: "LEFT".to_string(),
            address: address.to_string(),
            directory: PathBuf::from("img/left"),
        }
    }

    /// Serve a single canned HTTP response, then close the connection.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;

            let header = format!(
                "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
        });

        address
    }

    #[test]
    fn capture_url_uses_fixed_scheme_and_path() {
        let url = HttpFrameFetcher::capture_url(&camera("192.168.0.184"));
        assert_eq!(url, "http://192.168.0.184/capture");
    }

    #[tokio::test]
    async fn fetch_returns_payload_on_200() {
        let address = serve_once("HTTP/1.1 200 OK", b"jpegdata").await;
        let fetcher = HttpFrameFetcher::new(Duration::from_secs(10)).unwrap();

        let frame = fetcher.fetch(&camera(&address)).await.unwrap();

        assert_eq!(frame.data, b"jpegdata");
        assert_eq!(frame.len(), 8);
    }

    #[tokio::test]
    async fn fetch_fails_on_non_200_status() {
        let address = serve_once("HTTP/1.1 404 Not Found", b"").await;
        let fetcher = HttpFrameFetcher::new(Duration::from_secs(10)).unwrap();

        let err = fetcher.fetch(&camera(&address)).await.unwrap_err();

        match err {
            LapsecamError::Fetch { camera, reason } => {
                assert_eq!(camera, "LEFT");
                assert!(reason.contains("404"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_fails_on_connection_error() {
        // Nothing is listening on this address
        let fetcher = HttpFrameFetcher::new(Duration::from_secs(1)).unwrap();

        let err = fetcher.fetch(&camera("127.0.0.1:1")).await.unwrap_err();

        assert!(matches!(err, LapsecamError::Fetch { .. }));
    }
}
