//! HTTP transport to the Video Hunter backend.
//!
//! `DownloadApi` is the seam the App talks through; `HttpDownloadApi` is the
//! reqwest implementation used by the binary. Every call maps a non-2xx
//! answer to `TransportError::Http` so callers can show the status line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::types::errors::TransportError;
use crate::types::job::Job;
use crate::types::video_info::VideoInfo;

/// Operations the client needs from the backend.
#[async_trait]
pub trait DownloadApi: Send + Sync {
    /// `POST /api/download`
    async fn create_job(&self, url: &str, format: &str) -> Result<Job, TransportError>;
    /// `GET /api/downloads`
    async fn list_jobs(&self) -> Result<Vec<Job>, TransportError>;
    /// `POST /api/downloads/{id}/cancel`
    async fn cancel_job(&self, id: &str) -> Result<(), TransportError>;
    /// `POST /api/downloads/clear`, returning the server's message (may be empty).
    async fn clear_all_jobs(&self) -> Result<String, TransportError>;
    /// `GET /api/video-info?url=...`
    async fn fetch_video_info(&self, url: &str) -> Result<VideoInfo, TransportError>;
    /// `GET /api/downloads/{id}/download`, streamed into `dest_dir`.
    async fn fetch_file(&self, id: &str, dest_dir: &Path) -> Result<PathBuf, TransportError>;
}

#[derive(Debug, Serialize)]
struct CreateJobRequest<'a> {
    url: &'a str,
    format: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

/// Upper bound for establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for a JSON call, body included. File fetches only get the
/// connect bound since a large file may legitimately take longer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed `DownloadApi`.
#[derive(Debug, Clone)]
pub struct HttpDownloadApi {
    base: Url,
    client: Client,
    request_timeout: Duration,
}

impl HttpDownloadApi {
    pub fn new(base: Url) -> Result<Self, TransportError> {
        Self::with_timeout(base, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base: Url, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            base,
            client,
            request_timeout,
        })
    }

    /// Joins `path` onto the base URL, keeping any path prefix the base has.
    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Network(format!("bad endpoint {}: {}", path, e)))
    }
}

/// Turns a non-2xx response into `TransportError::Http`.
fn check_status(resp: Response) -> Result<Response, TransportError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(TransportError::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
    })
}

/// Extracts a safe file name from a `Content-Disposition` header value.
///
/// Accepts quoted and bare `filename=` values and strips any directory part.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let raw = value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?;
    let unquoted = raw.trim().trim_matches('"');
    let name = Path::new(unquoted).file_name()?.to_string_lossy().to_string();
    if name.is_empty() || name == ".." {
        return None;
    }
    Some(name)
}

#[async_trait]
impl DownloadApi for HttpDownloadApi {
    async fn create_job(&self, url: &str, format: &str) -> Result<Job, TransportError> {
        let endpoint = self.endpoint("api/download")?;
        let resp = self
            .client
            .post(endpoint)
            .timeout(self.request_timeout)
            .json(&CreateJobRequest { url, format })
            .send()
            .await?;
        let job: Job = check_status(resp)?.json().await?;
        info!(id = %job.id, "download job created");
        Ok(job)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, TransportError> {
        let endpoint = self.endpoint("api/downloads")?;
        let resp = self
            .client
            .get(endpoint)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let jobs: Option<Vec<Job>> = check_status(resp)?.json().await?;
        // the backend answers `null` when it has no jobs
        Ok(jobs.unwrap_or_default())
    }

    async fn cancel_job(&self, id: &str) -> Result<(), TransportError> {
        let endpoint = self.endpoint(&format!("api/downloads/{}/cancel", id))?;
        let resp = self
            .client
            .post(endpoint)
            .timeout(self.request_timeout)
            .send()
            .await?;
        check_status(resp)?;
        Ok(())
    }

    async fn clear_all_jobs(&self) -> Result<String, TransportError> {
        let endpoint = self.endpoint("api/downloads/clear")?;
        let resp = self
            .client
            .post(endpoint)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let body = check_status(resp)?.text().await?;
        let parsed: MessageResponse = serde_json::from_str(&body).unwrap_or_default();
        Ok(parsed.message)
    }

    async fn fetch_video_info(&self, url: &str) -> Result<VideoInfo, TransportError> {
        let mut endpoint = self.endpoint("api/video-info")?;
        endpoint.query_pairs_mut().append_pair("url", url);
        let resp = self
            .client
            .get(endpoint)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let value: serde_json::Value = check_status(resp)?.json().await?;
        VideoInfo::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn fetch_file(&self, id: &str, dest_dir: &Path) -> Result<PathBuf, TransportError> {
        let endpoint = self.endpoint(&format!("api/downloads/{}/download", id))?;
        let resp = check_status(self.client.get(endpoint).send().await?)?;

        let name = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| id.to_string());

        tokio::fs::create_dir_all(dest_dir).await?;
        let target = dest_dir.join(name);
        let mut file = tokio::fs::File::create(&target).await?;

        let mut written: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(id, bytes = written, path = %target.display(), "file fetched");
        Ok(target)
    }
}
