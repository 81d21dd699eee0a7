//! Object storage for finished videos.
//!
//! Uploads go to any S3-compatible endpoint that accepts unsigned
//! `PUT {endpoint}/{bucket}/{key}` writes (MinIO, LocalStack, or a bucket
//! policy that allows the service role). Keeping the client this small
//! avoids pulling a full AWS SDK in for a single verb.

use crate::error::LectureError;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Client for one bucket on an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl ObjectStore {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Result<Self, LectureError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LectureError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        })
    }

    /// Object URL for a key.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// Upload a local file under `key`, returning its public URL.
    pub async fn upload_file(&self, path: &Path, key: &str) -> Result<String, LectureError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LectureError::io(path, e))?;
        if bytes.is_empty() {
            return Err(LectureError::EmptyArtifact {
                path: path.to_path_buf(),
            });
        }
        let size = bytes.len();

        let url = self.url_for(key);
        let response = self
            .http
            .put(&url)
            .header("content-type", "video/mp4")
            .body(bytes)
            .send()
            .await
            .map_err(|e| LectureError::UploadFailed {
                detail: format!("{e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LectureError::UploadFailed {
                detail: format!("{status} for {url}: {body}"),
            });
        }

        info!("store: uploaded {size} bytes to {url}");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let store = ObjectStore::new("http://minio:9000/", "videos").unwrap();
        assert_eq!(
            store.url_for("class/abc.mp4"),
            "http://minio:9000/videos/class/abc.mp4"
        );
    }

    #[tokio::test]
    async fn empty_file_is_refused_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty.mp4");
        std::fs::write(&p, b"").unwrap();
        let store = ObjectStore::new("http://127.0.0.1:1", "videos").unwrap();
        assert!(matches!(
            store.upload_file(&p, "class/x.mp4").await,
            Err(LectureError::EmptyArtifact { .. })
        ));
    }
}
