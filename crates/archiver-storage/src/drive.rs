use crate::traits::{ContentReader, FileMetadata, RemoteFolder, RemoteStore, StoreError, StoreResult};
use crate::RemoteBackend;
use archiver_core::AccessRole;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_util::io::ReaderStream;

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const MULTIPART_BOUNDARY: &str = "archiver_multipart_boundary_7c1f";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFolder>,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Google Drive v3 remote store
///
/// Authentication happens elsewhere: the store is handed a ready bearer token.
#[derive(Clone)]
pub struct DriveStore {
    http_client: reqwest::Client,
    access_token: String,
    api_base_url: String,
    upload_base_url: String,
}

impl std::fmt::Debug for DriveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveStore")
            .field("api_base_url", &self.api_base_url)
            .field("upload_base_url", &self.upload_base_url)
            .finish()
    }
}

impl DriveStore {
    /// Create a new DriveStore
    ///
    /// # Arguments
    /// * `access_token` - OAuth bearer token with the `drive.file` scope
    /// * `api_base_url` - e.g. "https://www.googleapis.com/drive/v3"
    /// * `upload_base_url` - e.g. "https://www.googleapis.com/upload/drive/v3"
    pub fn new(
        access_token: String,
        api_base_url: String,
        upload_base_url: String,
    ) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn created_id(response: reqwest::Response) -> StoreResult<String> {
        let created: CreatedObject = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::InvalidResponse("response carried no id".to_string()))
    }
}

/// Quote a value for a Drive search query.
pub(crate) fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub(crate) fn folder_query(name: &str, parent_id: &str) -> String {
    format!(
        "name = '{}' and mimeType = '{}' and '{}' in parents and trashed = false",
        escape_query_value(name),
        FOLDER_MIME,
        escape_query_value(parent_id)
    )
}

/// Leading part of a `multipart/related` upload body, up to the file bytes.
pub(crate) fn multipart_preamble(metadata: &FileMetadata) -> String {
    let json_metadata = json!({
        "name": metadata.name,
        "parents": [metadata.parent_id],
        "mimeType": metadata.mime_type,
    });
    format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{json}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
        b = MULTIPART_BOUNDARY,
        json = json_metadata,
        mime = metadata.mime_type,
    )
}

pub(crate) fn multipart_epilogue() -> String {
    format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY)
}

#[async_trait]
impl RemoteStore for DriveStore {
    async fn list_folders(&self, name: &str, parent_id: &str) -> StoreResult<Vec<RemoteFolder>> {
        let url = format!("{}/files", self.api_base_url);
        let query = folder_query(name, parent_id);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("spaces", "drive"),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let list: FileList = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        tracing::debug!(name = %name, parent_id = %parent_id, matches = list.files.len(), "Drive folder lookup");
        Ok(list.files)
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> StoreResult<String> {
        let url = format!("{}/files", self.api_base_url);
        let body = json!({
            "name": name,
            "mimeType": FOLDER_MIME,
            "parents": [parent_id],
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id")])
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let id = Self::created_id(Self::check(response).await?).await?;
        tracing::info!(folder_id = %id, name = %name, parent_id = %parent_id, "Drive folder created");
        Ok(id)
    }

    async fn create_file(
        &self,
        metadata: FileMetadata,
        content: ContentReader,
    ) -> StoreResult<String> {
        let url = format!("{}/files", self.upload_base_url);
        let start = std::time::Instant::now();

        let preamble = Bytes::from(multipart_preamble(&metadata));
        let epilogue = Bytes::from(multipart_epilogue());
        let body_stream = stream::once(async move { Ok::<_, std::io::Error>(preamble) })
            .chain(ReaderStream::new(content))
            .chain(stream::once(async move { Ok::<_, std::io::Error>(epilogue) }));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let id = Self::created_id(Self::check(response).await?).await?;

        tracing::info!(
            file_id = %id,
            name = %metadata.name,
            parent_id = %metadata.parent_id,
            size_bytes = ?metadata.content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Drive upload successful"
        );
        Ok(id)
    }

    async fn grant_access(
        &self,
        file_id: &str,
        identity: &str,
        role: AccessRole,
    ) -> StoreResult<()> {
        let url = format!(
            "{}/files/{}/permissions",
            self.api_base_url,
            urlencoding::encode(file_id)
        );
        let body = json!({
            "role": role.as_str(),
            "type": "user",
            "emailAddress": identity,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        Self::check(response).await?;
        Ok(())
    }

    fn backend_type(&self) -> RemoteBackend {
        RemoteBackend::Drive
    }
}
