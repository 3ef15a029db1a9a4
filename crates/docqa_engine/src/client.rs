use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    ClientError, DocumentRecord, FailureKind, HealthReply, QueryReply, QueryRequest,
};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves a stalled request pending until the network layer gives up.
    pub request_timeout: Option<Duration>,
    pub top_k: u32,
    pub max_download_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            top_k: 5,
            max_download_bytes: 100 * 1024 * 1024,
        }
    }
}

/// The remote document store and answering service.
#[async_trait::async_trait]
pub trait ServiceClient: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError>;

    async fn upload(&self, path: &Path) -> Result<(), ClientError>;

    async fn query(&self, query: &str) -> Result<QueryReply, ClientError>;

    async fn delete_document(&self, document_id: &str) -> Result<(), ClientError>;

    /// Raw bytes of an uploaded source file.
    async fn fetch_source(&self, source_file: &str) -> Result<Vec<u8>, ClientError>;

    async fn health(&self) -> Result<HealthReply, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestServiceClient {
    settings: ClientSettings,
    base: Url,
    http: reqwest::Client,
}

impl ReqwestServiceClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot carry a path", settings.base_url),
            ));
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            http,
        })
    }

    /// Builds `{base}/{segments...}`. An empty last segment yields a trailing slash,
    /// which the collection endpoints expect.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::MalformedResponse, err.to_string()))
    }
}

#[async_trait::async_trait]
impl ServiceClient for ReqwestServiceClient {
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, ClientError> {
        let url = self.endpoint(&["documents", ""]);
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }

    async fn upload(&self, path: &Path) -> Result<(), ClientError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::new(FailureKind::Io, format!("{} has no file name", path.display()))
            })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;

        let part = Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str(guess_content_type(&filename))
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(&["upload", ""]);
        self.send(self.http.post(url).multipart(form)).await?;
        Ok(())
    }

    async fn query(&self, query: &str) -> Result<QueryReply, ClientError> {
        let body = serde_json::to_vec(&QueryRequest {
            query,
            top_k: self.settings.top_k,
        })
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;

        let url = self.endpoint(&["query", ""]);
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["documents", document_id]);
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn fetch_source(&self, source_file: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(&["uploads", source_file]);
        let response = self.send(self.http.get(url)).await?;
        let max_bytes = self.settings.max_download_bytes;

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "source file too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ClientError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "source file too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn health(&self) -> Result<HealthReply, ClientError> {
        let url = self.endpoint(&["health"]);
        let response = self.send(self.http.get(url)).await?;
        Self::read_json(response).await
    }
}

/// MIME type sent with an upload. The service routes `audio/*` to transcription.
pub fn guess_content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
