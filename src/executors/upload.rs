//! # Remote Upload Executor
//!
//! Carica i byte di un file sull'asset host remoto come form multipart e
//! restituisce l'URL pubblico contenuto nella risposta.
//!
//! ## Contratto con l'API:
//! POST multipart (`file`, `fileName`, `folder`) sull'endpoint configurato,
//! HTTP basic auth con la chiave privata come username. La cartella remota
//! è `<prefix>/<kind>` (image, gif, video). Una risposta non-2xx o un
//! errore di rete diventa `Upload`; una 2xx senza campo `url` nel body
//! diventa `InvalidResponse`.
//!
//! Il body viene sempre letto come testo prima del parsing JSON, così il
//! messaggio d'errore dell'API non va perso quando il JSON non è valido.

use crate::{
    config::{Config, UploadCredentials},
    discovery::WorkItem,
    error::PipelineError,
    runner::TaskExecutor,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const TIMEOUT_SECS: u64 = 120;

/// Pushes local files to the remote asset host
pub struct Uploader {
    client: reqwest::Client,
    endpoint: String,
    folder_prefix: String,
    credentials: UploadCredentials,
}

impl Uploader {
    pub fn new(config: &Config, credentials: UploadCredentials) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| PipelineError::Upload(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.upload_endpoint.clone(),
            folder_prefix: config.upload_folder_prefix.clone(),
            credentials,
        })
    }
}

#[async_trait]
impl TaskExecutor for Uploader {
    fn describe(&self) -> &'static str {
        "upload"
    }

    async fn execute(&self, item: &WorkItem) -> Result<String, PipelineError> {
        let file_name = item.file_name();
        let folder = format!("{}/{}", self.folder_prefix, item.kind.folder_name());

        debug!("Uploading {} to folder {}", item.path.display(), folder);

        let bytes = tokio::fs::read(&item.path).await?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("fileName", file_name.clone())
            .text("folder", folder);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.credentials.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Upload(format!("{}: {}", file_name, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Upload(format!("{}: {}", file_name, e)))?;

        if !status.is_success() {
            return Err(PipelineError::Upload(extract_error_message(status, &body)));
        }

        parse_uploaded_url(&body).ok_or_else(|| {
            PipelineError::InvalidResponse(format!("no url field in response for {}", file_name))
        })
    }
}

/// Pull the public URL out of a successful upload response
fn parse_uploaded_url(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

/// Build a readable message from an HTTP error response. Tries the common
/// shapes `{"error": {"message": ...}}` and `{"message": ...}` before
/// falling back to a bounded raw-body snippet.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), message);
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), message);
        }
    }

    let trimmed = body.trim();
    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {}...", status.as_u16(), snippet)
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uploaded_url() {
        let body = r#"{"fileId": "abc", "url": "https://cdn.example/x.webp"}"#;
        assert_eq!(
            parse_uploaded_url(body),
            Some("https://cdn.example/x.webp".to_string())
        );
    }

    #[test]
    fn test_parse_uploaded_url_missing_field() {
        assert_eq!(parse_uploaded_url(r#"{"fileId": "abc"}"#), None);
        assert_eq!(parse_uploaded_url("not json"), None);
        assert_eq!(parse_uploaded_url(r#"{"url": 42}"#), None);
    }

    #[test]
    fn test_extract_error_message_shapes() {
        let nested = r#"{"error": {"message": "bad key"}}"#;
        assert_eq!(
            extract_error_message(StatusCode::UNAUTHORIZED, nested),
            "HTTP 401: bad key"
        );

        let flat = r#"{"message": "quota exceeded"}"#;
        assert_eq!(
            extract_error_message(StatusCode::FORBIDDEN, flat),
            "HTTP 403: quota exceeded"
        );

        let raw = extract_error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(raw.starts_with("HTTP 502:"));
        assert!(raw.contains("oops"));
    }
}
