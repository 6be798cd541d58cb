//! HTTP calls against the resizer API and the storage URLs it hands out.

use crate::config::ClientConfig;
use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{header, Client, StatusCode};
use resizer_core::models::UploadUrlResponse;
use resizer_core::{Dimensions, ObjectKey};
use std::fmt;

/// A call that did not produce a usable response.
#[derive(Debug)]
pub enum HttpFailure {
    /// Connection, DNS, timeout or body read failure
    Transport(reqwest::Error),
    /// Non-success status; `body` is the response text, possibly empty
    Status { status: StatusCode, body: String },
    /// Success status with a body we cannot use
    InvalidResponse(String),
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpFailure::Transport(e) => write!(f, "{}", e),
            HttpFailure::Status { status, body } if body.trim().is_empty() => {
                write!(f, "HTTP {}", status)
            }
            HttpFailure::Status { body, .. } => write!(f, "{}", body.trim()),
            HttpFailure::InvalidResponse(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for HttpFailure {}

impl From<reqwest::Error> for HttpFailure {
    fn from(err: reqwest::Error) -> Self {
        HttpFailure::Transport(err)
    }
}

/// HTTP client for the resizer API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /upload-url?key=`
    pub async fn request_upload_url(&self, key: &ObjectKey) -> Result<String, HttpFailure> {
        let url = format!("{}/upload-url?key={}", self.base_url, key.escaped());
        let response = self.client.get(&url).send().await?;
        let body = success_text(response).await?;

        let parsed: UploadUrlResponse = serde_json::from_str(&body).map_err(|_| {
            HttpFailure::InvalidResponse("No upload URL returned from server".to_string())
        })?;
        if parsed.upload_url.trim().is_empty() {
            return Err(HttpFailure::InvalidResponse(
                "No upload URL returned from server".to_string(),
            ));
        }

        Ok(parsed.upload_url)
    }

    /// Single whole-body `PUT` to a presigned URL.
    pub async fn upload(
        &self,
        upload_url: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<(), HttpFailure> {
        let response = self
            .client
            .put(upload_url)
            .header(header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;
        success_text(response).await?;
        Ok(())
    }

    /// `GET /resize?key=&width=&height=`, returning the public URL of the
    /// resized object.
    pub async fn resize(
        &self,
        key: &ObjectKey,
        dimensions: Dimensions,
    ) -> Result<String, HttpFailure> {
        let url = format!(
            "{}/resize?key={}&width={}&height={}",
            self.base_url,
            key.escaped(),
            dimensions.width,
            dimensions.height
        );
        let response = self.client.get(&url).send().await?;
        let body = success_text(response).await?;

        let location = body.trim();
        if location.is_empty() {
            return Err(HttpFailure::InvalidResponse(
                "Server returned an empty result URL".to_string(),
            ));
        }
        Ok(location.to_string())
    }

    /// `GET` an absolute URL, returning the body and its declared content type.
    pub async fn fetch(&self, url: &str) -> Result<(Bytes, Option<String>), HttpFailure> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HttpFailure::Status { status, body });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        Ok((bytes, content_type))
    }
}

async fn success_text(response: reqwest::Response) -> Result<String, HttpFailure> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpFailure::Status { status, body });
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_failure_shows_body_or_status() {
        let with_body = HttpFailure::Status {
            status: StatusCode::FORBIDDEN,
            body: "  Access Denied\n".to_string(),
        };
        assert_eq!(with_body.to_string(), "Access Denied");

        let empty = HttpFailure::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert_eq!(empty.to_string(), "HTTP 502 Bad Gateway");
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = ApiClient::new(&ClientConfig::new("http://localhost:4000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4000");
    }
}
