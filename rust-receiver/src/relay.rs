//! Outbound face-swap relay.
//!
//! Sends one multipart POST per call to the configured API and hands the
//! provider's answer back unchanged. No retries and no client-side timeout.

use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::info;

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Successful provider response.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, self.body).into_response();
        if let Some(value) = self
            .content_type
            .and_then(|ct| HeaderValue::from_str(&ct).ok())
        {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }
}

/// Local image read into memory for upload.
#[derive(Debug)]
struct LocalImage {
    file_name: String,
    bytes: Vec<u8>,
}

/// Client for the face-swap API.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    config: Arc<RelayConfig>,
}

impl RelayClient {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: RelayConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Send the configured input and target images to the face-swap API.
    ///
    /// Local files are read before the API key is checked, so a missing
    /// image is reported even when no key is configured. A missing key
    /// never reaches the network.
    pub async fn swap_face(&self) -> Result<RelayResponse, RelayError> {
        let input = read_image(&self.config.input_image).await?;
        let target = read_image(&self.config.target_image).await?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(RelayError::MissingCredential)?;

        let form = Form::new()
            .text("webhook", self.config.webhook_url.clone())
            .text("id_gen", self.config.id_gen.clone())
            .text("type", self.config.type_tag.clone())
            .part("input_image", Part::bytes(input.bytes).file_name(input.file_name))
            .part("target_image", Part::bytes(target.bytes).file_name(target.file_name));

        info!(
            api_url = %self.config.api_url,
            id_gen = %self.config.id_gen,
            type_tag = %self.config.type_tag,
            "relay_request_sending"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        info!(
            status_code = status.as_u16(),
            body_length = body.len(),
            "relay_response_received"
        );

        if status != StatusCode::OK {
            return Err(RelayError::RemoteNonSuccess {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(RelayResponse { content_type, body })
    }
}

/// Read a whole file. The handle is closed when this returns, on every path.
async fn read_image(path: &Path) -> Result<LocalImage, RelayError> {
    let read_error = |source: std::io::Error| RelayError::LocalFileRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).await.map_err(read_error)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).await.map_err(read_error)?;

    Ok(LocalImage {
        file_name: file_name_of(path),
        bytes,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Relay settings pointing both image parts at one file.
#[cfg(test)]
pub(crate) fn single_image_config(api_url: String, api_key: Option<String>, image: PathBuf) -> RelayConfig {
    RelayConfig {
        api_url,
        api_key,
        webhook_url: "https://webhook.site".to_string(),
        id_gen: "UNIQ ID".to_string(),
        type_tag: "face_swap".to_string(),
        input_image: image.clone(),
        target_image: image,
    }
}
