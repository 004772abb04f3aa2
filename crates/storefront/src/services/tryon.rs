//! Virtual try-on through an image generation API.
//!
//! The shopper's photo arrives as a data URI. The garment image is fetched
//! from its catalog URL, both are sent to the model, and the first image in
//! the reply is returned as a data URI.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::{Stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::TryOnConfig;

const API_TIMEOUT: Duration = Duration::from_secs(90);
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest decoded image accepted in either direction.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const PROMPT: &str = "Dress the person in the first image in the garment shown in the second \
     image. Keep their face, pose, body shape and background unchanged. Return a single \
     photorealistic image.";

/// Errors from the try-on flow.
#[derive(Debug, Error)]
pub enum TryOnError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The model API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The shopper's photo is not a usable image data URI.
    #[error("invalid photo: {0}")]
    InvalidPhoto(String),

    /// The garment image could not be fetched.
    #[error("garment image unavailable: {0}")]
    Garment(String),

    /// The reply carried no image.
    #[error("model did not return an image")]
    NoImage,

    /// The client could not be built from configuration.
    #[error("invalid try-on configuration: {0}")]
    Config(String),
}

/// An inline image (`data:<mime>;base64,<payload>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parse a base64 image data URI.
    ///
    /// # Errors
    ///
    /// Returns `TryOnError::InvalidPhoto` unless the input is a base64 data
    /// URI with an `image/*` type and at most [`MAX_IMAGE_BYTES`] of payload.
    pub fn parse(s: &str) -> Result<Self, TryOnError> {
        let rest = s
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| TryOnError::InvalidPhoto("expected a data URI".to_owned()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| TryOnError::InvalidPhoto("missing payload".to_owned()))?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| TryOnError::InvalidPhoto("payload must be base64".to_owned()))?;
        if !mime_type.starts_with("image/") {
            return Err(TryOnError::InvalidPhoto(format!("unsupported type {mime_type}")));
        }
        if payload.len() / 4 * 3 > MAX_IMAGE_BYTES {
            return Err(TryOnError::InvalidPhoto("image too large".to_owned()));
        }
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| TryOnError::InvalidPhoto(e.to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_owned(),
            bytes,
        })
    }

    /// Render back to `data:<mime>;base64,<payload>`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    mime_type: String,
    data: String,
}

impl From<&DataUri> for InlineImage {
    fn from(uri: &DataUri) -> Self {
        Self {
            mime_type: uri.mime_type.clone(),
            data: BASE64.encode(&uri.bytes),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<InlineImage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedImage {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// Pick the first usable image out of a model reply.
fn first_image(response: GenerateResponse) -> Result<DataUri, TryOnError> {
    let image = response
        .images
        .into_iter()
        .find_map(|img| img.data.filter(|d| !d.is_empty()).map(|d| (img.mime_type, d)))
        .ok_or(TryOnError::NoImage)?;
    let (mime_type, data) = image;
    let bytes = BASE64.decode(data).map_err(|_| TryOnError::NoImage)?;
    Ok(DataUri {
        mime_type: mime_type.unwrap_or_else(|| "image/png".to_owned()),
        bytes,
    })
}

/// Client for the image generation API.
#[derive(Clone)]
pub struct TryOnClient {
    inner: Arc<TryOnClientInner>,
}

struct TryOnClientInner {
    /// Carries the API key; only ever talks to `endpoint`.
    api: reqwest::Client,
    /// Plain client for fetching garment images from `garment_hosts`.
    fetch: reqwest::Client,
    garment_hosts: Vec<String>,
    endpoint: String,
    model: String,
}

impl TryOnClient {
    /// Create a new try-on client.
    ///
    /// # Errors
    ///
    /// Returns `TryOnError::Config` if the API key is not a valid header
    /// value or the HTTP clients cannot be built.
    pub fn new(config: &TryOnConfig) -> Result<Self, TryOnError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
            .map_err(|_| TryOnError::Config("API key contains invalid characters".to_owned()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let api = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| TryOnError::Config(e.to_string()))?;
        let fetch = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| TryOnError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(TryOnClientInner {
                api,
                fetch,
                garment_hosts: config.garment_hosts.clone(),
                endpoint: format!("{}/images/generate", config.api_url),
                model: config.model.clone(),
            }),
        })
    }

    /// Dress the person in `photo` in the garment at `garment_url`.
    ///
    /// # Errors
    ///
    /// Returns `TryOnError::Garment` if the garment image cannot be fetched,
    /// `TryOnError::Api`/`Http` if the model call fails, and
    /// `TryOnError::NoImage` if the reply contains no image.
    #[instrument(skip(self, photo), fields(model = %self.inner.model, photo_bytes = photo.bytes.len()))]
    pub async fn generate(&self, photo: &DataUri, garment_url: &str) -> Result<DataUri, TryOnError> {
        let garment = self.fetch_garment(garment_url).await?;

        let request = GenerateRequest {
            model: &self.inner.model,
            prompt: PROMPT,
            images: vec![InlineImage::from(photo), InlineImage::from(&garment)],
        };

        let response = self
            .inner
            .api
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "try-on API returned an error");
            return Err(TryOnError::Api {
                status: status.as_u16(),
                message: message.chars().take(500).collect(),
            });
        }

        let body: GenerateResponse = response.json().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unparseable try-on response");
            GenerateResponse::default()
        });
        first_image(body)
    }

    async fn fetch_garment(&self, garment_url: &str) -> Result<DataUri, TryOnError> {
        let url = garment_location(garment_url, &self.inner.garment_hosts)?;

        let response = self
            .inner
            .fetch
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| TryOnError::Garment(e.to_string()))?;

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_owned())
            .filter(|v| v.starts_with("image/"))
            .ok_or_else(|| TryOnError::Garment("not an image".to_owned()))?;

        let declared = response.content_length();
        let bytes = read_capped(response.bytes_stream(), declared, MAX_IMAGE_BYTES).await?;

        Ok(DataUri { mime_type, bytes })
    }
}

/// Parse a garment URL and check it points at an allowed image host.
fn garment_location(garment_url: &str, allowed_hosts: &[String]) -> Result<url::Url, TryOnError> {
    let url = url::Url::parse(garment_url)
        .map_err(|e| TryOnError::Garment(format!("invalid URL: {e}")))?;
    if url.scheme() != "https" {
        return Err(TryOnError::Garment("URL must use https".to_owned()));
    }
    let host = url.host_str().unwrap_or_default();
    if !allowed_hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host)) {
        tracing::warn!(host, "garment host not allowed");
        return Err(TryOnError::Garment("host not allowed".to_owned()));
    }
    Ok(url)
}

/// Collect a response body, giving up as soon as it passes `max` bytes.
///
/// `declared` is the `Content-Length`, if the server sent one.
async fn read_capped<S, B, E>(
    body: S,
    declared: Option<u64>,
    max: usize,
) -> Result<Vec<u8>, TryOnError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let too_large = || TryOnError::Garment("image too large".to_owned());
    if declared.is_some_and(|len| len > u64::try_from(max).unwrap_or(u64::MAX)) {
        return Err(too_large());
    }

    let mut body = std::pin::pin!(body);
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| TryOnError::Garment(e.to_string()))?;
        let chunk = chunk.as_ref();
        if bytes.len() + chunk.len() > max {
            return Err(too_large());
        }
        bytes.extend_from_slice(chunk);
    }
    Ok(bytes)
}
