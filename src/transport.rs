//! Versioned JSON transport for view-model requests.
//!
//! Every request carries the client's claimed version in the
//! [`VERSION_HEADER`] header; responses are expected to be JSON and may carry
//! the server's current version in the same header. Error bodies that decode
//! as a [`ServerError`] surface as structured failures instead of a bare
//! status code.

use crate::version::{Version, VersionError};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Header carrying the view-model wire-format version on requests and
/// responses.
pub const VERSION_HEADER: &str = "x-viewmodel-version";

/// Structured error body a server may return instead of a plain status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ServerError {
    /// Machine-readable error code, when the server assigns one.
    pub code: Option<String>,
    pub message: String,
}

/// Errors raised by the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request itself failed (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-success status. If the body decoded as a
    /// [`ServerError`], it is carried here.
    #[error("server returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
        server_error: Option<ServerError>,
    },

    /// The response body was not JSON.
    #[error("unexpected content type '{content_type}'")]
    UnexpectedMimeType { content_type: String },

    /// A JSON body failed to decode as the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Version header handling or compatibility checking failed.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Extract and parse the version header from a request or response header map.
///
/// # Returns
/// * `Ok(Version)` when the header is present and well formed
/// * `Err(VersionError::MissingHeader)` when absent
/// * `Err(VersionError::Malformed)` when present but unparseable
pub fn version_from_headers(headers: &HeaderMap) -> Result<Version, VersionError> {
    let raw = headers.get(VERSION_HEADER).ok_or(VersionError::MissingHeader {
        header: VERSION_HEADER,
    })?;
    let text = raw.to_str().map_err(|_| VersionError::Malformed {
        input: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
    })?;
    text.parse()
}

/// A JSON client that stamps every request with the claimed wire-format
/// version and decodes bodies with server-error awareness.
#[derive(Debug, Clone)]
pub struct JsonTransport {
    client: reqwest::Client,
    version: Version,
    require_compatible_with: Option<Version>,
}

impl JsonTransport {
    /// Create a transport claiming `version` on every request.
    pub fn new(version: Version) -> Self {
        Self::with_client(reqwest::Client::new(), version)
    }

    /// Create a transport over a preconfigured client (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, version: Version) -> Self {
        Self {
            client,
            version,
            require_compatible_with: None,
        }
    }

    /// The version this transport claims on the wire.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Require every response's version header to be present and compatible
    /// with `current`. Without this, response version headers are ignored.
    pub fn require_compatible_with(mut self, current: Version) -> Self {
        self.require_compatible_with = Some(current);
        self
    }

    /// GET a view-model body from `url`.
    ///
    /// # Returns
    /// * `Ok(T)` on a success status with a JSON body that decodes
    /// * `Err(TransportError)` otherwise; a non-success status with a
    ///   decodable [`ServerError`] body surfaces that structured error
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, TransportError> {
        let request = self
            .client
            .get(url)
            .header(VERSION_HEADER, self.version.to_string())
            .header(ACCEPT, "application/json");
        self.execute(request).await
    }

    /// POST a JSON body to `url` and decode the JSON response.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let request = self
            .client
            .post(url)
            .header(VERSION_HEADER, self.version.to_string())
            .header(ACCEPT, "application/json")
            .json(body);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, claimed = %self.version, "Received view-model response");

        // Error statuses surface before response-version checking: an error
        // body is reported even when the response carries no version header.
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // A structured error body beats a bare status line.
            return match serde_json::from_str::<ServerError>(&body) {
                Ok(server_error) => Err(TransportError::Status {
                    status,
                    message: server_error.message.clone(),
                    server_error: Some(server_error),
                }),
                Err(_) => {
                    warn!(%status, "Server error body was not structured");
                    Err(TransportError::Status {
                        status,
                        message: body,
                        server_error: None,
                    })
                }
            };
        }

        if let Some(current) = self.require_compatible_with {
            let server_version = version_from_headers(response.headers())?;
            if !server_version.is_compatible_with(&current) {
                return Err(VersionError::Incompatible {
                    claimed: server_version,
                    current,
                }
                .into());
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(TransportError::UnexpectedMimeType { content_type });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
