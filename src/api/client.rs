//! HTTP API Client
//!
//! Request/response handling shared by every page: bearer header, status
//! and content-type validation, error-body parsing.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::dto::{Collection, FileUpload};
use super::endpoints::Endpoint;
use super::error::{ClientError, ClientResult, UNKNOWN_ERROR_MESSAGE};
use crate::config::ApiConfig;
use crate::session::TokenStore;

/// Body of an outgoing request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> ClientResult<Self> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

/// One field of a multipart form
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File(FileUpload),
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(name: &str, file: FileUpload) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::File(file),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// A successful response, already read into memory
struct Reply {
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json") || ct.contains("+json"))
    }

    fn is_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

/// Client for the community REST backend
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Create a client; the request timeout applies to every call
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.tokens.token().is_some()
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Absolute URL for an asset path the backend returned relative
    /// (e.g. `/uploads/pic.png`)
    pub fn resolve_asset(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, endpoint: &Endpoint) -> RequestBuilder {
        let url = self.url(endpoint);
        tracing::debug!(method = %method, url = %url, "Sending request");

        let builder = self.http.request(method, &url);
        match self.tokens.token() {
            Some(token) => builder.bearer_auth(token),
            None => {
                tracing::debug!(url = %url, "No session token, sending request unauthenticated");
                builder
            }
        }
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> ClientResult<T> {
        let response = self.request(Method::GET, endpoint).send().await?;
        let reply = read_reply(response).await?;

        if !reply.is_json() {
            return Err(ClientError::NotJson {
                content_type: reply.content_type,
            });
        }

        Ok(serde_json::from_slice(&reply.body)?)
    }

    /// GET a collection, accepting a bare array or a page wrapper
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> ClientResult<(Vec<T>, Option<u64>)> {
        let collection: Collection<T> = self.get_json(endpoint).await?;
        Ok(collection.into_parts())
    }

    /// Send a mutating request.
    ///
    /// An empty success body yields `None`; a non-empty body must be JSON.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &Endpoint,
        body: &RequestBody,
    ) -> ClientResult<Option<T>> {
        let builder = self.request(method, endpoint);
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let reply = read_reply(builder.send().await?).await?;

        if reply.is_empty() {
            return Ok(None);
        }
        if !reply.is_json() {
            return Err(ClientError::NotJson {
                content_type: reply.content_type,
            });
        }

        Ok(Some(serde_json::from_slice(&reply.body)?))
    }
}

fn build_form(parts: &[FormPart]) -> ClientResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File(file) => {
                let file_part = reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime)
                    .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
                form.part(part.name.clone(), file_part)
            }
        };
    }
    Ok(form)
}

/// Turn non-2xx responses into `ClientError::Status`, reading the
/// backend's `message` field when present.
async fn read_reply(response: Response) -> ClientResult<Reply> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?.to_vec();

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());

        tracing::warn!(status = status.as_u16(), message = %message, "Request failed");
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(Reply { content_type, body })
}
