//! HTTP transport boundary.
//!
//! The navigation engine talks to the network through the [`Transport`]
//! trait so tests can script responses. [`ReqwestTransport`] is the real
//! implementation; it never follows redirects itself.

use std::cell::RefCell;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use reqwest::blocking::{multipart, Client};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use url::Url;

use super::result::Method;
use crate::config::BrowserConfig;
use crate::error::{Result, TransportError};

/// A file entry for a multipart submission.
#[derive(Clone, PartialEq, Eq)]
pub enum FileUpload {
    /// Read from disk when the request is sent.
    Path(PathBuf),
    /// In-memory content with the file name to report.
    Stream { file_name: String, data: Vec<u8> },
}

impl FileUpload {
    /// Upload a file from disk.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Upload in-memory bytes.
    #[must_use]
    pub fn bytes(file_name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::Stream {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Drain a reader into an in-memory upload.
    pub fn from_reader(file_name: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::bytes(file_name, data))
    }

    /// File name reported to the server.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Stream { file_name, .. } => file_name.clone(),
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream { file_name, data } => f
                .debug_struct("Stream")
                .field("file_name", file_name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// Value of one posted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValue {
    Text(String),
    File(FileUpload),
}

impl From<&str> for PostValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PostValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FileUpload> for PostValue {
    fn from(upload: FileUpload) -> Self {
        Self::File(upload)
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// `multipart/form-data`.
    Multipart(Vec<(String, PostValue)>),
}

impl RequestBody {
    /// Pick an encoding for posted fields: multipart when any field is a file
    /// or when `multipart` is requested, urlencoded otherwise.
    #[must_use]
    pub fn from_fields(fields: Vec<(String, PostValue)>, multipart: bool) -> Self {
        let has_files = fields
            .iter()
            .any(|(_, value)| matches!(value, PostValue::File(_)));
        if multipart || has_files {
            return Self::Multipart(fields);
        }
        Self::Form(
            fields
                .into_iter()
                .filter_map(|(name, value)| match value {
                    PostValue::Text(text) => Some((name, text)),
                    PostValue::File(_) => None,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn post(url: Url, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            url,
            body,
        }
    }
}

/// A received response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with a status and body; the reason phrase is the canonical one.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            reason: canonical_reason(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// First value of a header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `Location` header.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header(LOCATION.as_str())
    }

    /// `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }
}

/// Canonical reason phrase for a status code, or an empty string.
#[must_use]
pub fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Sends single requests. Implementations must not follow redirects.
pub trait Transport {
    /// Send one request and return the raw response.
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError>;

    /// Forget every stored cookie.
    fn clear_cookies(&self) -> std::result::Result<(), TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug)]
pub struct ReqwestTransport {
    config: BrowserConfig,
    client: RefCell<Client>,
}

impl ReqwestTransport {
    /// Create a transport from browser settings.
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        Ok(Self {
            client: RefCell::new(create_client(config)?),
            config: config.clone(),
        })
    }
}

/// Create a configured HTTP client.
///
/// Redirects are disabled; the browser follows them itself so every hop is
/// recorded. The cookie store is enabled only when the config asks for it.
pub fn create_client(config: &BrowserConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent())
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(config.cookies())
        .build()?;
    Ok(client)
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let client = self.client.borrow();
        let builder = match request.method {
            Method::Get => client.get(request.url.clone()),
            Method::Post => client.post(request.url.clone()),
        };

        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encoded)
            }
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let response = builder.send()?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes()?.to_vec();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }

    fn clear_cookies(&self) -> std::result::Result<(), TransportError> {
        // reqwest's cookie store cannot be emptied in place.
        *self.client.borrow_mut() = create_client(&self.config)?;
        Ok(())
    }
}

fn multipart_form(fields: &[(String, PostValue)]) -> std::io::Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = match value {
            PostValue::Text(text) => form.text(name.clone(), text.clone()),
            PostValue::File(FileUpload::Path(path)) => form.file(name.clone(), path)?,
            PostValue::File(FileUpload::Stream { file_name, data }) => form.part(
                name.clone(),
                multipart::Part::bytes(data.clone()).file_name(file_name.clone()),
            ),
        };
    }
    Ok(form)
}
