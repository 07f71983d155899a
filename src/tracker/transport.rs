use super::error::ProbeError;
use crate::constants::USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Head,
    Get,
}

/// How much of the response the caller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Only the fact that something answered matters; the body is not read
    /// and a transport may report the response as opaque.
    NoCors,
    /// Status and body are both read.
    Cors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: String,
    pub method: Method,
    pub mode: RequestMode,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, method: Method, mode: RequestMode) -> Self {
        Self {
            url: url.into(),
            method,
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status; 0 when the response is opaque.
    pub status: u16,
    pub opaque: bool,
    pub body: Bytes,
}

impl ProbeResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            opaque: false,
            body: Bytes::new(),
        }
    }

    /// A response whose status and body the transport could not see.
    pub fn opaque() -> Self {
        Self {
            status: 0,
            opaque: true,
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// The network primitive a probe runs on.
///
/// Implementations report a timeout they detect themselves as
/// [`ProbeError::Timeout`]; the probe additionally bounds every call with
/// its own timer, so a transport is free to never time out.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError>;
}

/// [`ProbeTransport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ProbeError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        let method = match request.method {
            Method::Head => reqwest::Method::HEAD,
            Method::Get => reqwest::Method::GET,
        };

        let response = self
            .client
            .request(method, request.url.as_str())
            .send()
            .await?;
        let status = response.status().as_u16();

        let body = match request.mode {
            RequestMode::Cors => response.bytes().await?,
            RequestMode::NoCors => Bytes::new(),
        };

        Ok(ProbeResponse {
            status,
            opaque: false,
            body,
        })
    }
}
