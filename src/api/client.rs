use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// Raw reply of an RPC call: HTTP status plus the undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RpcResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body.
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// The transport seam: anything that can call a route of a named service.
///
/// The poller and the endpoint wrappers only depend on this trait, so tests
/// can script responses without a network.
#[allow(async_fn_in_trait)]
pub trait RpcClient {
    async fn call_endpoint(&self, service: &str, route: &str, body: &Value) -> Result<RpcResponse>;
}

const API_URL: &str = "https://crux-nuclei.com/api";

/// reqwest-backed [`RpcClient`] that POSTs JSON to `{base_url}/{service}{route}`.
pub struct HttpRpcClient {
    token: String,
    client: Client,
    base_url: String,
}

impl HttpRpcClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(token: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            token,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, service: &str, route: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            service.to_lowercase(),
            route.trim_start_matches('/')
        )
    }
}

impl RpcClient for HttpRpcClient {
    async fn call_endpoint(&self, service: &str, route: &str, body: &Value) -> Result<RpcResponse> {
        let mut request = self
            .client
            .post(self.url(service, route))
            .header("content-type", "application/json")
            .json(body);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        Ok(RpcResponse::new(status, bytes.to_vec()))
    }
}
