//! K3 Cloud Web API Client
//!
//! Signs and sends `ExecuteBillQuery` calls. One call is one POST; there is
//! no retry.

use std::fmt;
use std::time::{Duration, Instant};

use k3_common::{service_url, BillQuery, BillQueryRequest, InventoryItem, EXECUTE_BILL_QUERY};
use k3_signing::{RequestSigner, SignedHeaders};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BridgeError, BridgeResult};
use crate::inventory::rows;

/// A fully signed call, ready to send or print.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: SignedHeaders,
    pub body: BillQueryRequest,
}

/// Status and body of a response, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

impl fmt::Display for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request URL: {}", self.url)?;
        writeln!(f, "Headers:")?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "  {name}: {value}")?;
        }
        let payload = serde_json::to_string_pretty(&self.body).map_err(|_| fmt::Error)?;
        write!(f, "Payload: {payload}")
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Response Status Code: {}", self.status)?;
        writeln!(f, "Response Body:")?;
        write!(f, "{}", self.body)
    }
}

/// Client for one K3 Cloud site and app identity.
#[derive(Debug, Clone)]
pub struct K3Client {
    http: reqwest::Client,
    signer: RequestSigner,
    server_url: String,
}

impl K3Client {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> BridgeResult<Self> {
        let signer = RequestSigner::new(config.identity(), config.user_agent.clone())?;
        if !signer.gateway().has_secret() {
            warn!(
                app_id = %config.app_id,
                "No gateway secret could be decoded from the app id; X-Api-Signature will use an empty key"
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_http(http, signer, config.server_url.clone()))
    }

    /// Build a client around an existing HTTP client.
    pub fn with_http(http: reqwest::Client, signer: RequestSigner, server_url: String) -> Self {
        Self {
            http,
            signer,
            server_url,
        }
    }

    /// URL of the `ExecuteBillQuery` service.
    pub fn bill_query_url(&self) -> String {
        service_url(&self.server_url, EXECUTE_BILL_QUERY)
    }

    /// Sign a query at the current time without sending it.
    pub fn prepare(&self, query: BillQuery) -> PreparedRequest {
        let url = self.bill_query_url();
        let timestamp = chrono::Utc::now().timestamp();
        let headers = self.signer.sign(&url, timestamp);
        PreparedRequest {
            url,
            headers,
            body: query.into(),
        }
    }

    /// Send a prepared call and return its status and body.
    pub async fn send(&self, request: &PreparedRequest) -> BridgeResult<RawResponse> {
        let body = serde_json::to_vec(&request.body)?;

        let mut builder = self.http.post(&request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        let start = Instant::now();
        let response = builder.body(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(
            url = %request.url,
            status,
            latency_ms = start.elapsed().as_millis() as u64,
            bytes = text.len(),
            "K3 Cloud call completed"
        );

        Ok(RawResponse { status, body: text })
    }

    /// Sign and send one `ExecuteBillQuery` call.
    pub async fn execute_bill_query(&self, query: BillQuery) -> BridgeResult<RawResponse> {
        let request = self.prepare(query);
        self.send(&request).await
    }

    /// Query stock on hand for one warehouse.
    pub async fn query_inventory(
        &self,
        warehouse_code: &str,
        limit: u32,
    ) -> BridgeResult<Vec<InventoryItem>> {
        let response = self
            .execute_bill_query(BillQuery::inventory(warehouse_code, limit))
            .await?;

        if !response.is_success() {
            return Err(BridgeError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&response.body)?;
        let items = rows::parse_rows(&value)?;

        info!(
            warehouse = %warehouse_code,
            rows = items.len(),
            "Fetched warehouse inventory"
        );

        Ok(items)
    }
}
