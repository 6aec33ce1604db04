use anyhow::Context;
use logsink_core::filter::FilterSpec;
use logsink_core::query::{ErrorResponse, QueryResponse, StatusResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

pub struct QueryClient {
    base_url: String,
    http: Client,
}

impl QueryClient {
    pub fn new(addr: Option<String>) -> Self {
        let addr = addr
            .or_else(|| std::env::var("LOGSINK_HTTP_ADDR").ok())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        Self {
            base_url: base_url(&addr),
            http: Client::new(),
        }
    }

    pub async fn query(&self, spec: &FilterSpec) -> anyhow::Result<QueryResponse> {
        let resp = self
            .http
            .get(format!("{}/logs", self.base_url))
            .query(spec)
            .send()
            .await
            .with_context(|| format!("connect logsink at {}", self.base_url))?;
        decode(resp).await
    }

    pub async fn status(&self) -> anyhow::Result<StatusResponse> {
        let resp = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .with_context(|| format!("connect logsink at {}", self.base_url))?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> anyhow::Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let detail = resp
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| "no error detail".to_string());
        anyhow::bail!("logsink returned {status}: {detail}");
    }
    resp.json::<T>().await.context("decode logsink response")
}

fn base_url(addr: &str) -> String {
    let trimmed = addr.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
