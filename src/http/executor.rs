use std::error::Error as _;

use async_trait::async_trait;
use futures_util::{StreamExt, TryFutureExt};
use reqwest::{Client, RequestBuilder, Response};
use tokio::time::Instant;
use tracing::debug;

use crate::args::HttpMethod;
use crate::metrics::Outcome;
use crate::workload::{RequestExecutor, RequestSpec};

/// Executes requests against `base_url` with a shared client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
}

impl HttpExecutor {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn build(&self, request: &RequestSpec) -> RequestBuilder {
        let url = self.url_for(&request.endpoint);
        let body = || {
            request
                .payload
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()))
        };
        match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url).json(&body()),
            HttpMethod::Put => self.client.put(url).json(&body()),
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &RequestSpec) -> Outcome {
        let builder = self.build(request);
        let start = Instant::now();
        let result = builder.send().and_then(drain_response).await;
        let response_time = start.elapsed();

        result.map_or_else(
            |err| {
                let description = describe_transport_error(&err);
                debug!(
                    "{} {} failed after {:?}: {}",
                    request.method, request.endpoint, response_time, description
                );
                Outcome::failed(response_time, description)
            },
            |status| Outcome::completed(response_time, status),
        )
    }
}

/// Reads the body to completion so the connection returns to the pool.
async fn drain_response(response: Response) -> Result<u16, reqwest::Error> {
    let status = response.status().as_u16();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        chunk?;
    }
    Ok(status)
}

/// `<Category>: <message>[: <source>...]`, the category taken from the
/// client's own error classification.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let category = if err.is_timeout() {
        "Timeout"
    } else if err.is_connect() {
        "ConnectionError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_body() || err.is_decode() {
        "BodyError"
    } else if err.is_request() || err.is_builder() {
        "RequestError"
    } else {
        "TransportError"
    };

    let mut description = format!("{}: {}", category, err);
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}
