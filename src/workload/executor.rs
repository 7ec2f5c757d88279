use async_trait::async_trait;

use crate::args::HttpMethod;
use crate::metrics::Outcome;

/// One planned request, built right before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub endpoint: String,
    pub method: HttpMethod,
    pub payload: Option<serde_json::Value>,
}

/// Performs a single request attempt.
///
/// Implementations never fail: transport problems are folded into the
/// returned [`Outcome`].
#[async_trait]
pub trait RequestExecutor: Send + Sync + 'static {
    async fn execute(&self, request: &RequestSpec) -> Outcome;
}
