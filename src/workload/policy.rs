use rand::{Rng, RngCore, seq::SliceRandom};
use serde_json::json;

use crate::args::HttpMethod;
use crate::error::{AppError, AppResult, HttpError};

use super::RequestSpec;

pub const ROOT_PATH: &str = "/";

/// Decides what the request at a given position in the plan looks like.
pub trait SelectionPolicy: Send + Sync {
    fn next_request(&self, index: u64, rng: &mut dyn RngCore) -> RequestSpec;
}

/// Uniform endpoint choice; `/` is always fetched with GET, every other
/// endpoint gets GET or POST with equal odds. POST bodies carry the request
/// index.
#[derive(Debug, Clone)]
pub struct RandomEndpointPolicy {
    endpoints: Vec<String>,
}

impl RandomEndpointPolicy {
    /// # Errors
    ///
    /// Returns an error when `endpoints` is empty.
    pub fn new(endpoints: Vec<String>) -> AppResult<Self> {
        if endpoints.is_empty() {
            return Err(AppError::http(HttpError::EndpointListEmpty));
        }
        Ok(Self { endpoints })
    }

    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

impl SelectionPolicy for RandomEndpointPolicy {
    fn next_request(&self, index: u64, rng: &mut dyn RngCore) -> RequestSpec {
        let endpoint = self.endpoints.choose(rng).map_or(ROOT_PATH, String::as_str);
        let method = if endpoint == ROOT_PATH || !rng.gen_bool(0.5) {
            HttpMethod::Get
        } else {
            HttpMethod::Post
        };
        let payload = match method {
            HttpMethod::Post => Some(json!({ "test": true, "request_id": index })),
            HttpMethod::Get | HttpMethod::Put => None,
        };

        RequestSpec {
            endpoint: endpoint.to_owned(),
            method,
            payload,
        }
    }
}
