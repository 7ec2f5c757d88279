use std::time::Duration;

use reqwest::{Client, Url};

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

/// Validates the target base URL.
///
/// # Errors
///
/// Returns an error when the URL cannot be parsed or is not http(s).
pub fn parse_base_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw).map_err(|err| {
        AppError::http(HttpError::InvalidUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::http(HttpError::UnsupportedScheme {
            scheme: other.to_owned(),
        })),
    }
}

/// Builds the client shared by every worker. The timeout bounds each attempt
/// end to end, body included.
///
/// # Errors
///
/// Returns an error when the TLS backend or client cannot be initialized.
pub fn build_client(request_timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(request_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
