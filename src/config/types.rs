use std::time::Duration;

use serde::Deserialize;

use crate::args::OutputFormat;
use crate::args::parsers::parse_duration_value;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub requests: Option<u64>,
    pub concurrent: Option<usize>,
    pub wait: Option<bool>,
    pub wait_attempts: Option<usize>,
    pub endpoints: Option<Vec<String>>,
    pub timeout: Option<DurationValue>,
    pub seed: Option<u64>,
    pub output_format: Option<OutputFormat>,
}

/// Either whole seconds (`timeout = 5`) or a unit string (`timeout = "500ms"`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> AppResult<Duration> {
        let parsed = match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text),
        };
        parsed.map_err(|source| AppError::config(ConfigError::InvalidTimeout { source }))
    }
}
