use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Options given on the
/// command line always win.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.as_ref()
    {
        url.clone_into(&mut args.url);
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = requests;
    }

    if !is_cli(matches, "concurrent")
        && let Some(concurrent) = config.concurrent
    {
        args.concurrent = ensure_positive_usize(concurrent, "concurrent")?;
    }

    if !is_cli(matches, "wait")
        && let Some(wait) = config.wait
    {
        args.wait = wait;
    }

    if !is_cli(matches, "wait_attempts")
        && let Some(attempts) = config.wait_attempts
    {
        args.wait_attempts = ensure_positive_usize(attempts, "wait_attempts")?;
    }

    if !is_cli(matches, "endpoints")
        && let Some(endpoints) = config.endpoints.as_ref()
    {
        if endpoints.is_empty() {
            return Err(AppError::config(ConfigError::EmptyEndpoints));
        }
        args.endpoints.clone_from(endpoints);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration()?;
    }

    if !is_cli(matches, "seed")
        && let Some(seed) = config.seed
    {
        args.seed = Some(seed);
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive { field, source: err })
    })
}
