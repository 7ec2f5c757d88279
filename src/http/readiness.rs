use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

/// Per-probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Delay between probes.
const PROBE_INTERVAL: Duration = Duration::from_secs(1);
/// Statuses below this count as "up".
const READY_STATUS_CEILING: u16 = 500;

#[derive(Debug, Clone, Copy)]
pub struct ReadinessPolicy {
    pub max_attempts: usize,
    pub interval: Duration,
    pub probe_timeout: Duration,
}

impl ReadinessPolicy {
    #[must_use]
    pub const fn with_attempts(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            interval: PROBE_INTERVAL,
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

/// Polls `GET <base_url>/` until it answers below 500 or attempts run out.
pub async fn wait_for_service(client: &Client, base_url: &str, policy: ReadinessPolicy) -> bool {
    let probe_url = format!("{}/", base_url.trim_end_matches('/'));
    info!("Waiting for service at {} to be ready...", base_url);

    for attempt in 1..=policy.max_attempts {
        match client
            .get(&probe_url)
            .timeout(policy.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().as_u16() < READY_STATUS_CEILING => {
                info!(
                    "Service is ready! (responded with status {})",
                    response.status().as_u16()
                );
                return true;
            }
            Ok(response) => debug!("Readiness probe got status {}", response.status()),
            Err(err) => debug!("Readiness probe failed: {}", err),
        }

        if attempt < policy.max_attempts {
            info!(
                "Service not ready, waiting... ({}/{})",
                attempt, policy.max_attempts
            );
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(
        "Service at {} did not become ready within {} attempts",
        base_url, policy.max_attempts
    );
    false
}
