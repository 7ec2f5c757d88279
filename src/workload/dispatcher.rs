use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use rand::RngCore;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::args::PositiveUsize;
use crate::metrics::Outcome;

use super::{RequestExecutor, SelectionPolicy};

/// Completions between progress log lines.
const PROGRESS_INTERVAL: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct DispatchPlan {
    pub num_requests: u64,
    pub concurrent_users: PositiveUsize,
}

/// Everything a run produced, in completion order.
#[derive(Debug)]
pub struct TestRun {
    pub outcomes: Vec<Outcome>,
    /// From the first submission to the last collected outcome.
    pub total_elapsed: Duration,
}

impl TestRun {
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(Outcome::success)
    }
}

/// Runs `plan.num_requests` requests with at most `plan.concurrent_users`
/// executing at once and waits for every outcome.
///
/// Each request runs in its own task holding a semaphore permit. Outcomes fan
/// in over a channel to a single collector, which runs alongside submission so
/// a freed slot is reused immediately. Every task is joined before the run
/// ends; a task that panicked or was cancelled is recorded as a `TaskError`
/// failure, so the run always holds one outcome per planned request.
pub async fn dispatch<E, P, R>(
    executor: Arc<E>,
    policy: &P,
    plan: DispatchPlan,
    rng: &mut R,
) -> TestRun
where
    E: RequestExecutor + ?Sized,
    P: SelectionPolicy + ?Sized,
    R: RngCore,
{
    let width = plan.concurrent_users.get();
    let expected = usize::try_from(plan.num_requests).unwrap_or(usize::MAX);
    let permits = Arc::new(Semaphore::new(width));
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<Outcome>(width);

    let started = Instant::now();

    let submit = async move {
        let mut workers = JoinSet::new();
        for index in 0..plan.num_requests {
            let request = policy.next_request(index, &mut *rng);
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                warn!("Worker pool closed after {} submissions.", index);
                break;
            };
            let executor = Arc::clone(&executor);
            let outcome_tx = outcome_tx.clone();
            workers.spawn(async move {
                let attempt_started = Instant::now();
                let outcome = AssertUnwindSafe(executor.execute(&request))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        let message = panic_message(payload.as_ref());
                        warn!("Executor panicked on {}: {}", request.endpoint, message);
                        Outcome::failed(
                            attempt_started.elapsed(),
                            format!("TaskError: executor panicked: {}", message),
                        )
                    });
                drop(permit);
                if outcome_tx.send(outcome).await.is_err() {
                    debug!("Outcome collector gone; dropping result.");
                }
            });
        }

        // A worker that never reported still owes the run one record.
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!("Worker task failed: {}", err);
                let outcome = Outcome::failed(started.elapsed(), format!("TaskError: {}", err));
                if outcome_tx.send(outcome).await.is_err() {
                    debug!("Outcome collector gone; dropping result.");
                }
            }
        }
        // The collector stops once every sender, this one included, is gone.
        drop(outcome_tx);
    };

    let collect = async {
        let mut outcomes = Vec::with_capacity(expected.min(1 << 20));
        while let Some(outcome) = outcome_rx.recv().await {
            outcomes.push(outcome);
            if outcomes.len() % PROGRESS_INTERVAL == 0 {
                info!(
                    "Completed {}/{} requests...",
                    outcomes.len(),
                    plan.num_requests
                );
            }
        }
        outcomes
    };

    let ((), outcomes) = tokio::join!(submit, collect);
    let total_elapsed = started.elapsed();

    if outcomes.len() != expected {
        warn!(
            "Collected {} outcomes for {} planned requests; a worker task did not finish.",
            outcomes.len(),
            plan.num_requests
        );
    }

    TestRun {
        outcomes,
        total_elapsed,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
