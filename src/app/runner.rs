use std::process::ExitCode;
use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tracing::{error, info};

use crate::args::TesterArgs;
use crate::error::AppResult;
use crate::http::{HttpExecutor, ReadinessPolicy, build_client, parse_base_url, wait_for_service};
use crate::metrics::aggregate;
use crate::workload::{DispatchPlan, RandomEndpointPolicy, dispatch};

use super::summary::print_report;

/// Runs one load test end to end.
///
/// Exits with failure when any request failed or the readiness wait ran out.
///
/// # Errors
///
/// Returns an error for an invalid base URL or endpoint list, when the HTTP
/// client cannot be built, or when the report cannot be written.
pub(crate) async fn run_local(args: &TesterArgs) -> AppResult<ExitCode> {
    let base_url = parse_base_url(&args.url)?;
    let policy = RandomEndpointPolicy::new(args.endpoints.clone())?;
    let client = build_client(args.request_timeout)?;

    if args.wait {
        let readiness = ReadinessPolicy::with_attempts(args.wait_attempts.get());
        if !wait_for_service(&client, base_url.as_str(), readiness).await {
            error!("Aborting test - service not ready");
            return Ok(ExitCode::FAILURE);
        }
    }

    let plan = DispatchPlan {
        num_requests: args.requests,
        concurrent_users: args.concurrent,
    };
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let executor = Arc::new(HttpExecutor::new(client, base_url.as_str()));

    info!(
        "Starting load test with {} requests using {} concurrent users",
        plan.num_requests,
        plan.concurrent_users.get()
    );
    info!("Target: {}", base_url);
    info!("Test endpoints: {:?}", policy.endpoints());

    let run = dispatch(executor, &policy, plan, &mut rng).await;
    info!(
        "Test completed in {:.2} seconds",
        run.total_elapsed.as_secs_f64()
    );

    let report = aggregate(&run.outcomes, run.total_elapsed);
    print_report(&report, args.output_format)?;

    if run.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
