//! Core library for the `loadprobe` CLI.
//!
//! The engine fans a fixed number of HTTP requests out over a bounded pool of
//! workers ([`workload::dispatch`]), records one [`metrics::Outcome`] per
//! request, and reduces the collected outcomes to a
//! [`metrics::StatisticsReport`] ([`metrics::aggregate`]). The request
//! executor and the endpoint selection policy are traits, so the dispatcher
//! can be driven without a network.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod workload;
