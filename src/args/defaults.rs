pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!("loadprobe/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_URL: &str = "http://localhost:8080";
pub(crate) const DEFAULT_REQUESTS: u64 = 100;
pub(crate) const DEFAULT_CONCURRENT: &str = "10";
pub(crate) const DEFAULT_TIMEOUT: &str = "30s";
pub(crate) const DEFAULT_WAIT_ATTEMPTS: &str = "30";
pub(crate) const DEFAULT_ENDPOINTS: [&str; 4] = ["/", "/health", "/api/test", "/echo"];
