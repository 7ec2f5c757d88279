use super::*;
use crate::args::HttpMethod;
use crate::metrics::categorize_error;
use crate::workload::{RequestExecutor, RequestSpec};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const OK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK";
const UNAVAILABLE_RESPONSE: &str =
    "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Reads one request (headers plus Content-Length body) off the stream.
async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 1024];
    loop {
        let read = stream.read(&mut buffer).await.ok()?;
        if read == 0 {
            return None;
        }
        data.extend_from_slice(buffer.get(..read)?);
        let text = String::from_utf8_lossy(&data).into_owned();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let body_len = text
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end.saturating_add(4).saturating_add(body_len) {
                return Some(text);
            }
        }
    }
}

/// Answers every connection with `response` after `delay`, forwarding the raw
/// request text to the returned receiver.
async fn spawn_server(
    response: &'static str,
    delay: Duration,
) -> Result<(String, mpsc::UnboundedReceiver<String>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    let (request_tx, request_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let request_tx = request_tx.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut stream).await else {
                    return;
                };
                drop(request_tx.send(request));
                tokio::time::sleep(delay).await;
                if stream.write_all(response.as_bytes()).await.is_ok() {
                    drop(stream.shutdown().await);
                }
            });
        }
    });

    Ok((format!("http://{}", addr), request_rx))
}

/// Accepts connections and never answers.
async fn spawn_silent_server() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Ok(format!("http://{}", addr))
}

/// A loopback URL nothing listens on.
async fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

fn executor(base_url: &str, timeout: Duration) -> Result<HttpExecutor, String> {
    let client = build_client(timeout).map_err(|err| err.to_string())?;
    Ok(HttpExecutor::new(client, base_url))
}

fn get(endpoint: &str) -> RequestSpec {
    RequestSpec {
        endpoint: endpoint.to_owned(),
        method: HttpMethod::Get,
        payload: None,
    }
}

#[test]
fn url_for_joins_without_double_slash() -> Result<(), String> {
    let exec = executor("http://localhost:8080/", Duration::from_secs(1))?;
    let cases = [
        ("/", "http://localhost:8080/"),
        ("/api/test", "http://localhost:8080/api/test"),
        ("echo", "http://localhost:8080/echo"),
    ];
    for (endpoint, expected) in cases {
        let actual = exec.url_for(endpoint);
        if actual != expected {
            return Err(format!("url_for({}) = {}", endpoint, actual));
        }
    }
    Ok(())
}

#[test]
fn parse_base_url_rejects_bad_input() -> Result<(), String> {
    for raw in ["not a url", "ftp://example.com", "http://"] {
        if parse_base_url(raw).is_ok() {
            return Err(format!("Expected '{}' to be rejected", raw));
        }
    }
    parse_base_url("https://example.com:8443").map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn error_status_is_a_completed_exchange() -> Result<(), String> {
    run_async_test(async {
        let (url, _requests) = spawn_server(UNAVAILABLE_RESPONSE, Duration::ZERO).await?;
        let exec = executor(&url, Duration::from_secs(5))?;

        let outcome = exec.execute(&get("/health")).await;

        if !outcome.success() || outcome.status_code() != 503 || outcome.error().is_some() {
            return Err(format!("Expected a successful 503 outcome, got {:?}", outcome));
        }
        Ok(())
    })
}

#[test]
fn response_time_covers_server_delay() -> Result<(), String> {
    run_async_test(async {
        let (url, _requests) = spawn_server(OK_RESPONSE, Duration::from_millis(50)).await?;
        let exec = executor(&url, Duration::from_secs(5))?;

        let outcome = exec.execute(&get("/")).await;

        if outcome.status_code() != 200 {
            return Err(format!("Unexpected outcome {:?}", outcome));
        }
        if outcome.response_time() < Duration::from_millis(50) {
            return Err(format!(
                "Response time {:?} shorter than server delay",
                outcome.response_time()
            ));
        }
        Ok(())
    })
}

#[test]
fn post_and_put_send_json_bodies() -> Result<(), String> {
    run_async_test(async {
        let (url, mut requests) = spawn_server(OK_RESPONSE, Duration::ZERO).await?;
        let exec = executor(&url, Duration::from_secs(5))?;

        let post = RequestSpec {
            endpoint: "/echo".to_owned(),
            method: HttpMethod::Post,
            payload: Some(serde_json::json!({ "test": true, "request_id": 3 })),
        };
        let put = RequestSpec {
            endpoint: "/api/test".to_owned(),
            method: HttpMethod::Put,
            payload: None,
        };
        for spec in [&post, &put] {
            let outcome = exec.execute(spec).await;
            if !outcome.success() {
                return Err(format!("{} failed: {:?}", spec.method, outcome));
            }
        }

        let post_raw = requests
            .recv()
            .await
            .ok_or_else(|| "Missing POST request".to_owned())?;
        if !post_raw.starts_with("POST /echo ") || !post_raw.contains("\"request_id\":3") {
            return Err(format!("Unexpected POST request: {}", post_raw));
        }
        let put_raw = requests
            .recv()
            .await
            .ok_or_else(|| "Missing PUT request".to_owned())?;
        if !put_raw.starts_with("PUT /api/test ") || !put_raw.ends_with("{}") {
            return Err(format!("Unexpected PUT request: {}", put_raw));
        }
        Ok(())
    })
}

#[test]
fn connection_refused_is_a_failed_outcome() -> Result<(), String> {
    run_async_test(async {
        let url = closed_port_url().await?;
        let exec = executor(&url, Duration::from_secs(5))?;

        let outcome = exec.execute(&get("/")).await;

        if outcome.success() || outcome.status_code() != 0 {
            return Err(format!("Expected a failed outcome, got {:?}", outcome));
        }
        let category = categorize_error(outcome.error());
        if category != "ConnectionError" {
            return Err(format!("Unexpected error category {}", category));
        }
        Ok(())
    })
}

#[test]
fn timeout_is_a_failed_outcome_with_elapsed_time() -> Result<(), String> {
    run_async_test(async {
        let url = spawn_silent_server().await?;
        let exec = executor(&url, Duration::from_millis(200))?;

        let outcome = exec.execute(&get("/slow")).await;

        if outcome.success() || outcome.status_code() != 0 {
            return Err(format!("Expected a failed outcome, got {:?}", outcome));
        }
        if categorize_error(outcome.error()) != "Timeout" {
            return Err(format!("Expected a Timeout, got {:?}", outcome.error()));
        }
        if outcome.response_time() < Duration::from_millis(200) {
            return Err(format!(
                "Timed-out attempt reported {:?}",
                outcome.response_time()
            ));
        }
        Ok(())
    })
}

#[test]
fn readiness_succeeds_against_live_service() -> Result<(), String> {
    run_async_test(async {
        let (url, _requests) = spawn_server(OK_RESPONSE, Duration::ZERO).await?;
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;

        if !wait_for_service(&client, &url, ReadinessPolicy::with_attempts(3)).await {
            return Err("Expected service to be ready".to_owned());
        }
        Ok(())
    })
}

#[test]
fn readiness_gives_up_on_unreachable_or_failing_service() -> Result<(), String> {
    run_async_test(async {
        let client = build_client(Duration::from_secs(5)).map_err(|err| err.to_string())?;
        let policy = ReadinessPolicy {
            max_attempts: 2,
            interval: Duration::from_millis(10),
            probe_timeout: Duration::from_millis(500),
        };

        let closed = closed_port_url().await?;
        if wait_for_service(&client, &closed, policy).await {
            return Err("Closed port must not be ready".to_owned());
        }

        let (failing, _requests) = spawn_server(UNAVAILABLE_RESPONSE, Duration::ZERO).await?;
        if wait_for_service(&client, &failing, policy).await {
            return Err("A 503 service must not be ready".to_owned());
        }
        Ok(())
    })
}
