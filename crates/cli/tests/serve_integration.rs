//! Integration tests for the `dossier serve` HTTP API.
//!
//! Each test starts the server as a child process on a unique port, makes
//! HTTP requests over a raw TcpStream, and verifies the responses. The
//! child runs without an API key, so the deterministic heuristic analyzer
//! handles analysis and the full submit/poll pipeline works offline.

use std::io::Read;
use std::net::TcpStream;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

/// Atomic port counter to avoid port conflicts between parallel tests.
/// Base port is derived from process ID so parallel `cargo test --workspace`
/// runs (separate test binaries) don't collide on the same port range.
static NEXT_PORT: AtomicU16 = AtomicU16::new(0);
static PORT_INIT: std::sync::Once = std::sync::Once::new();

fn next_port() -> u16 {
    PORT_INIT.call_once(|| {
        let base = 21000 + (std::process::id() as u16 % 20000);
        NEXT_PORT.store(base, Ordering::SeqCst);
    });
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Helper: start the dossier serve process on the given port.
///
/// ANTHROPIC_API_KEY is removed from the child environment so the server
/// always selects the heuristic analyzer.
fn start_server(port: u16) -> Child {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dossier"));
    cmd.arg("serve").arg("--port").arg(port.to_string());
    cmd.env_remove("ANTHROPIC_API_KEY");
    // Redirect stdout/stderr to avoid blocking
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let child = cmd.spawn().expect("failed to start dossier serve");
    // Wait for server to be ready by polling the port
    for _ in 0..50 {
        if TcpStream::connect(format!("127.0.0.1:{}", port)).is_ok() {
            return child;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    child
}

/// Helper: make a simple HTTP GET request and return (status, body).
fn http_get(port: u16, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost:{}\r\nConnection: close\r\n\r\n",
        path, port
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response(&response)
}

/// Helper: make a simple HTTP POST request and return (status, body).
fn http_post(port: u16, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(format!("127.0.0.1:{}", port)).expect("failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost:{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path, port, body.len(), body
    );
    std::io::Write::write_all(&mut stream, request.as_bytes()).expect("failed to write");

    let mut response = String::new();
    let _ = stream.read_to_string(&mut response);

    parse_http_response(&response)
}

/// Parse an HTTP response into (status_code, body).
fn parse_http_response(response: &str) -> (u16, String) {
    let parts: Vec<&str> = response.splitn(2, "\r\n\r\n").collect();
    let headers = parts.first().unwrap_or(&"").to_string();
    let body = parts.get(1).unwrap_or(&"").to_string();

    let status_line = headers.lines().next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    // Handle chunked transfer encoding
    let body = if headers.contains("Transfer-Encoding: chunked") {
        decode_chunked(&body)
    } else {
        body
    };

    (status, body)
}

/// Decode chunked transfer encoding.
fn decode_chunked(data: &str) -> String {
    let mut result = String::new();
    let mut remaining = data;

    while let Some(line_end) = remaining.find("\r\n") {
        let size_str = &remaining[..line_end];
        let size = match usize::from_str_radix(size_str.trim(), 16) {
            Ok(s) => s,
            Err(_) => break,
        };
        if size == 0 {
            break;
        }
        let chunk_start = line_end + 2;
        let chunk_end = chunk_start + size;
        if chunk_end > remaining.len() {
            // Partial chunk, take what we have
            result.push_str(&remaining[chunk_start..]);
            break;
        }
        result.push_str(&remaining[chunk_start..chunk_end]);
        remaining = if chunk_end + 2 <= remaining.len() {
            &remaining[chunk_end + 2..]
        } else {
            ""
        };
    }

    result
}

/// A complete valid intake body.
fn valid_intake(company: &str) -> String {
    serde_json::json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "website": "https://example.com",
        "companyName": company,
        "currentRevenue": "$40k/mo",
        "teamSize": "6",
        "primaryService": "custom automation",
        "averageDealSize": "$8k",
        "biggestBottleneck": "every delivery requires a senior engineer to babysit it",
        "acquisitionSource": "outbound plus referrals",
        "salesProcess": "two-call close with a scoped proposal",
        "fulfillmentWorkflow": "project manager assigns a pod per client",
        "currentTechStack": "HubSpot, Notion, Zapier",
        "revenueGoal": "$100k/mo",
        "dreamOutcome": "an operation that runs without the founder",
        "magicWandScenario": "pipeline full without founder-led sales",
        "commitmentLevel": 9
    })
    .to_string()
}

/// Submit a valid intake form and return (id, token, adminUrl).
fn submit(port: u16, company: &str) -> (String, String, String) {
    let (status, body) = http_post(port, "/api/submissions", &valid_intake(company));
    assert_eq!(status, 200, "submit should succeed, body: {}", body);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    (
        json["id"].as_str().expect("id").to_string(),
        json["token"].as_str().expect("token").to_string(),
        json["adminUrl"].as_str().expect("adminUrl").to_string(),
    )
}

/// Poll the status endpoint until a terminal status or the deadline.
fn poll_until_terminal(port: u16, token: &str, deadline: Duration) -> serde_json::Value {
    let start = Instant::now();
    loop {
        let (status, body) = http_get(port, &format!("/api/admin/{}/status", token));
        assert_eq!(status, 200, "status poll should succeed, body: {}", body);
        let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
        let state = json["status"].as_str().expect("status string");
        if state == "completed" || state == "failed" {
            return json;
        }
        assert!(
            start.elapsed() < deadline,
            "job did not reach a terminal status within {:?}",
            deadline
        );
        std::thread::sleep(Duration::from_millis(100));
    }
}

#[test]
fn health_returns_200() {
    let port = next_port();
    let mut child = start_server(port);

    let (status, body) = http_get(port, "/health");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some());
}

#[test]
fn submit_returns_id_token_and_admin_url() {
    let port = next_port();
    let mut child = start_server(port);

    let (id, token, admin_url) = submit(port, "Analytical Engines Ltd");

    // Immediately after submission the status must already be readable.
    let (status, body) = http_get(port, &format!("/api/admin/{}/status", token));
    child.kill().ok();
    child.wait().ok();

    assert!(!id.is_empty());
    assert!(!token.is_empty());
    assert_ne!(id, token, "token must be distinct from id");
    assert!(
        admin_url.ends_with(&format!("/api/admin/{}", token)),
        "adminUrl should embed the token, got: {}",
        admin_url
    );

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    let state = json["status"].as_str().expect("status string");
    assert!(
        ["pending", "processing", "completed"].contains(&state),
        "fresh submission must not be failed, got: {}",
        state
    );
}

#[test]
fn submission_reaches_completed_with_dossier() {
    let port = next_port();
    let mut child = start_server(port);

    let (_, token, _) = submit(port, "Analytical Engines Ltd");
    let status_json = poll_until_terminal(port, &token, Duration::from_secs(5));

    let (full_status, full_body) = http_get(port, &format!("/api/admin/{}", token));
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status_json["status"], "completed");
    let score = status_json["estimatedFitScore"]
        .as_u64()
        .expect("completed status includes the fit score");
    assert!(score <= 100);

    assert_eq!(full_status, 200);
    let full: serde_json::Value = serde_json::from_str(&full_body).expect("valid JSON");
    assert_eq!(full["status"], "completed");
    assert_eq!(full["submission"]["firstName"], "Ada");
    assert_eq!(full["submission"]["companyName"], "Analytical Engines Ltd");
    assert!(full.get("createdAt").is_some());
    let analysis = &full["analysis"];
    assert!(analysis.is_object(), "completed job must carry the analysis");
    assert!(analysis.get("executiveSummary").is_some());
    assert_eq!(analysis["estimatedFitScore"].as_u64(), Some(score));
}

#[test]
fn analysis_is_null_until_completed() {
    let port = next_port();
    let mut child = start_server(port);

    let (_, token, _) = submit(port, "Coupling Check Co");

    // At every observable point, analysis must be present iff completed.
    let start = Instant::now();
    loop {
        let (status, body) = http_get(port, &format!("/api/admin/{}", token));
        assert_eq!(status, 200);
        let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
        let state = json["status"].as_str().expect("status string");
        if state == "completed" {
            assert!(json["analysis"].is_object());
            break;
        }
        assert!(
            json["analysis"].is_null(),
            "analysis must be null while status is {}",
            state
        );
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "job never completed"
        );
        std::thread::sleep(Duration::from_millis(50));
    }

    child.kill().ok();
    child.wait().ok();
}

#[test]
fn tokens_are_isolated_per_submission() {
    let port = next_port();
    let mut child = start_server(port);

    let (id_a, token_a, _) = submit(port, "Company A");
    let (id_b, token_b, _) = submit(port, "Company B");
    assert_ne!(id_a, id_b);
    assert_ne!(token_a, token_b);

    let (_, body_a) = http_get(port, &format!("/api/admin/{}", token_a));
    let (_, body_b) = http_get(port, &format!("/api/admin/{}", token_b));
    child.kill().ok();
    child.wait().ok();

    let a: serde_json::Value = serde_json::from_str(&body_a).expect("valid JSON");
    let b: serde_json::Value = serde_json::from_str(&body_b).expect("valid JSON");
    assert_eq!(a["submission"]["companyName"], "Company A");
    assert_eq!(b["submission"]["companyName"], "Company B");
}

#[test]
fn unknown_token_returns_404() {
    let port = next_port();
    let mut child = start_server(port);

    let (full_status, full_body) = http_get(port, "/api/admin/unknown-token");
    let (status_status, status_body) = http_get(port, "/api/admin/unknown-token/status");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(full_status, 404);
    let json: serde_json::Value = serde_json::from_str(&full_body).expect("valid JSON");
    assert!(json.get("error").is_some());

    assert_eq!(status_status, 404);
    let json: serde_json::Value = serde_json::from_str(&status_body).expect("valid JSON");
    assert!(json.get("error").is_some());
}

#[test]
fn submit_with_empty_first_name_returns_400() {
    let port = next_port();
    let mut child = start_server(port);

    let mut body: serde_json::Value =
        serde_json::from_str(&valid_intake("Rejected Inc")).unwrap();
    body["firstName"] = serde_json::json!("");
    let (status, resp_body) = http_post(port, "/api/submissions", &body.to_string());
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 400);
    let json: serde_json::Value = serde_json::from_str(&resp_body).expect("valid JSON");
    let error = json["error"].as_str().expect("error message");
    assert!(error.contains("firstName"), "got: {}", error);
    // No record was created: the rejection carries no token to poll with.
    assert!(json.get("token").is_none());
    assert!(json.get("id").is_none());
}

#[test]
fn not_found_returns_404() {
    let port = next_port();
    let mut child = start_server(port);

    let (status, body) = http_get(port, "/nonexistent");
    child.kill().ok();
    child.wait().ok();

    assert_eq!(status, 404);
    let json: serde_json::Value = serde_json::from_str(&body).expect("valid JSON");
    assert_eq!(json["error"], "not found");
}
