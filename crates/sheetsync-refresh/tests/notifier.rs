//! Notifier behaviour against a local fake of the refresh API.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sheetsync_model::RecordingDiagnostics;
use sheetsync_refresh::{
    RefreshError, RefreshNotifier, RefreshOutcome, RefreshSettings, RefreshStatus,
};

#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    authorization: Option<String>,
    body: String,
}

struct FakeApi {
    base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeApi {
    /// Serves the canned responses in order, repeating the last one.
    fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        std::thread::spawn(move || {
            let mut index = 0;
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Some(request) = read_request(&mut stream) else {
                    continue;
                };
                recorded.lock().unwrap().push(request);
                let (status, body) = responses[index.min(responses.len() - 1)];
                index += 1;
                let reply = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    reason(status),
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes());
                let _ = stream.flush();
            }
        });

        Self { base_url, requests }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        401 => "Unauthorized",
        _ => "Error",
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next()?.to_string();
    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().ok()?;
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value);
            }
        }
    }

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    let body = String::from_utf8_lossy(&buffer[header_end..]).into_owned();

    Some(Recorded {
        request_line,
        authorization,
        body,
    })
}

fn settings(base_url: &str) -> RefreshSettings {
    RefreshSettings::default()
        .with_base_url(base_url)
        .with_workspace_id("ws-1")
        .with_dataset_id("ds-1")
        .with_access_token("token-abc")
        .with_poll_interval(Duration::from_millis(10))
}

fn notifier(settings: RefreshSettings) -> (RefreshNotifier, Arc<RecordingDiagnostics>) {
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let notifier = RefreshNotifier::new(settings, diagnostics.clone()).unwrap();
    (notifier, diagnostics)
}

#[test]
fn trigger_posts_refresh_request() {
    let api = FakeApi::start(vec![(202, "")]);
    let (notifier, diagnostics) = notifier(settings(&api.base_url));

    assert_eq!(notifier.trigger_refresh(), RefreshOutcome::Triggered);

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].request_line,
        "POST /groups/ws-1/datasets/ds-1/refreshes HTTP/1.1"
    );
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer token-abc"));
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body, serde_json::json!({"notifyOption": "MailOnFailure"}));
    assert!(diagnostics.errors().is_empty());
}

#[test]
fn trigger_reports_rejected_request() {
    let api = FakeApi::start(vec![(401, "token expired")]);
    let (notifier, diagnostics) = notifier(settings(&api.base_url));

    match notifier.trigger_refresh() {
        RefreshOutcome::Failed(reason) => {
            assert!(reason.contains("401"));
            assert!(reason.contains("token expired"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(diagnostics.errors().len(), 1);
}

#[test]
fn trigger_reports_transport_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (notifier, _) = notifier(settings(&format!("http://127.0.0.1:{port}")));

    assert!(notifier.trigger_refresh().is_failure());
}

#[test]
fn no_token_makes_no_request() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let mut settings = settings(&base_url);
    settings.access_token = None;
    let (notifier, diagnostics) = notifier(settings);

    let outcome = notifier.trigger_refresh();
    assert!(outcome.is_failure());
    assert!(outcome.label().contains("POWERBI_ACCESS_TOKEN"));
    assert_eq!(diagnostics.errors().len(), 1);

    let status = notifier.refresh_status(None);
    assert!(matches!(status, Err(RefreshError::MissingCredentials { .. })));

    let accepted = listener.accept();
    assert!(matches!(accepted, Err(ref e) if e.kind() == ErrorKind::WouldBlock));
}

#[test]
fn status_by_id_uses_refresh_path() {
    let api = FakeApi::start(vec![(200, r#"{"requestId":"abc","status":"Completed"}"#)]);
    let (notifier, _) = notifier(settings(&api.base_url));

    let report = notifier.refresh_status(Some("abc")).unwrap();
    assert_eq!(report.status, RefreshStatus::Completed);
    assert_eq!(
        api.requests()[0].request_line,
        "GET /groups/ws-1/datasets/ds-1/refreshes/abc HTTP/1.1"
    );
}

#[test]
fn wait_polls_until_completed() {
    let api = FakeApi::start(vec![
        (200, r#"{"value":[{"status":"Unknown"}]}"#),
        (200, r#"{"value":[{"status":"Completed"}]}"#),
    ]);
    let (notifier, _) = notifier(settings(&api.base_url));

    let outcome = notifier.wait_for_completion(Duration::from_secs(10));
    assert_eq!(outcome, RefreshOutcome::Completed);
    assert_eq!(api.requests().len(), 2);
}

#[test]
fn wait_reports_service_failure() {
    let api = FakeApi::start(vec![(
        200,
        r#"{"value":[{"status":"Failed","serviceExceptionJson":"capacity exceeded"}]}"#,
    )]);
    let (notifier, _) = notifier(settings(&api.base_url));

    let outcome = notifier.wait_for_completion(Duration::from_secs(10));
    assert_eq!(outcome, RefreshOutcome::Failed("capacity exceeded".to_string()));
}

#[test]
fn wait_gives_up_after_timeout() {
    let api = FakeApi::start(vec![(200, r#"{"value":[{"status":"Unknown"}]}"#)]);
    let (notifier, diagnostics) = notifier(settings(&api.base_url));

    let outcome = notifier.wait_for_completion(Duration::from_millis(80));
    match outcome {
        RefreshOutcome::Failed(reason) => assert!(reason.contains("did not complete within")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(api.requests().len() >= 1);
    assert!(!diagnostics.errors().is_empty());
}
