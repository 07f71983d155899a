use super::probe::upstream_status;
use super::*;
use async_trait::async_trait;
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

mock! {
    Transport {}

    #[async_trait]
    impl ProbeTransport for Transport {
        async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError>;
    }
}

const RELAY_A: &str = "https://relay-a.example/?";
const RELAY_B: &str = "https://relay-b.example/get?url=";

fn relayed_config() -> ProbeConfig {
    ProbeConfig::default()
        .with_secure_origin(true)
        .with_relays([RELAY_A, RELAY_B])
}

#[derive(Clone)]
enum Behavior {
    Respond(Duration, ProbeResponse),
    Fail(ProbeError),
    Hang,
}

/// Scripted transport: the first rule whose prefix matches the URL (and
/// method, if given) decides the outcome. Records every call and how many
/// requests were in flight at once.
#[derive(Default)]
struct FakeTransport {
    rules: Vec<(String, Option<Method>, Behavior)>,
    calls: Mutex<Vec<(ProbeRequest, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeTransport {
    fn rule(mut self, prefix: &str, method: Option<Method>, behavior: Behavior) -> Self {
        self.rules.push((prefix.to_string(), method, behavior));
        self
    }

    fn calls(&self) -> Vec<ProbeRequest> {
        self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    fn start_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProbeTransport for Arc<FakeTransport> {
    async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, ProbeError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let behavior = self
            .rules
            .iter()
            .find(|(prefix, method, _)| {
                request.url.starts_with(prefix.as_str())
                    && method.map_or(true, |m| m == request.method)
            })
            .map(|(_, _, behavior)| behavior.clone())
            .unwrap_or(Behavior::Fail(ProbeError::Transport("no route".into())));

        match behavior {
            Behavior::Respond(delay, response) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Behavior::Fail(error) => Err(error),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

fn fake_probe(fake: FakeTransport, config: ProbeConfig) -> (Arc<FakeTransport>, TrackerProbe<Arc<FakeTransport>>) {
    let fake = Arc::new(fake);
    (fake.clone(), TrackerProbe::new(fake, config))
}

// --- classification -------------------------------------------------------

#[test]
fn test_route_classification() {
    let probe = TrackerProbe::new(MockTransport::new(), ProbeConfig::default());

    assert_eq!(probe.route("http://t.example/announce"), Route::Direct);
    assert_eq!(probe.route("https://t.example/announce"), Route::Direct);
    assert_eq!(
        probe.route("udp://t.example:1337"),
        Route::Skip(ProbeError::UnsupportedTransport("udp".into()))
    );
    assert_eq!(
        probe.route("UDP://t.example:1337"),
        Route::Skip(ProbeError::UnsupportedTransport("udp".into()))
    );
    assert_eq!(
        probe.route("wss://t.example"),
        Route::Skip(ProbeError::UnsupportedTransport("wss".into()))
    );
    assert_eq!(
        probe.route("t.example/announce"),
        Route::Skip(ProbeError::InvalidUrl("t.example/announce".into()))
    );
    assert_eq!(
        probe.route("://t.example"),
        Route::Skip(ProbeError::InvalidUrl("://t.example".into()))
    );
}

#[test]
fn test_route_from_secure_origin() {
    let probe = TrackerProbe::new(MockTransport::new(), relayed_config());

    assert_eq!(probe.route("http://t.example/announce"), Route::Relay);
    assert_eq!(probe.route("HTTP://t.example/announce"), Route::Relay);
    assert_eq!(probe.route("https://t.example/announce"), Route::Direct);
}

#[test]
fn test_relay_url_encodes_target() {
    assert_eq!(
        relay_url("https://corsproxy.io/?", "http://t.example:80/announce?x=1"),
        "https://corsproxy.io/?http%3A%2F%2Ft.example%3A80%2Fannounce%3Fx%3D1"
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        ProbeError::UnsupportedTransport("udp".into()).to_string(),
        "UDP not supported"
    );
    assert_eq!(ProbeError::Timeout.to_string(), "timeout");
    assert_eq!(
        ProbeError::RelayExhausted.to_string(),
        "all proxies exhausted (timed out)"
    );
    assert_eq!(ProbeError::RelayStatus(403).to_string(), "proxy status 403");
}

#[test]
fn test_default_config() {
    let config = ProbeConfig::default();
    assert_eq!(config.direct_timeout, Duration::from_millis(5000));
    assert!(config.relay_timeout > config.direct_timeout);
    assert_eq!(config.max_concurrent, 10);
    assert!(!config.secure_origin);
    assert_eq!(config.relays.len(), 2);

    let policy = &config.policy;
    assert!(policy.direct_reachable(&ProbeResponse::opaque()));
    assert!(policy.direct_reachable(&ProbeResponse::new(503)));
    assert!(policy.upstream_reachable(400));
    assert!(policy.upstream_reachable(499));
    assert!(!policy.upstream_reachable(500));
    assert!(policy.relay_ok(204));
    assert!(!policy.relay_ok(301));
}

#[test]
fn test_upstream_status_envelope() {
    assert_eq!(upstream_status(br#"{"status":{"http_code":404}}"#), Some(404));
    assert_eq!(
        upstream_status(br#"{"contents":"d8:intervali900ee","status":{"url":"x","http_code":200}}"#),
        Some(200)
    );
    assert_eq!(upstream_status(br#"{"status":{}}"#), None);
    assert_eq!(upstream_status(br#"{"contents":""}"#), None);
    assert_eq!(upstream_status(b"d14:failure reason3:badee"), None);
    assert_eq!(upstream_status(b""), None);
}

// --- skip ------------------------------------------------------------------

#[tokio::test]
async fn test_udp_is_skipped_without_network() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let probe = TrackerProbe::new(transport, ProbeConfig::default());

    let result = probe.probe("udp://tracker.example:6969/announce").await;

    assert_eq!(result.url, "udp://tracker.example:6969/announce");
    assert!(!result.success);
    assert_eq!(result.elapsed_ms, 0);
    assert_eq!(result.status, None);
    assert_eq!(
        result.error,
        Some(ProbeError::UnsupportedTransport("udp".into()))
    );
    assert_eq!(result.error_message().as_deref(), Some("UDP not supported"));
}

// --- direct ----------------------------------------------------------------

#[tokio::test]
async fn test_direct_success() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|req| {
            req.url == "https://t.example/announce"
                && req.method == Method::Head
                && req.mode == RequestMode::NoCors
        })
        .times(1)
        .returning(|_| Ok(ProbeResponse::new(404)));
    let probe = TrackerProbe::new(transport, ProbeConfig::default());

    let result = probe.probe("https://t.example/announce").await;

    assert!(result.success);
    assert_eq!(result.status, Some(404));
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_direct_opaque_response_is_success() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Ok(ProbeResponse::opaque()));
    let probe = TrackerProbe::new(transport, ProbeConfig::default());

    let result = probe.probe("http://t.example/announce").await;

    assert!(result.success);
    assert_eq!(result.status, None);
}

#[tokio::test]
async fn test_direct_policy_is_configurable() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(2)
        .returning(|req| {
            if req.url.contains("opaque") {
                Ok(ProbeResponse::opaque())
            } else {
                Ok(ProbeResponse::new(502))
            }
        });
    let policy = ReachabilityPolicy {
        accept_opaque: false,
        direct_status: 200..=399,
        ..ReachabilityPolicy::default()
    };
    let probe = TrackerProbe::new(transport, ProbeConfig::default().with_policy(policy));

    let result = probe.probe("https://t.example/announce").await;
    assert!(!result.success);
    assert_eq!(result.status, Some(502));
    assert_eq!(result.error, Some(ProbeError::Status(502)));

    let result = probe.probe("https://opaque.example/announce").await;
    assert!(!result.success);
    assert_eq!(result.status, None);
}

#[tokio::test]
async fn test_direct_transport_error() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .returning(|_| Err(ProbeError::Transport("connection refused".into())));
    let probe = TrackerProbe::new(transport, ProbeConfig::default());

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(
        result.error,
        Some(ProbeError::Transport("connection refused".into()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_direct_timeout() {
    let fake = FakeTransport::default().rule("http://slow", None, Behavior::Hang);
    let (fake, probe) = fake_probe(fake, ProbeConfig::default());

    let result = probe.probe("http://slow.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.error, Some(ProbeError::Timeout));
    assert_eq!(result.error_message().as_deref(), Some("timeout"));
    assert!(result.elapsed_ms >= 5000);
    assert!(result.elapsed_ms < 6000);
    assert_eq!(fake.in_flight.load(Ordering::SeqCst), 0);
}

// --- relay chain -----------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_relay_timeout_moves_to_next_relay() {
    let fake = FakeTransport::default()
        .rule(RELAY_A, None, Behavior::Hang)
        .rule(RELAY_B, None, Behavior::Respond(Duration::from_millis(200), ProbeResponse::new(200)));
    let (fake, probe) = fake_probe(fake, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(result.success);
    assert_eq!(result.url, "http://t.example/announce");
    assert_eq!(result.status, Some(200));
    assert!(result.elapsed_ms >= 30_200);

    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].url,
        "https://relay-a.example/?http%3A%2F%2Ft.example%2Fannounce"
    );
    assert_eq!(
        calls[1].url,
        "https://relay-b.example/get?url=http%3A%2F%2Ft.example%2Fannounce"
    );
    assert!(calls.iter().all(|c| c.mode == RequestMode::Cors));
}

#[tokio::test]
async fn test_relay_get_retry_reads_upstream_status() {
    let fake = FakeTransport::default()
        .rule(RELAY_A, Some(Method::Head), Behavior::Respond(Duration::ZERO, ProbeResponse::new(405)))
        .rule(
            RELAY_A,
            Some(Method::Get),
            Behavior::Respond(
                Duration::ZERO,
                ProbeResponse::new(200).with_body(r#"{"status":{"http_code":400}}"#),
            ),
        );
    let (fake, probe) = fake_probe(fake, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(result.success);
    assert_eq!(result.status, Some(400));
    let methods: Vec<_> = fake.calls().iter().map(|c| c.method).collect();
    assert_eq!(methods, vec![Method::Head, Method::Get]);
}

#[tokio::test]
async fn test_relay_upstream_server_error_stops_chain() {
    let fake = FakeTransport::default()
        .rule(
            RELAY_A,
            None,
            Behavior::Respond(
                Duration::ZERO,
                ProbeResponse::new(200).with_body(r#"{"status":{"http_code":503}}"#),
            ),
        )
        .rule(RELAY_B, None, Behavior::Respond(Duration::ZERO, ProbeResponse::new(200)));
    let (fake, probe) = fake_probe(fake, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.status, Some(503));
    assert_eq!(result.error, Some(ProbeError::UpstreamStatus(503)));
    assert!(fake.calls().iter().all(|c| c.url.starts_with(RELAY_A)));
}

#[tokio::test]
async fn test_relay_rejection_stops_chain() {
    let fake = FakeTransport::default()
        .rule(RELAY_A, None, Behavior::Respond(Duration::ZERO, ProbeResponse::new(403)))
        .rule(RELAY_B, None, Behavior::Respond(Duration::ZERO, ProbeResponse::new(200)));
    let (fake, probe) = fake_probe(fake, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.status, Some(403));
    assert_eq!(result.error, Some(ProbeError::RelayStatus(403)));
    assert_eq!(fake.calls().len(), 2);
    assert!(fake.calls().iter().all(|c| c.url.starts_with(RELAY_A)));
}

#[tokio::test]
async fn test_relay_transport_error_stops_chain() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|req| req.url.starts_with(RELAY_A))
        .times(1)
        .returning(|_| Err(ProbeError::Transport("dns error".into())));
    transport
        .expect_send()
        .withf(|req| req.url.starts_with(RELAY_B))
        .never();
    let probe = TrackerProbe::new(transport, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.error, Some(ProbeError::Transport("dns error".into())));
}

#[tokio::test]
async fn test_relay_reported_timeout_moves_to_next_relay() {
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|req| req.url.starts_with(RELAY_A))
        .times(1)
        .returning(|_| Err(ProbeError::Timeout));
    transport
        .expect_send()
        .withf(|req| req.url.starts_with(RELAY_B))
        .times(1)
        .returning(|_| Ok(ProbeResponse::new(204)));
    let probe = TrackerProbe::new(transport, relayed_config());

    let result = probe.probe("http://t.example/announce").await;

    assert!(result.success);
    assert_eq!(result.status, Some(204));
}

#[tokio::test(start_paused = true)]
async fn test_all_relays_time_out() {
    let fake = FakeTransport::default().rule("https://relay", None, Behavior::Hang);
    let (fake, probe) = fake_probe(
        fake,
        relayed_config().with_relay_timeout(Duration::from_secs(10)),
    );

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.error, Some(ProbeError::RelayExhausted));
    assert!(result.elapsed_ms >= 20_000);
    assert_eq!(fake.calls().len(), 2);
    assert_eq!(fake.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_relays_configured() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let config = relayed_config().with_relays(Vec::<String>::new());
    let probe = TrackerProbe::new(transport, config);

    let result = probe.probe("http://t.example/announce").await;

    assert!(!result.success);
    assert_eq!(result.error, Some(ProbeError::RelayExhausted));
}

// --- batch -----------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_batch_groups_and_order() {
    let ms = Duration::from_millis;
    let fake = FakeTransport::default()
        .rule("http://u1", None, Behavior::Respond(ms(300), ProbeResponse::new(200)))
        .rule("http://u2", None, Behavior::Respond(ms(100), ProbeResponse::new(200)))
        .rule("http://u3", None, Behavior::Respond(ms(50), ProbeResponse::new(200)))
        .rule("http://u4", None, Behavior::Respond(ms(400), ProbeResponse::new(200)))
        .rule("http://u5", None, Behavior::Fail(ProbeError::Transport("refused".into())));
    let (fake, probe) = fake_probe(fake, ProbeConfig::default());
    let urls = ["http://u1", "http://u2", "http://u3", "http://u4", "http://u5"];

    let start = Instant::now();
    let results = check_trackers(&probe, &urls, 2).await;

    let order: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(order, urls);
    assert_eq!(
        results.iter().map(|r| r.success).collect::<Vec<_>>(),
        vec![true, true, true, true, false]
    );
    assert_eq!(fake.peak.load(Ordering::SeqCst), 2);

    // Groups of 2, 2, 1: each group starts once the slowest of the previous
    // group has finished.
    let starts: Vec<_> = fake.start_times().iter().map(|t| *t - start).collect();
    assert_eq!(starts, vec![ms(0), ms(0), ms(300), ms(300), ms(700)]);
}

#[tokio::test(start_paused = true)]
async fn test_batch_zero_limit_runs_one_at_a_time() {
    let fake = FakeTransport::default().rule(
        "http://",
        None,
        Behavior::Respond(Duration::from_millis(10), ProbeResponse::new(200)),
    );
    let (fake, probe) = fake_probe(fake, ProbeConfig::default());
    let urls = vec!["http://a".to_string(), "http://b".to_string(), "http://c".to_string()];

    let results = check_trackers(&probe, &urls, 0).await;

    assert_eq!(results.len(), 3);
    assert_eq!(fake.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_check_all_uses_configured_limit() {
    let fake = FakeTransport::default().rule(
        "https://",
        None,
        Behavior::Respond(Duration::from_millis(10), ProbeResponse::new(200)),
    );
    let (fake, probe) = fake_probe(fake, ProbeConfig::default().with_max_concurrent(3));
    let urls: Vec<String> = (0..10).map(|i| format!("https://t{}.example", i)).collect();

    let results = probe.check_all(&urls).await;

    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(fake.peak.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_batch_failures_stay_in_place() {
    let fake = FakeTransport::default()
        .rule("http://slow", None, Behavior::Hang)
        .rule("http://", None, Behavior::Respond(Duration::ZERO, ProbeResponse::new(200)));
    let (_fake, probe) = fake_probe(fake, ProbeConfig::default());
    let urls = ["http://slow.example", "udp://t.example:80", "http://ok.example"];

    let results = check_trackers(&probe, &urls, 10).await;

    assert_eq!(results[0].error, Some(ProbeError::Timeout));
    assert_eq!(results[1].elapsed_ms, 0);
    assert_eq!(
        results[1].error,
        Some(ProbeError::UnsupportedTransport("udp".into()))
    );
    assert!(results[2].success);
}

#[tokio::test]
async fn test_batch_empty() {
    let mut transport = MockTransport::new();
    transport.expect_send().never();
    let probe = TrackerProbe::new(transport, ProbeConfig::default());

    let results = check_trackers(&probe, &Vec::<String>::new(), 4).await;
    assert!(results.is_empty());
}

// --- HttpTransport ---------------------------------------------------------

/// Serves `response` to the first connection and returns the raw request.
async fn serve_once(response: String) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}/announce", addr), handle)
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

#[tokio::test]
async fn test_http_transport_head() {
    let (url, server) = serve_once(http_response("400 Bad Request", "")).await;
    let transport = HttpTransport::new().unwrap();

    let response = transport
        .send(&ProbeRequest::new(url, Method::Head, RequestMode::NoCors))
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(!response.opaque);
    assert!(response.body.is_empty());

    let request = server.await.unwrap();
    assert!(request.starts_with("HEAD /announce HTTP/1.1\r\n"));
    assert!(request
        .to_ascii_lowercase()
        .contains(&format!("user-agent: {}", crate::constants::USER_AGENT)));
}

#[tokio::test]
async fn test_http_transport_get_reads_body() {
    let body = r#"{"status":{"http_code":301}}"#;
    let (url, server) = serve_once(http_response("200 OK", body)).await;
    let transport = HttpTransport::new().unwrap();

    let response = transport
        .send(&ProbeRequest::new(url, Method::Get, RequestMode::Cors))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body.as_ref(), body.as_bytes());
    assert!(server.await.unwrap().starts_with("GET /announce"));
}

#[tokio::test]
async fn test_http_probe_end_to_end() {
    let (url, _server) = serve_once(http_response("404 Not Found", "")).await;
    let probe = TrackerProbe::http(ProbeConfig::default()).unwrap();

    let result = probe.probe(&url).await;

    assert!(result.success);
    assert_eq!(result.url, url);
    assert_eq!(result.status, Some(404));
}

#[tokio::test]
async fn test_http_probe_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/announce", listener.local_addr().unwrap());
    drop(listener);
    let probe = TrackerProbe::http(ProbeConfig::default()).unwrap();

    let result = probe.probe(&url).await;

    assert!(!result.success);
    assert!(matches!(result.error, Some(ProbeError::Transport(_))));
}
