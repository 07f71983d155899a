use super::batch::check_trackers;
use super::config::ProbeConfig;
use super::error::ProbeError;
use super::result::ProbeResult;
use super::transport::{HttpTransport, Method, ProbeRequest, ProbeResponse, ProbeTransport, RequestMode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

/// How a tracker URL will be probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No request is possible; the probe fails immediately with this error.
    Skip(ProbeError),
    Direct,
    /// Through the configured relays, in order.
    Relay,
}

/// Reachability checker for tracker URLs.
///
/// Holds no per-probe state: every call gets its own timers, and the config
/// is shared read-only, so one probe can never affect another.
pub struct TrackerProbe<T> {
    transport: T,
    config: Arc<ProbeConfig>,
}

impl TrackerProbe<HttpTransport> {
    /// A probe backed by a fresh `reqwest` client.
    pub fn http(config: ProbeConfig) -> Result<Self, ProbeError> {
        Ok(Self::new(HttpTransport::new()?, config))
    }
}

impl<T: ProbeTransport> TrackerProbe<T> {
    pub fn new(transport: T, config: ProbeConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Picks the route for `url` without touching the network.
    pub fn route(&self, url: &str) -> Route {
        let scheme = match url.split_once("://") {
            Some((scheme, _)) if !scheme.is_empty() => scheme.to_ascii_lowercase(),
            _ => return Route::Skip(ProbeError::InvalidUrl(url.to_string())),
        };

        match scheme.as_str() {
            "http" if self.config.secure_origin => Route::Relay,
            "http" | "https" => Route::Direct,
            _ => Route::Skip(ProbeError::UnsupportedTransport(scheme)),
        }
    }

    /// Probes one tracker. Never fails: errors are reported in the result.
    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();

        match self.route(url) {
            Route::Skip(error) => {
                debug!(url, %error, "skipping tracker");
                ProbeResult::failed(url, 0, None, error)
            }
            Route::Direct => self.probe_direct(url, start).await,
            Route::Relay => self.probe_relays(url, start).await,
        }
    }

    /// Probes every URL with the configured concurrency limit.
    pub async fn check_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<ProbeResult> {
        check_trackers(self, urls, self.config.max_concurrent).await
    }

    async fn send_within(
        &self,
        limit: Duration,
        request: ProbeRequest,
    ) -> Result<ProbeResponse, ProbeError> {
        timeout(limit, self.transport.send(&request))
            .await
            .map_err(|_| ProbeError::Timeout)?
    }

    async fn probe_direct(&self, url: &str, start: Instant) -> ProbeResult {
        let request = ProbeRequest::new(url, Method::Head, RequestMode::NoCors);
        let outcome = self.send_within(self.config.direct_timeout, request).await;
        let elapsed_ms = elapsed_ms(start);

        match outcome {
            Ok(response) => {
                let status = (!response.opaque).then_some(response.status);
                if self.config.policy.direct_reachable(&response) {
                    debug!(url, elapsed_ms, ?status, "direct probe succeeded");
                    ProbeResult::reachable(url, elapsed_ms, status)
                } else {
                    debug!(url, elapsed_ms, ?status, "direct probe rejected by policy");
                    ProbeResult::failed(url, elapsed_ms, status, ProbeError::Status(response.status))
                }
            }
            Err(error) => {
                debug!(url, elapsed_ms, %error, "direct probe failed");
                ProbeResult::failed(url, elapsed_ms, None, error)
            }
        }
    }

    async fn probe_relays(&self, url: &str, start: Instant) -> ProbeResult {
        for relay in &self.config.relays {
            let relayed = relay_url(relay, url);

            match timeout(self.config.relay_timeout, self.relay_attempt(&relayed)).await {
                Err(_) | Ok(Err(ProbeError::Timeout)) => {
                    debug!(url, relay = relay.as_str(), "relay timed out, trying next");
                }
                Ok(Err(error)) => {
                    let elapsed_ms = elapsed_ms(start);
                    warn!(url, relay = relay.as_str(), %error, "relay request failed");
                    return ProbeResult::failed(url, elapsed_ms, None, error);
                }
                Ok(Ok(response)) => {
                    return self.judge_relayed(url, elapsed_ms(start), &response);
                }
            }
        }

        debug!(url, relays = self.config.relays.len(), "no relay answered");
        ProbeResult::failed(url, elapsed_ms(start), None, ProbeError::RelayExhausted)
    }

    /// HEAD first; relays that reject HEAD get a GET retry on the same
    /// deadline.
    async fn relay_attempt(&self, relayed: &str) -> Result<ProbeResponse, ProbeError> {
        let head = self
            .transport
            .send(&ProbeRequest::new(relayed, Method::Head, RequestMode::Cors))
            .await?;
        if self.config.policy.relay_ok(head.status) {
            return Ok(head);
        }

        debug!(relayed, status = head.status, "relay rejected HEAD, retrying with GET");
        self.transport
            .send(&ProbeRequest::new(relayed, Method::Get, RequestMode::Cors))
            .await
    }

    fn judge_relayed(&self, url: &str, elapsed_ms: u64, response: &ProbeResponse) -> ProbeResult {
        let policy = &self.config.policy;

        let result = match upstream_status(&response.body) {
            Some(code) if policy.upstream_reachable(code) => {
                ProbeResult::reachable(url, elapsed_ms, Some(code))
            }
            Some(code) => {
                ProbeResult::failed(url, elapsed_ms, Some(code), ProbeError::UpstreamStatus(code))
            }
            None if policy.relay_ok(response.status) => {
                ProbeResult::reachable(url, elapsed_ms, Some(response.status))
            }
            None => ProbeResult::failed(
                url,
                elapsed_ms,
                Some(response.status),
                ProbeError::RelayStatus(response.status),
            ),
        };

        if result.success {
            debug!(url, elapsed_ms, status = ?result.status, "relayed probe succeeded");
        } else {
            warn!(url, elapsed_ms, status = ?result.status, "relayed probe failed");
        }
        result
    }
}

/// Rewrites `target` through a relay prefix.
pub fn relay_url(prefix: &str, target: &str) -> String {
    format!("{}{}", prefix, urlencoding::encode(target))
}

#[derive(Deserialize)]
struct RelayEnvelope {
    status: Option<RelayEnvelopeStatus>,
}

#[derive(Deserialize)]
struct RelayEnvelopeStatus {
    http_code: Option<u16>,
}

/// The tracker's own status, for relays that wrap the upstream response in
/// a JSON envelope (`{"status": {"http_code": 404}, ...}`).
pub(crate) fn upstream_status(body: &[u8]) -> Option<u16> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<RelayEnvelope>(body)
        .ok()?
        .status?
        .http_code
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
