use super::transport::ProbeResponse;
use crate::constants::{
    DEFAULT_RELAYS, DIRECT_PROBE_TIMEOUT, DIRECT_REACHABLE_STATUS, MAX_CONCURRENT_PROBES,
    RELAY_OK_STATUS, RELAY_PROBE_TIMEOUT, UPSTREAM_REACHABLE_STATUS,
};
use std::ops::RangeInclusive;
use std::time::Duration;

/// What counts as "reachable".
///
/// These are heuristics, not protocol guarantees: a reachability probe is not
/// an announce, so a live tracker frequently answers it with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityPolicy {
    /// Treat an opaque response (status hidden by the transport) as success.
    pub accept_opaque: bool,
    /// Direct response statuses that count as reachable.
    pub direct_status: RangeInclusive<u16>,
    /// Relay statuses that mean the relay did its job.
    pub relay_status: RangeInclusive<u16>,
    /// Upstream statuses, as embedded by the relay, that count as reachable.
    pub upstream_status: RangeInclusive<u16>,
}

impl ReachabilityPolicy {
    pub fn direct_reachable(&self, response: &ProbeResponse) -> bool {
        if response.opaque {
            self.accept_opaque
        } else {
            self.direct_status.contains(&response.status)
        }
    }

    pub fn relay_ok(&self, status: u16) -> bool {
        self.relay_status.contains(&status)
    }

    pub fn upstream_reachable(&self, status: u16) -> bool {
        self.upstream_status.contains(&status)
    }
}

impl Default for ReachabilityPolicy {
    fn default() -> Self {
        Self {
            accept_opaque: true,
            direct_status: DIRECT_REACHABLE_STATUS,
            relay_status: RELAY_OK_STATUS,
            upstream_status: UPSTREAM_REACHABLE_STATUS,
        }
    }
}

/// Everything tunable about probing, in one value.
///
/// ```
/// use std::time::Duration;
/// use torrent_probe::tracker::ProbeConfig;
///
/// let config = ProbeConfig::default()
///     .with_secure_origin(true)
///     .with_relays(["https://relay.example/?url="])
///     .with_direct_timeout(Duration::from_secs(2))
///     .with_max_concurrent(4);
///
/// assert_eq!(config.relays, vec!["https://relay.example/?url=".to_string()]);
/// assert_eq!(config.relay_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Relay URL prefixes, tried top to bottom.
    pub relays: Vec<String>,
    pub direct_timeout: Duration,
    /// Bound on each relay attempt, not on the whole chain.
    pub relay_timeout: Duration,
    /// Group size for batch checks; 0 behaves like 1.
    pub max_concurrent: usize,
    /// The caller runs in a secure (`https`) context that blocks plain
    /// `http` requests, so those must go through a relay.
    pub secure_origin: bool,
    pub policy: ReachabilityPolicy,
}

impl ProbeConfig {
    pub fn with_relays<I, S>(mut self, relays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relays = relays.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_direct_timeout(mut self, timeout: Duration) -> Self {
        self.direct_timeout = timeout;
        self
    }

    pub fn with_relay_timeout(mut self, timeout: Duration) -> Self {
        self.relay_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_secure_origin(mut self, secure_origin: bool) -> Self {
        self.secure_origin = secure_origin;
        self
    }

    pub fn with_policy(mut self, policy: ReachabilityPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            relays: DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
            direct_timeout: DIRECT_PROBE_TIMEOUT,
            relay_timeout: RELAY_PROBE_TIMEOUT,
            max_concurrent: MAX_CONCURRENT_PROBES,
            secure_origin: false,
            policy: ReachabilityPolicy::default(),
        }
    }
}
