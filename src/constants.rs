//! Defaults for the tracker probe.
//!
//! These are the values [`ProbeConfig::default`] starts from. The relay list
//! and the timeouts are the parts most likely to need tuning per deployment,
//! so everything reads them from a [`ProbeConfig`] rather than from here.
//!
//! [`ProbeConfig`]: crate::tracker::ProbeConfig
//! [`ProbeConfig::default`]: crate::tracker::ProbeConfig::default

use std::ops::RangeInclusive;
use std::time::Duration;

// ============================================================================
// Client identification
// ============================================================================

/// User agent string for HTTP requests
pub const USER_AGENT: &str = concat!("torrent-probe/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Timeouts
// ============================================================================

/// Bound on a direct reachability request.
pub const DIRECT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Bound on one relay attempt (HEAD plus optional GET retry).
/// Relays add a full extra round trip to the tracker, so this is well above
/// the direct timeout.
pub const RELAY_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Scheduling
// ============================================================================

/// Probes in flight at once during a batch check.
pub const MAX_CONCURRENT_PROBES: usize = 10;

// ============================================================================
// Relays
// ============================================================================

/// Relay URL prefixes, tried in order. The percent-encoded tracker URL is
/// appended to each.
pub const DEFAULT_RELAYS: &[&str] = &["https://corsproxy.io/?", "https://api.allorigins.win/get?url="];

// ============================================================================
// Reachability heuristics
// ============================================================================

/// Any HTTP answer at all means the tracker host is up.
pub const DIRECT_REACHABLE_STATUS: RangeInclusive<u16> = 100..=599;

/// Relay's own status that counts as a successful relay.
pub const RELAY_OK_STATUS: RangeInclusive<u16> = 200..=299;

/// Upstream status (as reported by the relay) that counts as reachable.
/// A bare probe often gets a 4xx rejection from a live tracker, so client
/// errors are included; only 5xx means the tracker is down.
pub const UPSTREAM_REACHABLE_STATUS: RangeInclusive<u16> = 100..=499;
