//! Tracker reachability probing.
//!
//! This is not the tracker protocol: no announce or scrape is sent. A probe
//! only answers "does something answer at this URL within the time limit".
//!
//! - `udp://` (and any other non-HTTP scheme) is skipped without a request.
//! - `http(s)://` is probed directly with a `HEAD`, unless the caller is in a
//!   secure context that blocks plain `http`, in which case the request goes
//!   through a chain of relays. A relay that times out hands over to the
//!   next; any other answer ends the chain.
//! - [`check_trackers`] runs many probes in bounded, ordered groups.
//!
//! # Examples
//!
//! ```no_run
//! use torrent_probe::tracker::{ProbeConfig, TrackerProbe};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let probe = TrackerProbe::http(ProbeConfig::default())?;
//! let results = probe
//!     .check_all(&["http://tracker.example.com/announce", "udp://tracker.example.com:80"])
//!     .await;
//!
//! for result in &results {
//!     println!("{} {} {}ms", result.url, result.success, result.elapsed_ms);
//! }
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod error;
mod probe;
mod result;
mod transport;

pub use batch::check_trackers;
pub use config::{ProbeConfig, ReachabilityPolicy};
pub use error::ProbeError;
pub use probe::{relay_url, Route, TrackerProbe};
pub use result::ProbeResult;
pub use transport::{HttpTransport, Method, ProbeRequest, ProbeResponse, ProbeTransport, RequestMode};

#[cfg(test)]
mod tests;
