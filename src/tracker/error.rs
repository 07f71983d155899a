use thiserror::Error;

/// Why a probe did not report the tracker as reachable.
///
/// Probe errors are data, not control flow: they are stored in
/// [`ProbeResult::error`](super::ProbeResult::error) and never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The scheme cannot be probed with an HTTP request (e.g. `udp`).
    #[error("{} not supported", .0.to_uppercase())]
    UnsupportedTransport(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    /// A direct response the reachability policy rejected.
    #[error("returned {0}")]
    Status(u16),

    /// The relay itself refused or failed the request.
    #[error("proxy status {0}")]
    RelayStatus(u16),

    /// The relay reached the tracker, which answered with this status.
    #[error("tracker returned {0}")]
    UpstreamStatus(u16),

    /// Every configured relay timed out, or none are configured.
    #[error("all proxies exhausted (timed out)")]
    RelayExhausted,
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else {
            ProbeError::Transport(error_chain(&err))
        }
    }
}

/// reqwest's top-level message rarely names the cause ("error sending
/// request"); append the sources so "connection refused" is visible.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
