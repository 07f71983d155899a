use super::error::ProbeError;

/// Outcome of probing one tracker.
///
/// `url` is always the URL that was asked about, even when the request went
/// through a relay, so results can be joined back to tracker tiers by exact
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub success: bool,
    /// Wall time from the start of the probe; 0 when no request was made.
    pub elapsed_ms: u64,
    /// The status that decided the outcome, when one was seen.
    pub status: Option<u16>,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub(crate) fn reachable(url: &str, elapsed_ms: u64, status: Option<u16>) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            elapsed_ms,
            status,
            error: None,
        }
    }

    pub(crate) fn failed(
        url: &str,
        elapsed_ms: u64,
        status: Option<u16>,
        error: ProbeError,
    ) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            elapsed_ms,
            status,
            error: Some(error),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
