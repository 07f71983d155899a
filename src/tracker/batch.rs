use super::probe::TrackerProbe;
use super::result::ProbeResult;
use super::transport::ProbeTransport;
use futures::future::join_all;
use tracing::debug;

/// Probes `urls` in consecutive groups of at most `max_concurrent`.
///
/// Groups run one after another; every probe in a group runs concurrently
/// and the whole group finishes before the next one starts, so no more than
/// `max_concurrent` probes are ever unresolved. Results come back in input
/// order regardless of which probe finished first. A limit of 0 is treated
/// as 1.
pub async fn check_trackers<T, S>(
    probe: &TrackerProbe<T>,
    urls: &[S],
    max_concurrent: usize,
) -> Vec<ProbeResult>
where
    T: ProbeTransport,
    S: AsRef<str>,
{
    let group_size = max_concurrent.max(1);
    debug!(total = urls.len(), max_concurrent = group_size, "starting tracker batch");

    let mut results = Vec::with_capacity(urls.len());
    for (index, group) in urls.chunks(group_size).enumerate() {
        debug!(group = index + 1, size = group.len(), "probing group");
        let probes = group.iter().map(|url| probe.probe(url.as_ref()));
        results.extend(join_all(probes).await);
    }

    let reachable = results.iter().filter(|r| r.success).count();
    debug!(total = results.len(), reachable, "tracker batch complete");
    results
}
