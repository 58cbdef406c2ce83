//! Fire-and-collect runner for independent teardown tasks
//!
//! Runs a fixed list of labelled fallible futures concurrently, waits for
//! every one of them (no early cancellation: partial independent work must
//! still complete), and aggregates every failure into a single
//! [`CloudError::Aggregate`]. Results land in submission-order slots, so
//! the aggregate text is deterministic regardless of completion order.

use cumulus_cloud::error::{CloudError, Result};
use futures_util::future::{BoxFuture, join_all};

/// One labelled fallible task. The label names the resource the task
/// works on and prefixes its entry in the aggregate error.
pub type Task<'a> = (String, BoxFuture<'a, Result<()>>);

/// Run every task concurrently and join them all.
///
/// Returns `Ok(())` only when every task succeeded; otherwise an
/// [`CloudError::Aggregate`] listing each failure in submission order.
/// An empty task list succeeds.
pub async fn run_all(tasks: Vec<Task<'_>>) -> Result<()> {
    let (labels, futures): (Vec<_>, Vec<_>) = tasks.into_iter().unzip();
    let results = join_all(futures).await;

    let failures: Vec<String> = labels
        .into_iter()
        .zip(results)
        .filter_map(|(label, result)| result.err().map(|err| format!("{label}: {err}")))
        .collect();

    match CloudError::aggregate(failures) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
