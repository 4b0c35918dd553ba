//! Stress tests for selstore.
//!
//! These exercise recording and replay under volume and from many threads.

use crate::fixtures::generate_cids;
use crate::selectors::explore_all_recursively;
use selstore_core::{
    loader_fn, BlockReader, Cid, Link, LinkContext, LoadResult, Path, SelectorStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of traversals to record or replay.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Links loaded per recorded traversal.
    pub links_per_traversal: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            links_per_traversal: 32,
        }
    }
}

fn empty_loader() -> impl FnMut(&LinkContext, &Link) -> LoadResult {
    loader_fn(|_: &LinkContext, _: &Link| Ok(Box::new(std::io::empty()) as BlockReader))
}

/// Records one traversal of `links` from `root` and commits it.
fn record(store: &SelectorStore, root: &Cid, links: &[Cid]) -> bool {
    let Ok(mut writer) = store.new_traversal(root, &explore_all_recursively(), empty_loader())
    else {
        return false;
    };
    for (i, cid) in links.iter().enumerate() {
        let ctx = LinkContext::new(Path::root().join("links").join(i));
        if writer.load(&ctx, &Link::new(*cid)).is_err() {
            return false;
        }
    }
    writer.commit().is_ok()
}

/// Records `operations` traversals, one after another, each from its own
/// root.
pub fn stress_sequential_recordings(
    store: &SelectorStore,
    config: &StressConfig,
) -> StressTestResult {
    let links = generate_cids(config.links_per_traversal);
    let roots = generate_cids(config.operations);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for root in &roots {
        if record(store, root, &links) {
            successful += 1;
        } else {
            failed += 1;
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Records one traversal, then replays it `operations` times, checking
/// every replay yields all recorded links.
pub fn stress_replays(store: &SelectorStore, config: &StressConfig) -> StressTestResult {
    let links = generate_cids(config.links_per_traversal);
    let root = generate_cids(1)[0];
    let selector = explore_all_recursively();
    let recorded = record(store, &root, &links);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for _ in 0..config.operations {
        let replayed = store
            .get(&root, &selector)
            .and_then(|iter| iter.collect_links());
        match replayed {
            Ok(records) if recorded && records.len() == links.len() => successful += 1,
            _ => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Records traversals from several threads at once, each thread using its
/// own roots, then checks every one of them is stored.
pub fn stress_concurrent_recordings(
    store: &SelectorStore,
    config: &StressConfig,
) -> StressTestResult {
    let links = Arc::new(generate_cids(config.links_per_traversal));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);
    let selector = explore_all_recursively();

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let store = store.clone();
            let links = Arc::clone(&links);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let selector = selector.clone();

            thread::spawn(move || {
                for root in generate_cids(ops_per_thread) {
                    let stored = record(&store, &root, &links)
                        && store.has(&root, &selector).unwrap_or(false);
                    if stored {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Commits the same (root, selector) pair from several threads, each with
/// a different number of links, then checks the stored log is exactly one
/// of the committed ones.
///
/// Returns the number of links in the surviving log.
pub fn stress_same_key_commits(store: &SelectorStore, config: &StressConfig) -> Option<usize> {
    let root = generate_cids(1)[0];
    let links = Arc::new(generate_cids(config.threads));

    let handles: Vec<_> = (1..=config.threads)
        .map(|n| {
            let store = store.clone();
            let links = Arc::clone(&links);
            thread::spawn(move || record(&store, &root, &links[..n]))
        })
        .collect();

    let all_committed = handles
        .into_iter()
        .all(|handle| handle.join().expect("Thread panicked"));
    if !all_committed {
        return None;
    }

    let survivor = store
        .get(&root, &explore_all_recursively())
        .and_then(|iter| iter.collect_links())
        .ok()?;
    let len = survivor.len();
    let is_prefix = survivor
        .iter()
        .zip(links.iter())
        .all(|(record, cid)| record.link().cid() == cid);
    (len >= 1 && len <= config.threads && is_prefix).then_some(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestStore;

    #[test]
    fn test_sequential_recordings() {
        let store = TestStore::memory();
        let config = StressConfig {
            operations: 200,
            links_per_traversal: 8,
            ..Default::default()
        };

        let result = stress_sequential_recordings(&store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 200);
    }

    #[test]
    fn test_replays() {
        let store = TestStore::memory();
        let config = StressConfig {
            operations: 200,
            links_per_traversal: 16,
            ..Default::default()
        };

        let result = stress_replays(&store, &config);
        assert_eq!(result.failed_ops, 0);
    }

    #[test]
    fn test_concurrent_recordings() {
        let store = TestStore::memory();
        let config = StressConfig {
            operations: 400,
            threads: 4,
            links_per_traversal: 8,
        };

        let result = stress_concurrent_recordings(&store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 400);
    }

    #[test]
    fn test_same_key_commits_leave_one_whole_log() {
        let store = TestStore::file();
        let config = StressConfig {
            threads: 8,
            ..Default::default()
        };

        assert!(stress_same_key_commits(&store, &config).is_some());
    }
}
