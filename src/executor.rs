//! Bounded fan-out for independent async jobs.
//!
//! Jobs are driven as a `buffer_unordered` stream on the calling task, and each
//! one holds a semaphore permit while it runs. Nothing is spawned, so the
//! caller's runtime keeps polling other work while jobs are in flight.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

pub const DEFAULT_CONCURRENCY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedExecutor {
    limit: usize,
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl BoundedExecutor {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `work` for every job with at most `limit` jobs in flight.
    ///
    /// Returns one value per job, in submission order. `work` receives the
    /// job's submission index. Error handling belongs to `work`: have it return
    /// a settled value (a `Result` or an outcome enum) so one failing job
    /// cannot disturb the others.
    pub async fn run<J, T, F, Fut>(&self, jobs: Vec<J>, work: F) -> Vec<T>
    where
        F: Fn(usize, J) -> Fut,
        Fut: Future<Output = T>,
    {
        self.run_with_progress(jobs, work, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `progress(settled, total)` after each job settles.
    pub async fn run_with_progress<J, T, F, Fut, P>(
        &self,
        jobs: Vec<J>,
        work: F,
        progress: P,
    ) -> Vec<T>
    where
        F: Fn(usize, J) -> Fut,
        Fut: Future<Output = T>,
        P: Fn(usize, usize),
    {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let semaphore = Semaphore::new(self.limit);
        let settled = AtomicUsize::new(0);

        let semaphore = &semaphore;
        let settled = &settled;
        let work = &work;
        let progress = &progress;

        let mut results: Vec<(usize, T)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(index, job)| async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire().await.ok();

                let value = work(index, job).await;

                let done = settled.fetch_add(1, Ordering::SeqCst) + 1;
                progress(done, total);
                (index, value)
            })
            .buffer_unordered(self.limit)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, value)| value).collect()
    }
}
