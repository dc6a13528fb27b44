use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, info, warn};

use crate::error::{ExtractError, FetchError};
use crate::extractor::JobInfoExtractor;
use crate::fetcher::Fetcher;
use crate::record::{JobId, JobRecord, COLUMNS};

pub const DEFAULT_WORKERS: usize = 16;

/// Why a job ended up with only its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Fetch,
    MalformedPayload,
    WorkerPanicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub jobid: JobId,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug)]
enum TaskError {
    Fetch(FetchError),
    Extract(ExtractError),
}

/// Outcome of one batch. `records` follows submission order.
#[derive(Debug)]
pub struct BatchReport {
    pub records: Vec<JobRecord>,
    pub failures: Vec<TaskFailure>,
    pub elapsed: Duration,
}

impl BatchReport {
    /// Column-oriented view of the records, keyed by column name in table order.
    pub fn columns(&self) -> Vec<(&'static str, Vec<Option<String>>)> {
        let mut columns: Vec<(&'static str, Vec<Option<String>>)> = COLUMNS
            .iter()
            .map(|name| (*name, Vec::with_capacity(self.records.len())))
            .collect();

        for record in &self.records {
            for (column, value) in columns.iter_mut().zip(record.values()) {
                column.1.push(value);
            }
        }
        columns
    }
}

/// Runs fetch + extract over a batch of job ids on a fixed number of worker threads.
pub struct JobManager<F: Fetcher> {
    fetcher: F,
    workers: usize,
}

impl<F: Fetcher> JobManager<F> {
    pub fn new(fetcher: F, workers: usize) -> Self {
        JobManager {
            fetcher,
            workers: workers.max(1),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Collects one record per unique id, in the order the ids were given.
    ///
    /// A failing job never aborts the batch; it yields a record with only its id
    /// and an entry in [`BatchReport::failures`].
    pub fn collect(&self, jobids: &[JobId]) -> BatchReport {
        let start = Instant::now();

        let mut seen = HashSet::new();
        let jobids: Vec<&JobId> = jobids.iter().filter(|id| seen.insert(*id)).collect();
        let total = jobids.len();
        let workers = self.workers.min(total.max(1));

        info!("Collecting job info for {} jobs on {} workers", total, workers);

        let next = AtomicUsize::new(0);
        let next = &next;
        let jobids = &jobids;
        let (done_tx, done_rx) = mpsc::channel();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let done_tx = done_tx.clone();
                    scope.spawn(move || {
                        // One extractor per worker; nothing is shared between documents.
                        let extractor = JobInfoExtractor::new();
                        loop {
                            let idx = next.fetch_add(1, Ordering::Relaxed);
                            let Some(jobid) = jobids.get(idx) else { break };
                            debug!("Processing {} / {} : job {}", idx + 1, total, jobid);
                            let outcome = self.process(&extractor, jobid);
                            if done_tx.send((idx, outcome)).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            for handle in handles {
                if handle.join().is_err() {
                    warn!("A collector worker panicked; the job it was on is recorded as missing");
                }
            }
        });
        drop(done_tx);

        // Each finished job owns its slot; a slot left empty is the job a worker died on.
        let mut slots: Vec<Option<Result<JobRecord, TaskError>>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        for (idx, outcome) in done_rx {
            slots[idx] = Some(outcome);
        }

        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (slot, &jobid) in slots.into_iter().zip(jobids.iter()) {
            let (record, failure) = match slot {
                Some(Ok(record)) => (record, None),
                Some(Err(TaskError::Fetch(e))) => {
                    warn!("Failed to fetch job {}: {}", jobid, e);
                    (JobRecord::missing(jobid.clone()), Some((FailureKind::Fetch, e.to_string())))
                }
                Some(Err(TaskError::Extract(e))) => {
                    warn!("Bad linked data for job {}: {}", jobid, e);
                    (
                        JobRecord::missing(jobid.clone()),
                        Some((FailureKind::MalformedPayload, e.to_string())),
                    )
                }
                None => (
                    JobRecord::missing(jobid.clone()),
                    Some((FailureKind::WorkerPanicked, "worker panicked".to_string())),
                ),
            };

            if let Some((kind, message)) = failure {
                failures.push(TaskFailure {
                    jobid: jobid.clone(),
                    kind,
                    message,
                });
            }
            records.push(record);
        }

        let elapsed = start.elapsed();
        info!(
            "Collected {} jobs ({} degraded) in {:.2?}",
            records.len(),
            failures.len(),
            elapsed
        );

        BatchReport {
            records,
            failures,
            elapsed,
        }
    }

    fn process(&self, extractor: &JobInfoExtractor, jobid: &JobId) -> Result<JobRecord, TaskError> {
        let html = self.fetcher.fetch(jobid).map_err(TaskError::Fetch)?;
        extractor
            .extract(jobid.clone(), &html)
            .map_err(TaskError::Extract)
    }
}
