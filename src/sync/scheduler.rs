//! Bounded-concurrency task pool
//!
//! This module runs a batch of independent asynchronous tasks while keeping
//! at most `limit` of them in flight:
//! - Tasks are started in submission order until the pool is full
//! - The pool is refilled each time any in-flight task completes
//! - Results are recorded in completion order, tagged with their task index
//! - The first failure aborts the batch (fail-fast)
//!
//! The in-flight set and the result collection are owned by the scheduling
//! loop alone, so neither needs a lock.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use tokio::task::{JoinError, JoinSet};

/// Boxed future produced by starting a [`Task`]
pub type TaskFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// A deferred unit of asynchronous work
///
/// Nothing runs until the scheduler starts the task, and a task can only be
/// started once since starting consumes it.
pub struct Task<T, E> {
    start: Box<dyn FnOnce() -> TaskFuture<T, E> + Send + 'static>,
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wraps a zero-argument async closure as a task
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            start: Box::new(move || Box::pin(f()) as TaskFuture<T, E>),
        }
    }

    fn start(self) -> TaskFuture<T, E> {
        (self.start)()
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// An ordered batch of tasks submitted together
///
/// Submission order decides start order only; completion order is free.
pub type TaskBatch<T, E> = Vec<Task<T, E>>;

/// Maximum number of tasks allowed in flight at once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimit(NonZeroUsize);

impl ConcurrencyLimit {
    /// Returns `None` for a limit of zero
    pub fn new(limit: usize) -> Option<Self> {
        NonZeroUsize::new(limit).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Values produced by a batch, in the order the tasks completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet<T> {
    entries: Vec<(usize, T)>,
}

impl<T> ResultSet<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, index: usize, value: T) {
        self.entries.push((index, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Task indices in completion order
    pub fn completion_order(&self) -> Vec<usize> {
        self.entries.iter().map(|(index, _)| *index).collect()
    }

    /// `(task index, value)` pairs in completion order
    pub fn iter(&self) -> impl Iterator<Item = &(usize, T)> {
        self.entries.iter()
    }

    /// Values in completion order
    pub fn into_values(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }

    /// Values re-sorted into submission order
    pub fn into_submission_order(mut self) -> Vec<T> {
        self.entries.sort_by_key(|(index, _)| *index);
        self.into_values()
    }
}

/// Reason a batch was aborted
#[derive(Debug)]
pub enum PoolError<E> {
    /// A task returned an error
    Task { index: usize, source: E },

    /// A task panicked or was cancelled by the runtime
    Panicked { message: String },
}

impl<E: fmt::Display> fmt::Display for PoolError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task { index, source } => write!(f, "task {} failed: {}", index, source),
            Self::Panicked { message } => write!(f, "task panicked: {}", message),
        }
    }
}

impl<E> std::error::Error for PoolError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Task { source, .. } => Some(source),
            Self::Panicked { .. } => None,
        }
    }
}

/// Runs every task in `tasks` with at most `limit` in flight
///
/// An empty batch returns an empty [`ResultSet`] without spawning anything.
///
/// # Failure policy
///
/// Fail-fast: the first task error (or panic) is returned as soon as it is
/// observed. Tasks not yet started are never started, and tasks still in
/// flight are aborted; their outcomes are discarded. No partial result set
/// is returned.
///
/// # Returns
///
/// * `Ok(ResultSet)` - Every task completed successfully
/// * `Err(PoolError)` - The first failure observed
pub async fn run<T, E>(
    tasks: TaskBatch<T, E>,
    limit: ConcurrencyLimit,
) -> Result<ResultSet<T>, PoolError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let total = tasks.len();
    let mut results = ResultSet::with_capacity(total);

    if total == 0 {
        return Ok(results);
    }

    let mut in_flight: JoinSet<(usize, Result<T, E>)> = JoinSet::new();
    let mut pending = tasks.into_iter().enumerate();

    loop {
        // Fill the pool up to the limit
        while in_flight.len() < limit.get() {
            let Some((index, task)) = pending.next() else {
                break;
            };
            let future = task.start();
            in_flight.spawn(async move { (index, future.await) });
            tracing::debug!(
                "Started task {} ({} in flight, limit {})",
                index,
                in_flight.len(),
                limit
            );
        }

        // Wait for any one in-flight task; an empty set means everything is done
        let Some(joined) = in_flight.join_next().await else {
            break;
        };

        match settle(joined) {
            Ok((index, value)) => {
                results.record(index, value);
                tracing::debug!(
                    "Completed task {} ({}/{} done, {} in flight)",
                    index,
                    results.len(),
                    total,
                    in_flight.len()
                );
            }
            Err(err) => {
                in_flight.abort_all();
                tracing::debug!(
                    "Aborting batch after {} of {} tasks completed",
                    results.len(),
                    total
                );
                return Err(err);
            }
        }
    }

    Ok(results)
}

fn settle<T, E>(
    joined: Result<(usize, Result<T, E>), JoinError>,
) -> Result<(usize, T), PoolError<E>> {
    match joined {
        Ok((index, Ok(value))) => Ok((index, value)),
        Ok((index, Err(source))) => Err(PoolError::Task { index, source }),
        Err(join_error) => Err(PoolError::Panicked {
            message: join_error.to_string(),
        }),
    }
}
