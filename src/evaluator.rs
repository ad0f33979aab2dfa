//! Fan-out/fan-in evaluation of every permutation.
//!
//! A pass spawns one task per permutation of the input. Each task owns its
//! candidate, checks it with [`is_sorted`], and, if it survived, appends a
//! [`TaskOutcome`] to the shared [`ResultCollector`]. Tasks that find an
//! unsorted candidate simply return. The orchestrator joins every task
//! before it looks at the collector, so all appends happen-before the read.
//!
//! There is no early exit: a pass over N elements always checks all N!
//! candidates, even after one of them has been recorded.
//!
//! ## Schedulers
//!
//! - [`Scheduler::Threads`]: one OS thread per permutation, spawned inside a
//!   `std::thread::scope`. This is the literal thread-per-universe model.
//!   Threads that have already returned are joined while the rest are still
//!   being spawned, so only live threads hold a stack.
//! - [`Scheduler::Pool`]: one rayon task per permutation inside
//!   `rayon::scope`. Every task is in flight logically at once, but only
//!   as many run simultaneously as rayon has workers.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, ScopedJoinHandle};

use tracing::{debug, warn};

use crate::collector::{ResultCollector, TaskOutcome};
use crate::error::{BogoError, Result};
use crate::permutations::{permutation_count, permutations};
use crate::sort_check::is_sorted;

/// How tasks are mapped onto threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduler {
    /// A dedicated OS thread for every permutation.
    #[default]
    Threads,
    /// A rayon task for every permutation, run on rayon's global pool.
    Pool,
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::Threads => f.write_str("threads"),
            Scheduler::Pool => f.write_str("pool"),
        }
    }
}

/// Evaluator settings, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct EvaluatorConfig {
    pub scheduler: Scheduler,
    /// Stack size for [`Scheduler::Threads`] workers. `None` keeps the
    /// platform default.
    pub thread_stack_size: Option<usize>,
}

impl EvaluatorConfig {
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }
}

/// Hooks into a pass. All methods default to no-ops.
///
/// `task_checked` is called from inside the tasks, concurrently.
pub trait EvaluationObserver: Send + Sync {
    fn pass_started(&self, _permutation_count: usize) {}
    fn task_checked(&self, _task_id: usize, _candidate: &dyn fmt::Debug, _sorted: bool) {}
    fn all_spawned(&self, _spawned: usize) {}
    fn all_joined(&self, _joined: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EvaluationObserver for NoopObserver {}

/// Observer that reports every step as a `tracing` debug event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn pass_started(&self, permutation_count: usize) {
        debug!(permutation_count, "permutation(s) will be generated");
    }

    fn task_checked(&self, task_id: usize, candidate: &dyn fmt::Debug, sorted: bool) {
        debug!(task_id, ?candidate, sorted, "universe checked");
    }

    fn all_spawned(&self, spawned: usize) {
        debug!(spawned, "all tasks spawned");
    }

    fn all_joined(&self, joined: usize) {
        debug!(joined, "all tasks resolved");
    }
}

/// Result of one pass, before timing is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<T> {
    pub permutation_count: usize,
    /// First outcome in recording order.
    pub winner: TaskOutcome<T>,
    /// Total outcomes recorded; equals the number of sorted permutations.
    pub outcomes_recorded: usize,
}

/// Runs one task per permutation and reports the first survivor.
pub struct ParallelEvaluator {
    config: EvaluatorConfig,
    observer: Box<dyn EvaluationObserver>,
}

impl fmt::Debug for ParallelEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ParallelEvaluator {
    fn default() -> Self {
        ParallelEvaluator::new(EvaluatorConfig::default())
    }
}

impl ParallelEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        ParallelEvaluator::with_observer(config, NoopObserver)
    }

    pub fn with_observer(config: EvaluatorConfig, observer: impl EvaluationObserver + 'static) -> Self {
        ParallelEvaluator {
            config,
            observer: Box::new(observer),
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Check every permutation of `input` concurrently.
    ///
    /// Fails with [`BogoError::InvalidSize`] on empty input before anything
    /// is spawned. Task panics are caught, the remaining tasks still run to
    /// completion, and the first failure is returned instead of a result.
    pub fn evaluate<T>(&self, input: &[T]) -> Result<Evaluation<T>>
    where
        T: PartialOrd + Clone + Send + Sync + fmt::Debug,
    {
        if input.is_empty() {
            return Err(BogoError::InvalidSize { size: 0 });
        }
        let permutation_count = permutation_count(input.len())?;
        self.observer.pass_started(permutation_count);

        let collector = ResultCollector::new();
        match self.config.scheduler {
            Scheduler::Threads => self.fan_out_threads(input, &collector)?,
            Scheduler::Pool => self.fan_out_pool(input, &collector)?,
        }
        self.observer.all_joined(permutation_count);

        let outcomes = collector.into_outcomes();
        let outcomes_recorded = outcomes.len();
        let winner = outcomes
            .into_iter()
            .next()
            .ok_or(BogoError::EmptyResult { permutation_count })?;

        debug!(winner = winner.task_id, outcomes_recorded, "pass complete");
        Ok(Evaluation {
            permutation_count,
            winner,
            outcomes_recorded,
        })
    }

    fn fan_out_threads<T>(&self, input: &[T], collector: &ResultCollector<T>) -> Result<()>
    where
        T: PartialOrd + Clone + Send + Sync + fmt::Debug,
    {
        let observer = &*self.observer;

        thread::scope(|scope| {
            let mut pending = Vec::new();
            let mut spawned = 0;
            let mut next_reap = REAP_INTERVAL;
            let mut spawn_error = None;
            let mut failure = None;

            for (task_id, candidate) in permutations(input).enumerate() {
                let mut builder = thread::Builder::new().name(format!("t{task_id}"));
                if let Some(bytes) = self.config.thread_stack_size {
                    builder = builder.stack_size(bytes);
                }
                let result = builder.spawn_scoped(scope, move || {
                    check_candidate(task_id, candidate, collector, observer)
                });
                match result {
                    Ok(handle) => {
                        pending.push((task_id, handle));
                        spawned += 1;
                    }
                    Err(source) => {
                        warn!(task_id, %source, "thread spawn failed");
                        spawn_error = Some(BogoError::Spawn { task_id, source });
                        break;
                    }
                }

                // Finished threads keep their stacks mapped until joined.
                if pending.len() >= next_reap {
                    reap_finished(&mut pending, &mut failure);
                    next_reap = pending.len() + REAP_INTERVAL;
                }
            }
            if spawn_error.is_none() {
                observer.all_spawned(spawned);
            }

            // Join barrier: every spawned thread, even after a failure.
            for (task_id, handle) in pending {
                join_task(task_id, handle, &mut failure);
            }

            match spawn_error.or(failure) {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }

    fn fan_out_pool<T>(&self, input: &[T], collector: &ResultCollector<T>) -> Result<()>
    where
        T: PartialOrd + Clone + Send + Sync + fmt::Debug,
    {
        let observer = &*self.observer;
        let failures: Mutex<Vec<BogoError>> = Mutex::new(Vec::new());
        let failures = &failures;

        // rayon::scope returns only once every spawned task has finished.
        rayon::scope(|scope| {
            let mut spawned = 0;
            for (task_id, candidate) in permutations(input).enumerate() {
                scope.spawn(move |_| {
                    let body = panic::catch_unwind(AssertUnwindSafe(|| {
                        check_candidate(task_id, candidate, collector, observer)
                    }));
                    if let Err(payload) = body {
                        let err = BogoError::from_panic(task_id, payload);
                        warn!(error = %err, "task panicked");
                        failures
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(err);
                    }
                });
                spawned += 1;
            }
            observer.all_spawned(spawned);
        });

        let first_failure = failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .next();
        first_failure.map_or(Ok(()), Err)
    }
}

/// Threads spawned between sweeps for finished handles.
const REAP_INTERVAL: usize = 1024;

type PendingTask<'scope> = (usize, ScopedJoinHandle<'scope, ()>);

/// Join every pending thread that has already returned.
fn reap_finished(pending: &mut Vec<PendingTask<'_>>, failure: &mut Option<BogoError>) {
    let mut i = 0;
    while i < pending.len() {
        if pending[i].1.is_finished() {
            let (task_id, handle) = pending.swap_remove(i);
            join_task(task_id, handle, failure);
        } else {
            i += 1;
        }
    }
}

/// Join one thread, keeping the first panic seen.
fn join_task(task_id: usize, handle: ScopedJoinHandle<'_, ()>, failure: &mut Option<BogoError>) {
    if let Err(payload) = handle.join() {
        let err = BogoError::from_panic(task_id, payload);
        warn!(error = %err, "task panicked");
        failure.get_or_insert(err);
    }
}

/// Body of a single task.
fn check_candidate<T>(
    task_id: usize,
    candidate: Vec<T>,
    collector: &ResultCollector<T>,
    observer: &dyn EvaluationObserver,
) where
    T: PartialOrd + fmt::Debug,
{
    let sorted = is_sorted(&candidate);
    observer.task_checked(task_id, &candidate, sorted);
    if !sorted {
        // This universe is destroyed.
        return;
    }
    collector.append(TaskOutcome { task_id, candidate });
}
