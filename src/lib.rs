//! Threaded Pseudo-Quantum Bogosort
//!
//! Sorts an array by checking every one of its permutations at once, each on
//! its own thread, and keeping whichever universe turned out to be sorted.
//! It runs in factorial time with a factorial number of threads; keep N small.
//!
//! Data flows one way:
//! - [`permutations`](mod@permutations): every ordering of the input, lazily
//! - [`evaluator`]: one task per ordering, each running [`is_sorted`] and
//!   recording survivors in a shared [`ResultCollector`]
//! - [`stats`]: times the pass and packages a [`RunResult`]
//! - [`report`]: text, CSV and Links Notation rendering for callers

pub mod collector;
pub mod error;
pub mod evaluator;
pub mod permutations;
pub mod report;
pub mod sort_check;
pub mod stats;

pub use collector::{ResultCollector, TaskOutcome};
pub use error::{BogoError, Result};
pub use evaluator::{
    Evaluation, EvaluationObserver, EvaluatorConfig, NoopObserver, ParallelEvaluator, Scheduler,
    TracingObserver,
};
pub use permutations::{factorial, permutation_count, permutations, Permutations};
pub use sort_check::is_sorted;
pub use stats::{check_size, run, run_size, shuffled_input, speedtest, EvaluationStats, RunResult};
