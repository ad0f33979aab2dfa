//! Timing and packaging of a pass.

use std::fmt;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::collector::TaskOutcome;
use crate::error::{BogoError, Result};
use crate::evaluator::ParallelEvaluator;
use crate::report::SpeedtestRow;

/// Statistics gathered around one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationStats<T> {
    /// N! for the input length.
    pub permutation_count: u64,
    /// Wall-clock time of the fan-out and join barrier.
    pub elapsed_nanoseconds: u128,
    /// First outcome in recording order.
    pub winner: TaskOutcome<T>,
    pub outcomes_recorded: usize,
}

/// Everything a caller needs to render a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult<T> {
    /// The input as it was before sorting.
    pub original_array: Vec<T>,
    pub stats: EvaluationStats<T>,
}

impl<T> RunResult<T> {
    /// The sorted array.
    pub fn sorted(&self) -> &[T] {
        &self.stats.winner.candidate
    }
}

/// Validate a requested array size.
pub fn check_size(size: i64) -> Result<usize> {
    if size < 1 {
        return Err(BogoError::InvalidSize { size });
    }
    usize::try_from(size).map_err(|_| BogoError::InvalidSize { size })
}

/// `1..=size`, shuffled.
pub fn shuffled_input<R: Rng + ?Sized>(size: i64, rng: &mut R) -> Result<Vec<u32>> {
    let size = check_size(size)?;
    let top = u32::try_from(size).map_err(|_| BogoError::TooManyPermutations { size })?;
    let mut input: Vec<u32> = (1..=top).collect();
    input.shuffle(rng);
    Ok(input)
}

/// Sort `original` and time the evaluation.
pub fn run<T>(evaluator: &ParallelEvaluator, original: Vec<T>) -> Result<RunResult<T>>
where
    T: PartialOrd + Clone + Send + Sync + fmt::Debug,
{
    let start = Instant::now();
    let evaluation = evaluator.evaluate(&original)?;
    let elapsed_nanoseconds = start.elapsed().as_nanos();

    info!(
        size = original.len(),
        permutations = evaluation.permutation_count,
        winner = evaluation.winner.task_id,
        elapsed_ns = %elapsed_nanoseconds,
        "sorted"
    );

    Ok(RunResult {
        original_array: original,
        stats: EvaluationStats {
            permutation_count: evaluation.permutation_count as u64,
            elapsed_nanoseconds,
            winner: evaluation.winner,
            outcomes_recorded: evaluation.outcomes_recorded,
        },
    })
}

/// Sort a freshly shuffled array of `size` elements.
pub fn run_size<R: Rng + ?Sized>(
    evaluator: &ParallelEvaluator,
    size: i64,
    rng: &mut R,
) -> Result<RunResult<u32>> {
    let input = shuffled_input(size, rng)?;
    run(evaluator, input)
}

/// Run every size from 1 to `max_size` lazily, one row per size.
///
/// Each item is produced only when the previous size has finished, so
/// callers can print rows as they arrive and keep the ones before a failure.
pub fn speedtest<'a, R: Rng + ?Sized>(
    evaluator: &'a ParallelEvaluator,
    max_size: i64,
    rng: &'a mut R,
) -> Result<impl Iterator<Item = Result<SpeedtestRow>> + 'a> {
    check_size(max_size)?;
    Ok((1..=max_size).map(move |size| {
        debug!(size, "speedtest iteration");
        run_size(evaluator, size, &mut *rng).map(|result| SpeedtestRow::from_run(&result))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{EvaluatorConfig, Scheduler};
    use crate::permutations::factorial;
    use crate::sort_check::is_sorted;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_check_size() {
        assert_eq!(check_size(1).unwrap(), 1);
        assert_eq!(check_size(7).unwrap(), 7);
        assert!(matches!(check_size(0), Err(BogoError::InvalidSize { size: 0 })));
        assert!(matches!(check_size(-3), Err(BogoError::InvalidSize { size: -3 })));
    }

    #[test]
    fn test_shuffled_input_is_one_to_n() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut input = shuffled_input(9, &mut rng).unwrap();
        input.sort_unstable();
        assert_eq!(input, (1..=9).collect::<Vec<u32>>());
    }

    #[test]
    fn test_run_three() {
        let evaluator = ParallelEvaluator::default();
        let result = run(&evaluator, vec![3, 1, 2]).unwrap();
        assert_eq!(result.original_array, vec![3, 1, 2]);
        assert_eq!(result.stats.permutation_count, 6);
        assert_eq!(result.stats.outcomes_recorded, 1);
        assert_eq!(result.sorted(), &[1, 2, 3]);
    }

    #[test]
    fn test_run_size_one() {
        let evaluator = ParallelEvaluator::default();
        let mut rng = rand::thread_rng();
        let result = run_size(&evaluator, 1, &mut rng).unwrap();
        assert_eq!(result.original_array, vec![1]);
        assert_eq!(result.stats.permutation_count, 1);
        assert_eq!(result.stats.winner.candidate, vec![1]);
        assert_eq!(result.stats.winner.task_id, 0);
    }

    #[test]
    fn test_run_size_rejects_non_positive() {
        let evaluator = ParallelEvaluator::default();
        let mut rng = rand::thread_rng();
        for size in [0, -1, -100] {
            let err = run_size(&evaluator, size, &mut rng).unwrap_err();
            assert!(matches!(err, BogoError::InvalidSize { .. }));
        }
    }

    #[test]
    fn test_run_empty_vec_rejected() {
        let evaluator = ParallelEvaluator::default();
        let err = run::<u32>(&evaluator, Vec::new()).unwrap_err();
        assert!(matches!(err, BogoError::InvalidSize { size: 0 }));
    }

    #[test]
    fn test_speedtest_rows() {
        let evaluator = ParallelEvaluator::new(EvaluatorConfig::default().with_scheduler(Scheduler::Pool));
        let mut rng = StdRng::seed_from_u64(42);
        let rows: Vec<SpeedtestRow> = speedtest(&evaluator, 4, &mut rng)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        let sizes: Vec<usize> = rows.iter().map(|r| r.array_size).collect();
        assert_eq!(sizes, vec![1, 2, 3, 4]);
        let counts: Vec<u64> = rows.iter().map(|r| r.permutations).collect();
        assert_eq!(counts, vec![1, 2, 6, 24]);
    }

    #[test]
    fn test_speedtest_rejects_zero() {
        let evaluator = ParallelEvaluator::default();
        let mut rng = rand::thread_rng();
        assert!(speedtest(&evaluator, 0, &mut rng).is_err());
    }

    #[test]
    fn test_speedtest_reports_errors_per_size() {
        let evaluator = ParallelEvaluator::new(
            EvaluatorConfig::default().with_thread_stack_size(usize::MAX / 4),
        );
        let mut rng = StdRng::seed_from_u64(1);
        let rows: Vec<Result<SpeedtestRow>> = speedtest(&evaluator, 3, &mut rng).unwrap().collect();

        assert_eq!(rows.len(), 3);
        for row in rows {
            assert!(matches!(row, Err(BogoError::Spawn { task_id: 0, .. })));
        }
    }

    #[test]
    fn test_speedtest_is_lazy() {
        let evaluator = ParallelEvaluator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut rows = speedtest(&evaluator, 12, &mut rng).unwrap();

        let first = rows.next().unwrap().unwrap();
        assert_eq!(first.array_size, 1);
        let second = rows.next().unwrap().unwrap();
        assert_eq!(second.array_size, 2);
        assert_eq!(second.permutations, 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_winner_is_sorted_permutation(
            input in proptest::collection::vec(0i32..10, 1..=5),
            pool in any::<bool>(),
        ) {
            let scheduler = if pool { Scheduler::Pool } else { Scheduler::Threads };
            let evaluator = ParallelEvaluator::new(EvaluatorConfig::default().with_scheduler(scheduler));
            let result = run(&evaluator, input.clone()).unwrap();

            prop_assert_eq!(result.stats.permutation_count, factorial(input.len()).unwrap());
            prop_assert!(is_sorted(result.sorted()));
            prop_assert_eq!(&result.original_array, &input);

            let mut expected = input.clone();
            expected.sort_unstable();
            prop_assert_eq!(result.sorted(), expected.as_slice());
        }
    }
}
