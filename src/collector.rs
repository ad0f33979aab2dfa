//! Shared, lock-guarded record of sorted candidates.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A task whose candidate turned out to be sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome<T> {
    /// Enumeration index of the task that found it.
    pub task_id: usize,
    /// The permutation that task checked.
    pub candidate: Vec<T>,
}

/// Append-only container shared by every task of one pass.
///
/// Entries are kept in the order tasks acquired the lock, which depends on
/// scheduling and differs from run to run.
#[derive(Debug, Default)]
pub struct ResultCollector<T> {
    outcomes: Mutex<Vec<TaskOutcome<T>>>,
}

impl<T> ResultCollector<T> {
    pub fn new() -> Self {
        ResultCollector {
            outcomes: Mutex::new(Vec::new()),
        }
    }

    // A panicking task never holds the lock across user code, so a poisoned
    // vector is still intact. The panic itself is reported by the evaluator.
    fn lock(&self) -> MutexGuard<'_, Vec<TaskOutcome<T>>> {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an outcome. Safe to call from any number of tasks at once.
    pub fn append(&self, outcome: TaskOutcome<T>) {
        self.lock().push(outcome);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Consume the collector once every writer has been joined.
    pub fn into_outcomes(self) -> Vec<TaskOutcome<T>> {
        self.outcomes
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> ResultCollector<T> {
    /// Copy of everything recorded so far, in recording order.
    pub fn snapshot(&self) -> Vec<TaskOutcome<T>> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_append_preserves_recording_order() {
        let collector = ResultCollector::new();
        collector.append(TaskOutcome {
            task_id: 5,
            candidate: vec![1, 2],
        });
        collector.append(TaskOutcome {
            task_id: 2,
            candidate: vec![1, 2],
        });

        let ids: Vec<usize> = collector.snapshot().iter().map(|o| o.task_id).collect();
        assert_eq!(ids, vec![5, 2]);
    }

    #[test]
    fn test_empty() {
        let collector: ResultCollector<u32> = ResultCollector::new();
        assert!(collector.is_empty());
        assert!(collector.into_outcomes().is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let collector = ResultCollector::new();
        thread::scope(|s| {
            for t in 0..32usize {
                let collector = &collector;
                s.spawn(move || {
                    for k in 0..50 {
                        collector.append(TaskOutcome {
                            task_id: t * 50 + k,
                            candidate: vec![t, k],
                        });
                    }
                });
            }
        });

        assert_eq!(collector.len(), 32 * 50);
        let ids: HashSet<usize> = collector
            .into_outcomes()
            .into_iter()
            .map(|o| o.task_id)
            .collect();
        assert_eq!(ids.len(), 32 * 50);
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let collector = ResultCollector::new();
        collector.append(TaskOutcome {
            task_id: 0,
            candidate: vec![1],
        });

        let poisoned = thread::scope(|s| {
            s.spawn(|| {
                let _guard = collector.outcomes.lock().unwrap();
                panic!("poison the lock");
            })
            .join()
        });
        assert!(poisoned.is_err());

        collector.append(TaskOutcome {
            task_id: 1,
            candidate: vec![1],
        });
        assert_eq!(collector.len(), 2);
    }
}
