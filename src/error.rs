//! Error types for a bogosort pass.

use std::io;

/// Everything that can stop a pass from producing a [`RunResult`](crate::RunResult).
#[derive(Debug, thiserror::Error)]
pub enum BogoError {
    /// The requested array size is zero or negative.
    #[error("size must be a positive non-zero integer (got {size})")]
    InvalidSize { size: i64 },

    /// N! does not fit in a task count.
    #[error("{size}! permutations cannot be represented")]
    TooManyPermutations { size: usize },

    /// No task recorded a sorted permutation. At least one ordering of a
    /// finite sequence is sorted, so this is an internal bug.
    #[error("internal invariant violated: none of {permutation_count} permutations was recorded as sorted")]
    EmptyResult { permutation_count: usize },

    /// A task body panicked.
    #[error("task t{task_id} failed: {message}")]
    TaskFailure { task_id: usize, message: String },

    /// The OS refused to start a task's thread.
    #[error("failed to spawn thread for task t{task_id}: {source}")]
    Spawn {
        task_id: usize,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BogoError>;

impl BogoError {
    /// Build a [`BogoError::TaskFailure`] from a caught panic payload.
    pub(crate) fn from_panic(task_id: usize, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        BogoError::TaskFailure { task_id, message }
    }
}
