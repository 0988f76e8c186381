use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the rows of a stage are scheduled.
///
/// Every stage of the kernels in this crate is independent across rows, so the
/// strategy only decides where the row tasks run. Stages are always executed
/// one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the caller already runs one
    /// frame per worker.
    Serial,

    /// Use the global Rayon thread pool with one task per row.
    #[default]
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Whether the strategy runs rows on more than one thread.
    pub fn is_parallel(&self) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::ParallelRows => true,
            ExecutionStrategy::Fixed(n) => *n > 1,
        }
    }
}

/// Run `op` once per row task with the given strategy.
///
/// Each task owns its output rows, so tasks may run in any order.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `rows` - One item per row, usually a tuple of input and output row slices.
/// * `op` - The operation to run on each row.
pub fn for_each_row<I, F>(
    strategy: ExecutionStrategy,
    rows: Vec<I>,
    op: F,
) -> Result<(), ParallelError>
where
    I: Send,
    F: Fn(I) + Send + Sync,
{
    match strategy {
        ExecutionStrategy::Serial => {
            rows.into_iter().for_each(op);
        }
        ExecutionStrategy::ParallelRows => {
            rows.into_par_iter().for_each(op);
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                rows.into_par_iter().for_each(op);
            });
        }
    }
    Ok(())
}
