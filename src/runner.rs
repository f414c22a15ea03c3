//! Execution settings for blocking operators.
//!
//! Streaming operators always run on the thread that pulls. The only work that can fan out is
//! the work a blocking operator does after it has materialized its input: sorting and window
//! evaluation. [`Runner`] decides whether that work uses rayon.

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    Sequential,
    /// `threads: None` uses rayon's global pool; `Some(n)` builds a dedicated pool per call.
    Parallel { threads: Option<usize> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub mode: ExecMode,
    /// Inputs shorter than this are always handled sequentially.
    pub parallel_threshold: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Sequential,
            parallel_threshold: 4096,
        }
    }
}

impl Runner {
    #[must_use]
    pub fn sequential() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parallel(threads: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Parallel { threads },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    fn fans_out(&self, len: usize) -> bool {
        matches!(self.mode, ExecMode::Parallel { .. }) && len >= self.parallel_threshold
    }

    fn install<R: Send>(&self, work: impl FnOnce() -> R + Send) -> Result<R> {
        match self.mode {
            ExecMode::Parallel { threads: Some(t) } => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(t).build()?;
                Ok(pool.install(work))
            }
            _ => Ok(work()),
        }
    }

    /// Stable sort, in parallel when the mode and input size allow it.
    pub(crate) fn sort_by<T, F>(&self, items: &mut [T], cmp: F) -> Result<()>
    where
        T: Send,
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        if self.fans_out(items.len()) {
            self.install(|| items.par_sort_by(|a, b| cmp(a, b)))
        } else {
            items.sort_by(cmp);
            Ok(())
        }
    }

    /// Map every task, keeping task order in the output.
    pub(crate) fn map_tasks<I, O, F>(&self, tasks: Vec<I>, f: F) -> Result<Vec<O>>
    where
        I: Send,
        O: Send,
        F: Fn(I) -> Result<O> + Sync + Send,
    {
        let total: usize = tasks.len();
        if matches!(self.mode, ExecMode::Parallel { .. }) && total > 1 {
            self.install(|| tasks.into_par_iter().map(&f).collect::<Result<Vec<O>>>())?
        } else {
            tasks.into_iter().map(f).collect()
        }
    }
}
