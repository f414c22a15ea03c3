//! Per-key aggregation for [`Canal::combine_values`](crate::Canal::combine_values).
//!
//! A [`CombineFn`] describes an aggregation as an accumulator lifecycle:
//! `create` once per key, `add_input` once per value in arrival order, `finish` once at the end.
//! Built-ins:
//!
//! - [`Count`] -- number of values.
//! - [`Sum<T>`] -- sum of values.
//! - [`Min<T>`] / [`Max<T>`] -- smallest / largest value (`Ord`).
//! - [`AverageF64`] -- mean as `f64` (values convertible to `f64`).
//!
//! # Example
//! ```
//! use ironcanal::Canal;
//! use ironcanal::combiners::{Max, Sum};
//!
//! let sales = Canal::from_vec(vec![("a", 3u64), ("b", 10), ("a", 4)]);
//! assert_eq!(
//!     sales.combine_values(Sum::<u64>::new()).collect().unwrap(),
//!     vec![("a", 7), ("b", 10)]
//! );
//! assert_eq!(
//!     sales.combine_values(Max::<u64>::new()).collect().unwrap(),
//!     vec![("a", 4), ("b", 10)]
//! );
//! ```

mod basic;
mod statistical;

pub use basic::{Count, Max, Min, Sum};
pub use statistical::AverageF64;

use anyhow::Result;

pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;

    fn add_input(&self, acc: &mut A, v: V);

    /// Turn the accumulator into the group's output. Only called for keys that saw at least
    /// one value.
    fn finish(&self, acc: A) -> Result<O>;
}

/// A combiner assembled from a seed factory and a fold step.
pub(crate) struct FoldFn<S, F> {
    pub(crate) seed: S,
    pub(crate) step: F,
}

impl<V, A, S, F> CombineFn<V, Option<A>, A> for FoldFn<S, F>
where
    S: Fn() -> A + Send + Sync + 'static,
    F: Fn(A, V) -> A + Send + Sync + 'static,
{
    fn create(&self) -> Option<A> {
        Some((self.seed)())
    }

    fn add_input(&self, acc: &mut Option<A>, v: V) {
        *acc = acc.take().map(|a| (self.step)(a, v));
    }

    fn finish(&self, acc: Option<A>) -> Result<A> {
        acc.ok_or_else(|| anyhow::anyhow!("fold accumulator missing"))
    }
}
