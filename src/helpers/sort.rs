//! Sorting and stratification.
//!
//! Every operator here is blocking and stable: elements with equal keys keep their upstream
//! order. Sorting goes through the canal's [`Runner`](crate::Runner), so a parallel runner sorts
//! large inputs with rayon. Stratification sorts first, then cuts the sorted run into maximal
//! groups of equal key, each exposed as its own sub-canal.

use crate::collection::Elem;
use crate::node::replay;
use crate::order::{Order, compare_all};
use crate::runner::Runner;
use crate::Canal;
use anyhow::Result;
use std::cmp::Ordering;
use std::sync::Arc;

impl<T: Elem> Canal<T> {
    /// Sort by a list of orders, compared left to right until one breaks the tie.
    ///
    /// ```
    /// use ironcanal::{Canal, Order};
    ///
    /// let sorted = Canal::from_vec(vec![(1, 2), (2, 3), (1, 1), (1, 5)])
    ///     .sort_by(vec![Order::asc(|p: &(i32, i32)| p.0), Order::desc(|p: &(i32, i32)| p.1)])
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(sorted, vec![(1, 5), (1, 2), (1, 1), (2, 3)]);
    /// ```
    pub fn sort_by(&self, orders: Vec<Order<T>>) -> Canal<T> {
        self.sort_with_cmp(move |a, b| compare_all(&orders, a, b), true)
    }

    /// Sort ascending by a single key. Wrap components in [`std::cmp::Reverse`] to flip them.
    pub fn sort_by_key<K, F>(&self, key: F) -> Canal<T>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(vec![Order::asc(key)])
    }

    pub fn sort_with_cmp<C>(&self, cmp: C, ascending: bool) -> Canal<T>
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let runner = self.runner;
        self.blocking("sort", move |up| {
            let mut all = up.collect::<Result<Vec<T>>>()?;
            sort_in(runner, &mut all, &cmp, ascending)?;
            Ok(replay(all))
        })
    }

    /// Sort, then group maximal runs of elements that compare equal under `orders`.
    pub fn stratify_by(&self, orders: Vec<Order<T>>) -> Canal<Canal<T>> {
        let orders = Arc::new(orders);
        let runner = self.runner;
        self.blocking("stratify", move |up| {
            let mut all = up.collect::<Result<Vec<T>>>()?;
            let cmp = |a: &T, b: &T| compare_all(&orders, a, b);
            sort_in(runner, &mut all, &cmp, true)?;
            let runs = cut_runs(all, |a, b| cmp(a, b).is_eq());
            tracing::trace!(strata = runs.len(), "stratified");
            Ok(replay(
                runs.into_iter()
                    .map(|run| Canal::from_vec(run).with_runner(runner))
                    .collect(),
            ))
        })
    }

    pub fn stratify_by_key<K, F>(&self, key: F) -> Canal<Canal<T>>
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.stratify_by(vec![Order::asc(key)])
    }
}

impl<T: Elem + Ord> Canal<T> {
    /// Sort by natural order.
    pub fn sort_with(&self, ascending: bool) -> Canal<T> {
        self.sort_with_cmp(T::cmp, ascending)
    }

    /// Group equal elements into runs, in natural order.
    pub fn stratify_with(&self, ascending: bool) -> Canal<Canal<T>> {
        self.stratify_by(vec![Order::natural(ascending)])
    }
}

fn sort_in<T, C>(runner: Runner, items: &mut [T], cmp: &C, ascending: bool) -> Result<()>
where
    T: Send,
    C: Fn(&T, &T) -> Ordering + Sync,
{
    if ascending {
        runner.sort_by(items, cmp)
    } else {
        runner.sort_by(items, |a, b| cmp(b, a))
    }
}

/// Split a sorted vector into maximal runs of consecutive equal elements.
pub(crate) fn cut_runs<T>(items: Vec<T>, same: impl Fn(&T, &T) -> bool) -> Vec<Vec<T>> {
    let mut runs: Vec<Vec<T>> = Vec::new();
    for t in items {
        match runs.last_mut() {
            Some(run) if run.last().is_some_and(|last| same(last, &t)) => run.push(t),
            _ => runs.push(vec![t]),
        }
    }
    runs
}
