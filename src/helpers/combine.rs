//! Per-key aggregation and counting.
//!
//! `combine_values` drives a [`CombineFn`] over each key's values in arrival order.
//! `fold_by_key` and `reduce_by_key` are combiners built from closures; `fold_by_key` asks for a
//! seed *factory* so every key starts from its own accumulator.

use crate::collection::Elem;
use crate::combiners::{CombineFn, Count, FoldFn};
use crate::node::replay;
use crate::Canal;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

impl<K: Elem + Eq + Hash, V: Elem> Canal<(K, V)> {
    /// Aggregate each key's values with `comb`. Blocking; keys come out in first-seen order.
    pub fn combine_values<C, A, O>(&self, comb: C) -> Canal<(K, O)>
    where
        C: CombineFn<V, A, O>,
        A: Send + 'static,
        O: Elem,
    {
        self.blocking("combine_values", move |up| {
            let mut index: HashMap<K, usize> = HashMap::new();
            let mut accs: Vec<(K, A)> = Vec::new();
            for r in up {
                let (k, v) = r?;
                let slot = match index.get(&k) {
                    Some(&i) => i,
                    None => {
                        index.insert(k.clone(), accs.len());
                        accs.push((k, comb.create()));
                        accs.len() - 1
                    }
                };
                comb.add_input(&mut accs[slot].1, v);
            }
            let out = accs
                .into_iter()
                .map(|(k, a)| comb.finish(a).map(|o| (k, o)))
                .collect::<Result<Vec<_>>>()?;
            Ok(replay(out))
        })
    }

    /// Left-fold each key's values starting from `seed()`.
    pub fn fold_by_key<A, S, F>(&self, seed: S, step: F) -> Canal<(K, A)>
    where
        A: Elem,
        S: Fn() -> A + Send + Sync + 'static,
        F: Fn(A, V) -> A + Send + Sync + 'static,
    {
        self.combine_values(FoldFn { seed, step })
    }

    /// Left-reduce each key's values; the first value is the starting accumulator.
    pub fn reduce_by_key<F>(&self, f: F) -> Canal<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        self.combine_values(Reduce(Arc::new(f)))
    }

    /// Number of pairs per key, in first-seen key order.
    pub fn count_by_key(&self) -> Result<Vec<(K, usize)>> {
        self.combine_values(Count).collect()
    }
}

impl<T: Elem + Eq + Hash> Canal<T> {
    /// Occurrences of each distinct element, in first-seen order.
    pub fn count_by_value(&self) -> Result<Vec<(T, usize)>> {
        self.map(|t| (t, ())).count_by_key()
    }
}

struct Reduce<F>(Arc<F>);

impl<V, F> CombineFn<V, Option<V>, V> for Reduce<F>
where
    V: Send + 'static,
    F: Fn(V, V) -> V + Send + Sync + 'static,
{
    fn create(&self) -> Option<V> {
        None
    }

    fn add_input(&self, acc: &mut Option<V>, v: V) {
        *acc = Some(match acc.take() {
            Some(a) => (self.0)(a, v),
            None => v,
        });
    }

    fn finish(&self, acc: Option<V>) -> Result<V> {
        acc.ok_or_else(|| anyhow!("reduce finished without any input"))
    }
}
