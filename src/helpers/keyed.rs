use crate::collection::Elem;
use crate::node::{Flow, replay};
use crate::Canal;
use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;

/// Values bucketed by key, keys kept in first-seen order.
pub(crate) struct Buckets<K, V> {
    index: HashMap<K, usize>,
    pub(crate) groups: Vec<(K, Vec<V>)>,
}

impl<K: Eq + Hash + Clone, V> Buckets<K, V> {
    pub(crate) fn drain(flow: Flow<(K, V)>) -> Result<Self> {
        let mut out = Self {
            index: HashMap::new(),
            groups: Vec::new(),
        };
        for r in flow {
            let (k, v) = r?;
            match out.index.get(&k) {
                Some(&i) => out.groups[i].1.push(v),
                None => {
                    out.index.insert(k.clone(), out.groups.len());
                    out.groups.push((k, vec![v]));
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn get(&self, k: &K) -> Option<&[V]> {
        self.index.get(k).map(|&i| self.groups[i].1.as_slice())
    }
}

impl<T: Elem> Canal<T> {
    /// Pair each element with a derived key: `t` becomes `(key(&t), t)`.
    pub fn key_by<K, F>(&self, key_fn: F) -> Canal<(K, T)>
    where
        K: Elem,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.map(move |t| (key_fn(&t), t))
    }

    /// Group elements by a derived key; shorthand for `key_by(f).group_by_key()`.
    pub fn group_by<K, F>(&self, key_fn: F) -> Canal<(K, Canal<T>)>
    where
        K: Elem + Eq + Hash,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.key_by(key_fn).group_by_key()
    }
}

impl<K: Elem, V: Elem> Canal<(K, V)> {
    pub fn keys(&self) -> Canal<K> {
        self.map(|(k, _)| k)
    }

    pub fn values(&self) -> Canal<V> {
        self.map(|(_, v)| v)
    }

    /// Keep the groups whose value satisfies `pred`, like SQL `HAVING`.
    ///
    /// After `group_by_key` the value is the group's sub-canal, so the predicate can count or
    /// scan it.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let big = Canal::from_vec(vec![("a", 1), ("b", 2), ("a", 3)])
    ///     .group_by_key()
    ///     .having(|g| Ok(g.count()? > 1))
    ///     .keys()
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(big, vec!["a"]);
    /// ```
    pub fn having<P>(&self, pred: P) -> Canal<(K, V)>
    where
        P: Fn(&V) -> Result<bool> + Send + Sync + 'static,
    {
        self.try_filter(move |(_, v)| pred(v))
    }
}

impl<K: Elem + Eq + Hash, V: Elem> Canal<(K, V)> {
    /// Bucket values by key. Blocking.
    ///
    /// Groups come out in first-seen key order; each group's values keep their arrival order
    /// and are exposed as a replayable sub-canal.
    pub fn group_by_key(&self) -> Canal<(K, Canal<V>)> {
        let runner = self.runner;
        self.blocking("group_by_key", move |up| {
            let buckets = Buckets::drain(up)?;
            tracing::trace!(groups = buckets.groups.len(), "grouped by key");
            Ok(replay(
                buckets
                    .groups
                    .into_iter()
                    .map(|(k, vs)| (k, Canal::from_vec(vs).with_runner(runner)))
                    .collect(),
            ))
        })
    }

    /// Collect into a map; for repeated keys the last value wins.
    pub fn collect_as_map(&self) -> Result<HashMap<K, V>> {
        self.drain("collect_as_map")?.collect()
    }
}
