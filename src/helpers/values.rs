//! Value-only transforms on keyed canals. Keys pass through untouched.

use crate::collection::Elem;
use crate::Canal;
use anyhow::Result;

impl<K: Elem, V: Elem> Canal<(K, V)> {
    /// Map only the value of each `(K, V)` pair.
    pub fn map_values<O, F>(&self, f: F) -> Canal<(K, O)>
    where
        O: Elem,
        F: Fn(V) -> O + Send + Sync + 'static,
    {
        self.map(move |(k, v)| (k, f(v)))
    }

    pub fn try_map_values<O, F>(&self, f: F) -> Canal<(K, O)>
    where
        O: Elem,
        F: Fn(V) -> Result<O> + Send + Sync + 'static,
    {
        self.try_map(move |(k, v)| Ok((k, f(v)?)))
    }

    /// Keep pairs whose value satisfies `pred`.
    pub fn filter_values<P>(&self, pred: P) -> Canal<(K, V)>
    where
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.filter(move |(_, v)| pred(v))
    }
}
