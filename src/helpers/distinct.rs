//! First-seen deduplication.
//!
//! Both operators stream: an element is emitted the moment it is first seen, and only the set
//! of keys seen so far is buffered.

use crate::collection::Elem;
use crate::Canal;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

impl<T: Elem + Eq + Hash> Canal<T> {
    pub fn distinct(&self) -> Canal<T> {
        self.distinct_by(T::clone)
    }
}

impl<T: Elem> Canal<T> {
    /// Keep the first element for each distinct `key(element)`.
    pub fn distinct_by<K, F>(&self, key: F) -> Canal<T>
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let key = Arc::new(key);
        self.follow(self.extent(), move |up| {
            let key = Arc::clone(&key);
            let mut seen: HashSet<K> = HashSet::new();
            Box::new(up.filter(move |r| match r {
                Ok(t) => seen.insert(key(t)),
                Err(_) => true,
            }))
        })
    }
}
