//! Composite orderings for `sort_by` and `stratify_by`.
//!
//! An [`Order`] is one sort entry: a comparison plus a direction. A list of entries compares
//! left to right until one of them breaks the tie. To flip the natural order of a single
//! component inside a composite key, wrap it in [`std::cmp::Reverse`].

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

pub use std::cmp::Reverse;

type Compare<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

pub struct Order<T> {
    cmp: Compare<T>,
    ascending: bool,
}

impl<T> Clone for Order<T> {
    fn clone(&self) -> Self {
        Self {
            cmp: Arc::clone(&self.cmp),
            ascending: self.ascending,
        }
    }
}

impl<T> fmt::Debug for Order<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("ascending", &self.ascending)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Order<T> {
    pub fn asc<K, F>(key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::by(key, true)
    }

    pub fn desc<K, F>(key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::by(key, false)
    }

    /// Order by an extracted key in the given direction.
    pub fn by<K, F>(key: F, ascending: bool) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            cmp: Arc::new(move |a, b| key(a).cmp(&key(b))),
            ascending,
        }
    }

    /// Order by an arbitrary comparison, ascending.
    pub fn with<F>(cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            cmp: Arc::new(cmp),
            ascending: true,
        }
    }

    /// Natural order of the element itself.
    pub fn natural(ascending: bool) -> Self
    where
        T: Ord,
    {
        Self {
            cmp: Arc::new(T::cmp),
            ascending,
        }
    }

    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.ascending = !self.ascending;
        self
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = (self.cmp)(a, b);
        if self.ascending { ord } else { ord.reverse() }
    }
}

/// Left-to-right composition of several orders; an empty list treats everything as equal.
pub(crate) fn compare_all<T: 'static>(orders: &[Order<T>], a: &T, b: &T) -> Ordering {
    orders
        .iter()
        .map(|o| o.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
