//! Pipeline inspection for tests.

use crate::collection::Elem;
use crate::Canal;
use std::fmt::Debug;
use std::sync::Arc;

impl<T: Elem + Debug> Canal<T> {
    /// Emit a `debug!` event for every element passing this point, tagged with `label` and the
    /// element's position in the traversal.
    pub fn debug_inspect(&self, label: impl Into<String>) -> Canal<T> {
        let label: Arc<str> = Arc::from(label.into());
        self.follow(self.extent(), move |up| {
            let label = Arc::clone(&label);
            Box::new(up.enumerate().map(move |(i, r)| {
                if let Ok(t) = &r {
                    tracing::debug!(label = %label, position = i, element = ?t, "inspect");
                }
                r
            }))
        })
    }

    /// Emit one `debug!` event with the number of elements when a traversal ends.
    pub fn debug_count(&self, label: impl Into<String>) -> Canal<T> {
        let label: Arc<str> = Arc::from(label.into());
        self.follow(self.extent(), move |up| {
            let label = Arc::clone(&label);
            let mut seen = 0usize;
            let mut up = up;
            Box::new(std::iter::from_fn(move || match up.next() {
                Some(r) => {
                    seen += 1;
                    Some(r)
                }
                None => {
                    tracing::debug!(label = %label, count = seen, "traversal finished");
                    None
                }
            }))
        })
    }
}
