//! Shared test data.

use crate::record::{Row, row};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Five people with `id`, `name`, `gender`, `age` and `income`.
///
/// Genders run `1, 2, 1, 2, 1`; two people of gender 1 share age 28.
pub fn people_rows() -> Vec<Row> {
    [
        (1, "mike", 1, 28, 1261.54),
        (2, "rose", 2, 32, 3324.55),
        (3, "tom", 1, 28, 7531.43),
        (4, "hellen", 2, 30, 4483.12),
        (5, "jack", 1, 31, 5331.50),
    ]
    .into_iter()
    .map(|(id, name, gender, age, income)| {
        row([
            ("id", json!(id)),
            ("name", json!(name)),
            ("gender", json!(gender)),
            ("age", json!(age)),
            ("income", json!(income)),
        ])
    })
    .collect()
}

/// Cloneable invocation counter; all clones share one count.
#[derive(Clone, Debug, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}
