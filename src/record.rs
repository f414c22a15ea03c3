//! Record-like values for window functions and row projections.
//!
//! A record is an associative mapping from field name to [`serde_json::Value`]. [`Row`] is the
//! default record type; `HashMap` and `BTreeMap` keyed by `String` work too.

use crate::collection::Elem;
use ordered_float::OrderedFloat;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Insertion-ordered JSON object used as the default row type.
pub type Row = Map<String, Value>;

pub trait Record: Elem {
    fn get(&self, name: &str) -> Option<&Value>;

    fn set(&mut self, name: &str, value: Value);
}

impl Record for Row {
    fn get(&self, name: &str) -> Option<&Value> {
        Map::get(self, name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

impl Record for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        HashMap::get(self, name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

impl Record for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        BTreeMap::get(self, name)
    }

    fn set(&mut self, name: &str, value: Value) {
        self.insert(name.to_string(), value);
    }
}

/// Build a [`Row`] from `(name, value)` pairs, keeping their order.
pub fn row<I, K, V>(fields: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = OrderedFloat(a.as_f64().unwrap_or(f64::NAN));
    let y = OrderedFloat(b.as_f64().unwrap_or(f64::NAN));
    x.cmp(&y)
}

fn sorted_entries(m: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = m.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

/// Total order over JSON values.
///
/// Values of different kinds order as null < bool < number < string < array < object.
/// Numbers compare numerically across integer and float representations. Objects compare by
/// their entries in key order, so field insertion order does not matter.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ord = compare_values(l, r);
                if ord.is_ne() {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            let (xs, ys) = (sorted_entries(x), sorted_entries(y));
            for ((lk, lv), (rk, rv)) in xs.iter().zip(&ys) {
                let ord = lk.cmp(rk).then_with(|| compare_values(lv, rv));
                if ord.is_ne() {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// A JSON value usable as a hash or ordering key.
///
/// Equality, hashing and ordering all follow [`compare_values`], so `1` and `1.0` are the same
/// key.
#[derive(Clone, Debug)]
pub struct Datum(pub Value);

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        compare_values(&self.0, &other.0).is_eq()
    }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(&self.0, &other.0)
    }
}

fn hash_value<H: Hasher>(v: &Value, state: &mut H) {
    kind_rank(v).hash(state);
    match v {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Number(n) => OrderedFloat(n.as_f64().unwrap_or(f64::NAN)).hash(state),
        Value::String(s) => s.hash(state),
        Value::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        Value::Object(m) => {
            m.len().hash(state);
            for (k, item) in sorted_entries(m) {
                k.hash(state);
                hash_value(item, state);
            }
        }
    }
}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

impl From<Value> for Datum {
    fn from(v: Value) -> Self {
        Datum(v)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Nulls {
    /// Nulls sort as the largest value, so they follow the direction.
    #[default]
    Largest,
    First,
    Last,
}

enum Source<R> {
    Col(String),
    Lit(Value),
    Expr(Arc<dyn Fn(&R) -> Value + Send + Sync>),
}

impl<R> Clone for Source<R> {
    fn clone(&self) -> Self {
        match self {
            Source::Col(c) => Source::Col(c.clone()),
            Source::Lit(v) => Source::Lit(v.clone()),
            Source::Expr(f) => Source::Expr(Arc::clone(f)),
        }
    }
}

/// A value read from a record: a named column, a literal, or a computed expression.
///
/// Items are partition keys, order keys (with direction and null placement) and the inputs of
/// window functions.
pub struct Item<R = Row> {
    source: Source<R>,
    ascending: bool,
    nulls: Nulls,
}

impl<R> Clone for Item<R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            ascending: self.ascending,
            nulls: self.nulls,
        }
    }
}

impl<R> fmt::Debug for Item<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Item");
        match &self.source {
            Source::Col(c) => d.field("col", c),
            Source::Lit(v) => d.field("lit", v),
            Source::Expr(_) => d.field("expr", &"<fn>"),
        };
        d.field("ascending", &self.ascending)
            .field("nulls", &self.nulls)
            .finish()
    }
}

impl<R: Record> Item<R> {
    fn new(source: Source<R>) -> Self {
        Self {
            source,
            ascending: true,
            nulls: Nulls::Largest,
        }
    }

    /// The named field; a missing field reads as null.
    pub fn col(name: impl Into<String>) -> Self {
        Self::new(Source::Col(name.into()))
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Self::new(Source::Lit(value.into()))
    }

    pub fn expr<F>(f: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        Self::new(Source::Expr(Arc::new(f)))
    }

    #[must_use]
    pub fn asc(mut self) -> Self {
        self.ascending = true;
        self
    }

    #[must_use]
    pub fn desc(mut self) -> Self {
        self.ascending = false;
        self
    }

    #[must_use]
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Nulls::First;
        self
    }

    #[must_use]
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Nulls::Last;
        self
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn eval(&self, record: &R) -> Value {
        match &self.source {
            Source::Col(name) => record.get(name).cloned().unwrap_or(Value::Null),
            Source::Lit(v) => v.clone(),
            Source::Expr(f) => f(record),
        }
    }

    fn nulls_last_effective(&self) -> bool {
        match self.nulls {
            Nulls::Largest => self.ascending,
            Nulls::First => false,
            Nulls::Last => true,
        }
    }

    /// Compare two values already extracted by this item, honoring direction and null placement.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if self.nulls_last_effective() { Ordering::Greater } else { Ordering::Less }
            }
            (false, true) => {
                if self.nulls_last_effective() { Ordering::Less } else { Ordering::Greater }
            }
            (false, false) => {
                let ord = compare_values(a, b);
                if self.ascending { ord } else { ord.reverse() }
            }
        }
    }
}

/// Evaluate each item against `record`.
pub(crate) fn eval_all<R: Record>(items: &[Item<R>], record: &R) -> Vec<Value> {
    items.iter().map(|i| i.eval(record)).collect()
}

/// Compare two key vectors produced by [`eval_all`] over the same `items`.
pub(crate) fn compare_keys<R: Record>(items: &[Item<R>], a: &[Value], b: &[Value]) -> Ordering {
    items
        .iter()
        .zip(a.iter().zip(b))
        .map(|(item, (x, y))| item.compare(x, y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
