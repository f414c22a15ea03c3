//! Analytic (OLAP) window functions over record canals.
//!
//! A [`WindowSpec`] is one `FUNC(...) OVER (PARTITION BY ... ORDER BY ... frame) AS alias`
//! clause. Evaluation works per partition:
//!
//! 1. rows are partitioned by the partition items, keeping input order inside a partition;
//! 2. each partition is stably sorted by the order items;
//! 3. each row's frame is resolved against the ordered partition and the function is evaluated
//!    over it;
//! 4. results are written back to the rows in their original input order.
//!
//! Frame bounds are typed by unit: [`Frame::Rows`] takes row counts and [`Frame::Range`] takes
//! value offsets against the single ORDER BY key, so the two cannot be mixed.

use crate::error::CanalError;
use crate::record::{Datum, Item, Record, Row, compare_keys, compare_values, eval_all};
use crate::runner::Runner;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FrameBound<N> {
    UnboundedPreceding,
    Preceding(N),
    CurrentRow,
    Following(N),
    UnboundedFollowing,
}

impl<N> FrameBound<N> {
    fn rank(&self) -> u8 {
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(_) => 1,
            FrameBound::CurrentRow => 2,
            FrameBound::Following(_) => 3,
            FrameBound::UnboundedFollowing => 4,
        }
    }

    fn offset(&self) -> Option<&N> {
        match self {
            FrameBound::Preceding(n) | FrameBound::Following(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Bounds count physical rows of the ordered partition.
    Rows {
        start: FrameBound<usize>,
        end: FrameBound<usize>,
    },
    /// Bounds are value offsets from the current row's ORDER BY key; peers are always included.
    Range {
        start: FrameBound<f64>,
        end: FrameBound<f64>,
    },
}

impl Frame {
    pub fn rows(start: FrameBound<usize>, end: FrameBound<usize>) -> Self {
        Frame::Rows { start, end }
    }

    pub fn range(start: FrameBound<f64>, end: FrameBound<f64>) -> Self {
        Frame::Range { start, end }
    }

    fn has_range_offsets(&self) -> bool {
        match self {
            Frame::Rows { .. } => false,
            Frame::Range { start, end } => start.offset().is_some() || end.offset().is_some(),
        }
    }
}

/// The analytic function of a window clause.
#[derive(Clone, Debug)]
pub enum WindowFn<R = Row> {
    /// `COUNT(item)` counts non-null values; `COUNT(*)` (`None`) counts rows.
    Count(Option<Item<R>>),
    Sum(Item<R>),
    Avg(Item<R>),
    Min(Item<R>),
    Max(Item<R>),
    FirstValue { item: Item<R>, ignore_nulls: bool },
    LastValue { item: Item<R>, ignore_nulls: bool },
    RowNumber,
    Rank,
    DenseRank,
    Lead { item: Item<R>, offset: usize, default: Value },
    Lag { item: Item<R>, offset: usize, default: Value },
}

impl<R: Record> WindowFn<R> {
    pub fn count(item: Item<R>) -> Self {
        WindowFn::Count(Some(item))
    }

    pub fn count_all() -> Self {
        WindowFn::Count(None)
    }

    pub fn sum(item: Item<R>) -> Self {
        WindowFn::Sum(item)
    }

    pub fn avg(item: Item<R>) -> Self {
        WindowFn::Avg(item)
    }

    pub fn min(item: Item<R>) -> Self {
        WindowFn::Min(item)
    }

    pub fn max(item: Item<R>) -> Self {
        WindowFn::Max(item)
    }

    pub fn first_value(item: Item<R>) -> Self {
        WindowFn::FirstValue {
            item,
            ignore_nulls: false,
        }
    }

    pub fn last_value(item: Item<R>) -> Self {
        WindowFn::LastValue {
            item,
            ignore_nulls: false,
        }
    }

    pub fn row_number() -> Self {
        WindowFn::RowNumber
    }

    pub fn rank() -> Self {
        WindowFn::Rank
    }

    pub fn dense_rank() -> Self {
        WindowFn::DenseRank
    }

    /// `LEAD(item, 1, NULL)`.
    pub fn lead(item: Item<R>) -> Self {
        Self::lead_by(item, 1, Value::Null)
    }

    pub fn lead_by(item: Item<R>, offset: usize, default: Value) -> Self {
        WindowFn::Lead {
            item,
            offset,
            default,
        }
    }

    /// `LAG(item, 1, NULL)`.
    pub fn lag(item: Item<R>) -> Self {
        Self::lag_by(item, 1, Value::Null)
    }

    pub fn lag_by(item: Item<R>, offset: usize, default: Value) -> Self {
        WindowFn::Lag {
            item,
            offset,
            default,
        }
    }

    /// Skip nulls in `FIRST_VALUE`/`LAST_VALUE`; other functions are unchanged.
    #[must_use]
    pub fn ignore_nulls(self) -> Self {
        match self {
            WindowFn::FirstValue { item, .. } => WindowFn::FirstValue {
                item,
                ignore_nulls: true,
            },
            WindowFn::LastValue { item, .. } => WindowFn::LastValue {
                item,
                ignore_nulls: true,
            },
            other => other,
        }
    }

    /// Start a window clause for this function.
    pub fn over(self) -> WindowSpec<R> {
        WindowSpec {
            func: self,
            partition_by: Vec::new(),
            order_by: Vec::new(),
            frame: None,
            alias: String::new(),
        }
    }
}

/// One window clause: function, partitioning, ordering, frame and output column.
///
/// ```
/// use ironcanal::{Frame, FrameBound, Item, Row, WindowFn};
///
/// let running = WindowFn::<Row>::sum(Item::col("income"))
///     .over()
///     .partition_by(vec![Item::col("gender")])
///     .order_by(vec![Item::col("age")])
///     .frame(Frame::rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow))
///     .alias("running_income");
/// assert!(running.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct WindowSpec<R = Row> {
    func: WindowFn<R>,
    partition_by: Vec<Item<R>>,
    order_by: Vec<Item<R>>,
    frame: Option<Frame>,
    alias: String,
}

impl<R: Record> WindowSpec<R> {
    #[must_use]
    pub fn partition_by(mut self, items: Vec<Item<R>>) -> Self {
        self.partition_by = items;
        self
    }

    #[must_use]
    pub fn order_by(mut self, items: Vec<Item<R>>) -> Self {
        self.order_by = items;
        self
    }

    #[must_use]
    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }

    #[must_use]
    pub fn rows(self, start: FrameBound<usize>, end: FrameBound<usize>) -> Self {
        self.frame(Frame::rows(start, end))
    }

    #[must_use]
    pub fn range(self, start: FrameBound<f64>, end: FrameBound<f64>) -> Self {
        self.frame(Frame::range(start, end))
    }

    /// Name of the output column.
    #[must_use]
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.alias = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.alias
    }

    /// The frame in effect: the explicit one, else `RANGE UNBOUNDED PRECEDING .. CURRENT ROW`
    /// with an ORDER BY and the whole partition without.
    pub fn effective_frame(&self) -> Frame {
        match self.frame {
            Some(frame) => frame,
            None if self.order_by.is_empty() => {
                Frame::range(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing)
            }
            None => Frame::range(FrameBound::UnboundedPreceding, FrameBound::CurrentRow),
        }
    }

    /// Check the clause before any row is read.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> anyhow::Error {
            CanalError::InvalidFrame {
                alias: self.alias.clone(),
                reason: reason.to_string(),
            }
            .into()
        };
        if self.alias.is_empty() {
            return Err(invalid("output alias is empty"));
        }
        let frame = self.effective_frame();
        let (start_rank, end_rank, order_ok) = match &frame {
            Frame::Rows { start, end } => {
                let ok = match (start, end) {
                    (FrameBound::Preceding(a), FrameBound::Preceding(b)) => a >= b,
                    (FrameBound::Following(a), FrameBound::Following(b)) => a <= b,
                    _ => true,
                };
                (start.rank(), end.rank(), ok)
            }
            Frame::Range { start, end } => {
                for n in [start.offset(), end.offset()].into_iter().flatten() {
                    if !n.is_finite() || *n < 0.0 {
                        return Err(invalid("RANGE offsets must be finite and non-negative"));
                    }
                }
                let ok = match (start, end) {
                    (FrameBound::Preceding(a), FrameBound::Preceding(b)) => a >= b,
                    (FrameBound::Following(a), FrameBound::Following(b)) => a <= b,
                    _ => true,
                };
                (start.rank(), end.rank(), ok)
            }
        };
        if start_rank == 4 {
            return Err(invalid("frame cannot start at UNBOUNDED FOLLOWING"));
        }
        if end_rank == 0 {
            return Err(invalid("frame cannot end at UNBOUNDED PRECEDING"));
        }
        if start_rank > end_rank || !order_ok {
            return Err(invalid("frame start comes after frame end"));
        }
        if frame.has_range_offsets() && self.order_by.len() != 1 {
            return Err(CanalError::RangeOrderKey {
                alias: self.alias.clone(),
                found: self.order_by.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// Evaluate one clause over all `rows`; the result is aligned with `rows`.
pub(crate) fn evaluate<R: Record>(
    spec: &WindowSpec<R>,
    rows: &[R],
    runner: Runner,
) -> Result<Vec<Value>> {
    let mut index: HashMap<Vec<Datum>, usize> = HashMap::new();
    let mut partitions: Vec<Vec<usize>> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let key: Vec<Datum> = eval_all(&spec.partition_by, row)
            .into_iter()
            .map(Datum)
            .collect();
        match index.get(&key) {
            Some(&p) => partitions[p].push(i),
            None => {
                index.insert(key, partitions.len());
                partitions.push(vec![i]);
            }
        }
    }
    tracing::debug!(
        alias = %spec.alias,
        partitions = partitions.len(),
        mode = ?runner.mode,
        "evaluating window function"
    );

    let results = runner.map_tasks(partitions, |members| evaluate_partition(spec, rows, &members))?;
    let mut out = vec![Value::Null; rows.len()];
    for (i, v) in results.into_iter().flatten() {
        out[i] = v;
    }
    Ok(out)
}

/// One partition in ORDER BY order, with its peer structure.
struct Ordered<'a, R> {
    rows: Vec<&'a R>,
    /// Input index of each ordered position.
    origin: Vec<usize>,
    peer_start: Vec<usize>,
    peer_end: Vec<usize>,
    dense: Vec<usize>,
}

impl<'a, R: Record> Ordered<'a, R> {
    fn new(spec: &WindowSpec<R>, all: &'a [R], members: &[usize]) -> Self {
        let keys: Vec<Vec<Value>> = members
            .iter()
            .map(|&i| eval_all(&spec.order_by, &all[i]))
            .collect();
        let mut perm: Vec<usize> = (0..members.len()).collect();
        perm.sort_by(|&a, &b| compare_keys(&spec.order_by, &keys[a], &keys[b]));

        let n = perm.len();
        let mut peer_start = vec![0; n];
        let mut peer_end = vec![0; n];
        let mut dense = vec![0; n];
        let mut group = 0;
        let mut start = 0;
        for p in 0..n {
            if p > 0 {
                let same = compare_keys(&spec.order_by, &keys[perm[p - 1]], &keys[perm[p]]).is_eq();
                if !same {
                    for q in start..p {
                        peer_end[q] = p - 1;
                    }
                    start = p;
                    group += 1;
                }
            }
            peer_start[p] = start;
            dense[p] = group;
        }
        for q in start..n {
            peer_end[q] = n - 1;
        }

        Self {
            rows: perm.iter().map(|&k| &all[members[k]]).collect(),
            origin: perm.iter().map(|&k| members[k]).collect(),
            peer_start,
            peer_end,
            dense,
        }
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Numeric ORDER BY keys for RANGE offsets, signed so that larger always means "following".
struct RangeKeys {
    keys: Vec<Option<f64>>,
    /// Positions `[lo, hi)` holding non-null keys; nulls sit on one side of it.
    lo: usize,
    hi: usize,
}

impl RangeKeys {
    fn new<R: Record>(spec: &WindowSpec<R>, ordered: &Ordered<'_, R>) -> Result<Self> {
        let Some(item) = spec.order_by.first() else {
            return Err(CanalError::RangeOrderKey {
                alias: spec.alias.clone(),
                found: 0,
            }
            .into());
        };
        let dir = if item.is_ascending() { 1.0 } else { -1.0 };
        let keys = ordered
            .rows
            .iter()
            .map(|r| match item.eval(r) {
                Value::Null => Ok(None),
                Value::Number(n) => Ok(n.as_f64().map(|x| x * dir)),
                _ => Err(CanalError::NonNumericRangeKey {
                    alias: spec.alias.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let lo = keys.iter().position(Option::is_some).unwrap_or(keys.len());
        let hi = keys.iter().rposition(Option::is_some).map_or(lo, |i| i + 1);
        Ok(Self { keys, lo, hi })
    }

    fn key(&self, p: usize) -> f64 {
        self.keys[p].unwrap_or(f64::NAN)
    }

    /// First position whose key is at least `v + offset`.
    fn first_at_least(&self, v: f64, offset: f64) -> usize {
        self.lo + self.keys[self.lo..self.hi].partition_point(|k| k.is_some_and(|k| k - v < offset))
    }

    /// One past the last position whose key is at most `v + offset`.
    fn end_at_most(&self, v: f64, offset: f64) -> usize {
        self.lo + self.keys[self.lo..self.hi].partition_point(|k| k.is_some_and(|k| k - v <= offset))
    }
}

/// Resolve the frame of ordered position `p` as a half-open range `[lo, hi)`.
fn frame_of<R: Record>(
    frame: &Frame,
    p: usize,
    ordered: &Ordered<'_, R>,
    range: Option<&RangeKeys>,
) -> (usize, usize) {
    let n = ordered.len();
    match frame {
        Frame::Rows { start, end } => {
            let lo = match start {
                FrameBound::UnboundedPreceding => 0,
                FrameBound::Preceding(k) => p.saturating_sub(*k),
                FrameBound::CurrentRow => p,
                FrameBound::Following(k) => p.saturating_add(*k),
                FrameBound::UnboundedFollowing => n,
            };
            let hi = match end {
                FrameBound::UnboundedPreceding => 0,
                FrameBound::Preceding(k) => (p + 1).saturating_sub(*k),
                FrameBound::CurrentRow => p + 1,
                FrameBound::Following(k) => p.saturating_add(*k).saturating_add(1),
                FrameBound::UnboundedFollowing => n,
            };
            (lo.min(n), hi.min(n))
        }
        Frame::Range { start, end } => {
            let null_row = range.is_some_and(|r| r.keys[p].is_none());
            let offset_start = |o: f64| match range {
                Some(r) if !null_row => r.first_at_least(r.key(p), o),
                _ => ordered.peer_start[p],
            };
            let offset_end = |o: f64| match range {
                Some(r) if !null_row => r.end_at_most(r.key(p), o),
                _ => ordered.peer_end[p] + 1,
            };
            let lo = match start {
                FrameBound::UnboundedPreceding => 0,
                FrameBound::Preceding(x) => offset_start(-x),
                FrameBound::CurrentRow => ordered.peer_start[p],
                FrameBound::Following(x) => offset_start(*x),
                FrameBound::UnboundedFollowing => n,
            };
            let hi = match end {
                FrameBound::UnboundedPreceding => 0,
                FrameBound::Preceding(x) => offset_end(-x),
                FrameBound::CurrentRow => ordered.peer_end[p] + 1,
                FrameBound::Following(x) => offset_end(*x),
                FrameBound::UnboundedFollowing => n,
            };
            (lo, hi)
        }
    }
}

fn evaluate_partition<R: Record>(
    spec: &WindowSpec<R>,
    all: &[R],
    members: &[usize],
) -> Result<Vec<(usize, Value)>> {
    let ordered = Ordered::new(spec, all, members);
    let frame = spec.effective_frame();
    let range = if frame.has_range_offsets() {
        Some(RangeKeys::new(spec, &ordered)?)
    } else {
        None
    };

    let column = |item: &Item<R>| -> Vec<Value> { ordered.rows.iter().map(|r| item.eval(r)).collect() };
    let inputs: Option<Vec<Value>> = match &spec.func {
        WindowFn::Count(Some(item))
        | WindowFn::Sum(item)
        | WindowFn::Avg(item)
        | WindowFn::Min(item)
        | WindowFn::Max(item)
        | WindowFn::FirstValue { item, .. }
        | WindowFn::LastValue { item, .. }
        | WindowFn::Lead { item, .. }
        | WindowFn::Lag { item, .. } => Some(column(item)),
        _ => None,
    };
    let inputs = inputs.unwrap_or_default();

    let mut out = Vec::with_capacity(ordered.len());
    for p in 0..ordered.len() {
        let (lo, hi) = frame_of(&frame, p, &ordered, range.as_ref());
        let framed: &[Value] = if lo < hi && hi <= inputs.len() {
            &inputs[lo..hi]
        } else {
            &[]
        };
        let value = match &spec.func {
            WindowFn::Count(None) => Value::from(hi.saturating_sub(lo)),
            WindowFn::Count(Some(_)) => Value::from(non_null(framed).count()),
            WindowFn::Sum(_) => sum(framed)?,
            WindowFn::Avg(_) => avg(framed)?,
            WindowFn::Min(_) => non_null(framed)
                .min_by(|a, b| compare_values(a, b))
                .cloned()
                .unwrap_or(Value::Null),
            WindowFn::Max(_) => non_null(framed)
                .rev()
                .max_by(|a, b| compare_values(a, b))
                .cloned()
                .unwrap_or(Value::Null),
            WindowFn::FirstValue { ignore_nulls, .. } => pick(framed.iter(), *ignore_nulls),
            WindowFn::LastValue { ignore_nulls, .. } => pick(framed.iter().rev(), *ignore_nulls),
            WindowFn::RowNumber => Value::from(p + 1),
            WindowFn::Rank => Value::from(ordered.peer_start[p] + 1),
            WindowFn::DenseRank => Value::from(ordered.dense[p] + 1),
            WindowFn::Lead {
                offset, default, ..
            } => p
                .checked_add(*offset)
                .and_then(|q| inputs.get(q))
                .cloned()
                .unwrap_or_else(|| default.clone()),
            WindowFn::Lag {
                offset, default, ..
            } => p
                .checked_sub(*offset)
                .and_then(|q| inputs.get(q))
                .cloned()
                .unwrap_or_else(|| default.clone()),
        };
        out.push((ordered.origin[p], value));
    }
    Ok(out)
}

fn non_null(values: &[Value]) -> impl DoubleEndedIterator<Item = &Value> {
    values.iter().filter(|v| !v.is_null())
}

fn pick<'a>(mut values: impl Iterator<Item = &'a Value>, ignore_nulls: bool) -> Value {
    let found = if ignore_nulls {
        values.find(|v| !v.is_null())
    } else {
        values.next()
    };
    found.cloned().unwrap_or(Value::Null)
}

fn float(x: f64) -> Value {
    Number::from_f64(x).map_or(Value::Null, Value::Number)
}

/// Integral while every input is an `i64` and the total fits; a float otherwise.
fn sum(values: &[Value]) -> Result<Value> {
    let mut int: Option<i64> = Some(0);
    let mut total = 0.0;
    let mut seen = false;
    for v in non_null(values) {
        let Value::Number(n) = v else {
            bail!("SUM over a non-numeric value: {v}");
        };
        seen = true;
        int = match (int, n.as_i64()) {
            (Some(acc), Some(x)) => acc.checked_add(x),
            _ => None,
        };
        total += n.as_f64().unwrap_or(f64::NAN);
    }
    Ok(match (seen, int) {
        (false, _) => Value::Null,
        (true, Some(i)) => Value::from(i),
        (true, None) => float(total),
    })
}

fn avg(values: &[Value]) -> Result<Value> {
    let mut total = 0.0;
    let mut count = 0usize;
    for v in non_null(values) {
        let Value::Number(n) = v else {
            bail!("AVG over a non-numeric value: {v}");
        };
        total += n.as_f64().unwrap_or(f64::NAN);
        count += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    Ok(if count == 0 { Value::Null } else { float(total / count as f64) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(frame: Frame, order: usize) -> WindowSpec<Row> {
        let order_by = (0..order).map(|i| Item::col(format!("k{i}"))).collect();
        WindowFn::<Row>::count_all()
            .over()
            .order_by(order_by)
            .frame(frame)
            .alias("c")
    }

    #[test]
    fn frame_validation() {
        use FrameBound::*;
        assert!(spec(Frame::rows(Preceding(2), Following(1)), 1).validate().is_ok());
        assert!(spec(Frame::rows(CurrentRow, Preceding(1)), 1).validate().is_err());
        assert!(spec(Frame::rows(Preceding(1), Preceding(3)), 1).validate().is_err());
        assert!(spec(Frame::rows(UnboundedFollowing, UnboundedFollowing), 1).validate().is_err());
        assert!(spec(Frame::rows(UnboundedPreceding, UnboundedPreceding), 1).validate().is_err());
        assert!(spec(Frame::range(Preceding(-1.0), CurrentRow), 1).validate().is_err());
        assert!(spec(Frame::range(Preceding(f64::INFINITY), CurrentRow), 1).validate().is_err());

        let err = spec(Frame::range(Preceding(1.0), CurrentRow), 2)
            .validate()
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CanalError>(),
            Some(&CanalError::RangeOrderKey {
                alias: "c".into(),
                found: 2
            })
        );
        // peers-only RANGE frames do not need a single key
        assert!(spec(Frame::range(UnboundedPreceding, CurrentRow), 2).validate().is_ok());
    }

    #[test]
    fn sum_stays_integral_over_integers() {
        assert_eq!(sum(&[json!(1), json!(2), Value::Null]).unwrap(), json!(3));
        assert_eq!(sum(&[json!(1), json!(0.5)]).unwrap(), json!(1.5));
        assert_eq!(sum(&[Value::Null]).unwrap(), Value::Null);
        assert!(sum(&[json!("x")]).is_err());
    }
}
