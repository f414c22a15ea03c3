//! Canal sources: collections, sliced arrays, producers, options, ranges and regex matches.
//!
//! Collection-backed sources are restartable: every traversal replays the same elements.
//! Producer-backed sources call their producer once per pull, in pull order, and are
//! [`Extent::Unbounded`] until something bounds them.

use crate::Canal;
use crate::collection::Elem;
use crate::node::{Extent, Flow};
use anyhow::Result;
use regex::Regex;
use std::sync::Arc;

/// Resolved Python-style `start:stop:step` over a sequence of known length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SliceIndices {
    start: isize,
    step: isize,
    count: usize,
}

impl SliceIndices {
    /// Negative indices count from the end and are clamped the way Python clamps them.
    /// A zero step selects nothing.
    pub(crate) fn resolve(
        len: usize,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Self {
        let step = step.unwrap_or(1);
        if step == 0 {
            return Self { start: 0, step: 1, count: 0 };
        }
        let len = len as isize;
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |idx: Option<isize>, default: isize| match idx {
            None => default,
            Some(i) if i < 0 => (i + len).max(lower),
            Some(i) => i.min(upper),
        };
        let start = clamp(start, if step < 0 { upper } else { lower });
        let stop = clamp(stop, if step < 0 { lower } else { upper });

        let count = if step > 0 && start < stop {
            ((stop - start - 1) / step + 1) as usize
        } else if step < 0 && stop < start {
            (start - stop - 1) as usize / step.unsigned_abs() + 1
        } else {
            0
        };
        Self { start, step, count }
    }

    pub(crate) fn iter(self) -> impl Iterator<Item = usize> + Send + 'static {
        (0..self.count).map(move |k| (self.start + k as isize * self.step) as usize)
    }

    pub(crate) fn len(self) -> usize {
        self.count
    }
}

impl<T: Elem> Canal<T> {
    /// Canal over every element of `data`, in order.
    pub fn of(data: impl Into<Arc<[T]>>) -> Self {
        Self::sliced(data, None, None, None)
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self::of(data)
    }

    /// Canal over `data[start:stop:step]` with Python slice semantics: negative indices count
    /// from the end, a negative step walks backwards, and a zero step yields nothing.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let c = Canal::sliced(vec![0, 1, 2, 3, 4, 5], Some(-1), None, Some(-2));
    /// assert_eq!(c.collect().unwrap(), vec![5, 3, 1]);
    /// ```
    pub fn sliced(
        data: impl Into<Arc<[T]>>,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> Self {
        let data: Arc<[T]> = data.into();
        let indices = SliceIndices::resolve(data.len(), start, stop, step);
        Self::source(Extent::Finite, move || {
            let data = Arc::clone(&data);
            Box::new(indices.iter().map(move |i| Ok(data[i].clone())))
        })
    }

    /// Unbounded canal calling `producer` once per pulled element.
    pub fn generate<F>(producer: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::try_generate(move || Ok(producer()))
    }

    pub fn try_generate<F>(producer: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let producer = Arc::new(producer);
        Self::source(Extent::Unbounded, move || {
            let producer = Arc::clone(&producer);
            Box::new(std::iter::repeat_with(move || producer()))
        })
    }

    /// Unbounded canal `seed, f(seed), f(f(seed)), ...`, restarting from `seed` on each
    /// traversal.
    pub fn iterate<F>(seed: T, f: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::source(Extent::Unbounded, move || {
            let f = Arc::clone(&f);
            Box::new(std::iter::successors(Some(seed.clone()), move |t| Some(f(t))).map(Ok))
        })
    }

    /// Exactly one element.
    pub fn some(value: T) -> Self {
        Self::source(Extent::Finite, move || {
            Box::new(std::iter::once(Ok(value.clone())))
        })
    }

    /// No elements.
    pub fn none() -> Self {
        Self::source(Extent::Finite, || Box::new(std::iter::empty()))
    }

    pub fn empty() -> Self {
        Self::none()
    }

    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::some(v),
            None => Self::none(),
        }
    }
}

impl<T: Elem> FromIterator<T> for Canal<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl Canal<i64> {
    /// `begin..until` stepping by `step`, like Python's `range`. A zero step yields nothing.
    pub fn range(begin: i64, until: i64, step: i64) -> Self {
        Self::source(Extent::Finite, move || -> Flow<i64> {
            let mut next = begin;
            Box::new(std::iter::from_fn(move || {
                let more = (step > 0 && next < until) || (step < 0 && next > until);
                if !more {
                    return None;
                }
                let out = next;
                next = next.saturating_add(step);
                Some(Ok(out))
            }))
        })
    }
}

impl Canal<String> {
    /// Every non-overlapping match of `regex` in `text`, found lazily one pull at a time.
    pub fn matches(regex: &Regex, text: impl Into<Arc<str>>) -> Self {
        let regex = regex.clone();
        let text: Arc<str> = text.into();
        Self::source(Extent::Finite, move || {
            Box::new(Matches {
                regex: regex.clone(),
                text: Arc::clone(&text),
                at: 0,
            })
        })
    }
}

struct Matches {
    regex: Regex,
    text: Arc<str>,
    at: usize,
}

impl Iterator for Matches {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Result<String>> {
        if self.at > self.text.len() {
            return None;
        }
        let m = self.regex.find_at(&self.text, self.at)?;
        self.at = if m.end() > m.start() {
            m.end()
        } else {
            // step over the next char so empty matches cannot repeat forever
            m.end() + self.text[m.end()..].chars().next().map_or(1, char::len_utf8)
        };
        Some(Ok(m.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::SliceIndices;

    fn pick(len: usize, start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Vec<usize> {
        SliceIndices::resolve(len, start, stop, step).iter().collect()
    }

    #[test]
    fn matches_python_slices() {
        // a = list(range(6))
        assert_eq!(pick(6, None, None, None), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(pick(6, Some(1), Some(4), None), vec![1, 2, 3]);
        assert_eq!(pick(6, Some(-2), None, None), vec![4, 5]);
        assert_eq!(pick(6, None, None, Some(-1)), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(pick(6, Some(4), Some(1), Some(-2)), vec![4, 2]);
        assert_eq!(pick(6, Some(-10), Some(2), None), vec![0, 1]);
        assert_eq!(pick(6, Some(10), None, None), Vec::<usize>::new());
        assert_eq!(pick(6, Some(-10), None, Some(-1)), Vec::<usize>::new());
        assert_eq!(pick(6, Some(1), Some(3), Some(-1)), Vec::<usize>::new());
        assert_eq!(pick(6, None, Some(-7), Some(-1)), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(pick(0, None, None, Some(-1)), Vec::<usize>::new());
    }

    #[test]
    fn extreme_steps_take_one_element() {
        assert_eq!(pick(6, None, None, Some(isize::MIN)), vec![5]);
        assert_eq!(pick(6, None, None, Some(isize::MAX)), vec![0]);
    }

    #[test]
    fn zero_step_is_empty() {
        assert_eq!(SliceIndices::resolve(6, None, None, Some(0)).len(), 0);
    }
}
