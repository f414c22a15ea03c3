//! Terminal operations beyond `collect`/`count`/`for_each`.
//!
//! Short-circuiting terminals (`first`, `find`, `take`, `all`, `any`, `element_at`) stop pulling
//! as soon as the answer is known and are safe on unbounded canals. The rest drain the whole
//! canal and fail with [`CanalError::Unbounded`] on an unbounded one.

use crate::collection::Elem;
use crate::error::CanalError;
use crate::Canal;
use anyhow::Result;
use std::fmt::{Display, Write};

impl<T: Elem> Canal<T> {
    pub fn first(&self) -> Result<Option<T>> {
        self.open().next().transpose()
    }

    /// The first element matching `pred`.
    pub fn find<P>(&self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        for r in self.open() {
            let t = r?;
            if pred(&t) {
                return Ok(Some(t));
            }
        }
        Ok(None)
    }

    pub fn last(&self) -> Result<Option<T>> {
        self.last_where(|_| true)
    }

    /// The last element matching `pred`.
    pub fn last_where<P>(&self, pred: P) -> Result<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        let mut last = None;
        for r in self.drain("last")? {
            let t = r?;
            if pred(&t) {
                last = Some(t);
            }
        }
        Ok(last)
    }

    pub fn fold<A, F>(&self, init: A, f: F) -> Result<A>
    where
        F: Fn(A, T) -> A,
    {
        let mut acc = init;
        for r in self.drain("fold")? {
            acc = f(acc, r?);
        }
        Ok(acc)
    }

    /// Left-reduce; `None` for an empty canal.
    pub fn reduce<F>(&self, f: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T,
    {
        let mut acc: Option<T> = None;
        for r in self.drain("reduce")? {
            let t = r?;
            acc = Some(match acc {
                Some(a) => f(a, t),
                None => t,
            });
        }
        Ok(acc)
    }

    /// Up to `n` leading elements.
    pub fn take(&self, n: usize) -> Result<Vec<T>> {
        self.open().take(n).collect()
    }

    pub fn all<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool,
    {
        for r in self.open() {
            if !pred(&r?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn any<P>(&self, pred: P) -> Result<bool>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.find(pred)?.is_some())
    }

    /// The element at zero-based `index`, or [`CanalError::IndexOutOfBounds`] when the canal
    /// is shorter.
    pub fn element_at(&self, index: usize) -> Result<T> {
        let mut len = 0;
        for r in self.open() {
            let t = r?;
            if len == index {
                return Ok(t);
            }
            len += 1;
        }
        Err(CanalError::IndexOutOfBounds { index, len }.into())
    }
}

impl<T: Elem + Display> Canal<T> {
    /// Join the elements' `Display` output with `sep`, wrapped in `prefix` and `suffix`.
    ///
    /// An empty canal gives `prefix + suffix` when `wrap_empty` is set and `""` otherwise.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let s = Canal::from_vec(vec![1, 2, 3]).mk_string(", ", "[", "]", true).unwrap();
    /// assert_eq!(s, "[1, 2, 3]");
    /// let e = Canal::<i32>::none().mk_string(", ", "[", "]", false).unwrap();
    /// assert_eq!(e, "");
    /// ```
    pub fn mk_string(&self, sep: &str, prefix: &str, suffix: &str, wrap_empty: bool) -> Result<String> {
        let mut body = String::new();
        let mut empty = true;
        for r in self.drain("mk_string")? {
            let t = r?;
            if !empty {
                body.push_str(sep);
            }
            write!(body, "{t}")?;
            empty = false;
        }
        if empty && !wrap_empty {
            return Ok(String::new());
        }
        Ok(format!("{prefix}{body}{suffix}"))
    }
}
