//! Plan nodes and the pull flows they open.
//!
//! A [`Canal`] is a chain of nodes. Nothing runs while the chain is built; every traversal
//! calls [`Node::open`] on the tail, which recursively opens its upstream and wraps it into a
//! boxed iterator (a [`Flow`]). Opening is cheap: blocking operators postpone their
//! materialization until the first pull via [`deferred`].

use crate::Canal;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One traversal of a canal: a pull iterator yielding elements or the error that aborted it.
pub(crate) type Flow<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// Whether a canal is known to end.
///
/// Producer-backed sources are [`Extent::Unbounded`]; `limit`, `until` and `zip` against a
/// finite side bound them again. Blocking operators check this when they are first pulled and
/// fail with [`CanalError::Unbounded`](crate::CanalError::Unbounded) instead of hanging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extent {
    Finite,
    Unbounded,
}

impl Extent {
    #[inline]
    pub fn is_finite(self) -> bool {
        matches!(self, Extent::Finite)
    }

    /// Extent of an operator that runs until *both* inputs end (union, outer zip).
    #[inline]
    pub(crate) fn longest(self, other: Extent) -> Extent {
        if self.is_finite() && other.is_finite() {
            Extent::Finite
        } else {
            Extent::Unbounded
        }
    }

    /// Extent of an operator that stops when *either* input ends (zip).
    #[inline]
    pub(crate) fn shortest(self, other: Extent) -> Extent {
        if self.is_finite() || other.is_finite() {
            Extent::Finite
        } else {
            Extent::Unbounded
        }
    }
}

pub(crate) trait Node<T>: Send + Sync {
    fn open(&self) -> Flow<T>;

    fn extent(&self) -> Extent;

    /// Only cache nodes answer; everything else is already a pass-through.
    fn detach(&self) -> Option<Result<Canal<T>>> {
        None
    }

    fn cached_len(&self) -> Option<usize> {
        None
    }
}

/// A node without upstream: collections, producers, documents.
pub(crate) struct Source<T> {
    pub(crate) extent: Extent,
    pub(crate) open: Box<dyn Fn() -> Flow<T> + Send + Sync>,
}

impl<T> Node<T> for Source<T> {
    fn open(&self) -> Flow<T> {
        (self.open)()
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}

/// A node wrapping exactly one upstream flow.
pub(crate) struct Stage<I, O> {
    pub(crate) upstream: Arc<dyn Node<I>>,
    pub(crate) extent: Extent,
    pub(crate) convert: Box<dyn Fn(Flow<I>) -> Flow<O> + Send + Sync>,
}

impl<I, O> Node<O> for Stage<I, O> {
    fn open(&self) -> Flow<O> {
        (self.convert)(self.upstream.open())
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}

type Build<T> = Box<dyn FnOnce() -> Result<Flow<T>> + Send>;

/// Flow whose construction runs on the first pull.
pub(crate) struct Deferred<T> {
    build: Option<Build<T>>,
    flow: Option<Flow<T>>,
}

impl<T> Iterator for Deferred<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if let Some(build) = self.build.take() {
            match build() {
                Ok(flow) => self.flow = Some(flow),
                Err(e) => return Some(Err(e)),
            }
        }
        self.flow.as_mut()?.next()
    }
}

pub(crate) fn deferred<T: 'static>(
    build: impl FnOnce() -> Result<Flow<T>> + Send + 'static,
) -> Flow<T> {
    Box::new(Deferred {
        build: Some(Box::new(build)),
        flow: None,
    })
}

/// A flow that reports `err` on the first pull and then ends.
pub(crate) fn failed<T: Send + 'static>(err: anyhow::Error) -> Flow<T> {
    Box::new(std::iter::once(Err(err)))
}

/// Flow over an owned buffer.
pub(crate) fn replay<T: Send + 'static>(items: Vec<T>) -> Flow<T> {
    Box::new(items.into_iter().map(Ok))
}
