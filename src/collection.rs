use crate::error::CanalError;
use crate::node::{Extent, Flow, Node, Source, Stage, deferred, failed};
use crate::runner::Runner;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Bound shared by every element type flowing through a canal.
///
/// Elements are cloned when a stage has to hand out buffered values more than once (cache
/// replay, grouped sub-canals, joins), and must cross threads for parallel sorting and cached
/// traversal from several threads.
pub trait Elem: 'static + Send + Sync + Clone {}
impl<T> Elem for T where T: 'static + Send + Sync + Clone {}

/// A lazy, re-openable sequence of `T`.
///
/// A `Canal` is a description: building one never pulls an element. Each terminal operation
/// (`collect`, `count`, `for_each`, `first`, ...) opens a fresh traversal and drives it on the
/// calling thread. Canals built from collections replay the same elements on every traversal;
/// producer-backed canals call their producer again.
pub struct Canal<T> {
    pub(crate) node: Arc<dyn Node<T>>,
    pub(crate) runner: Runner,
}

impl<T> Clone for Canal<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            runner: self.runner,
        }
    }
}

impl<T> fmt::Debug for Canal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canal")
            .field("extent", &self.node.extent())
            .field("runner", &self.runner)
            .finish()
    }
}

/* ===================== plumbing shared by every operator ===================== */
impl<T: Elem> Canal<T> {
    pub(crate) fn source<F>(extent: Extent, open: F) -> Self
    where
        F: Fn() -> Flow<T> + Send + Sync + 'static,
    {
        Self {
            node: Arc::new(Source {
                extent,
                open: Box::new(open),
            }),
            runner: Runner::default(),
        }
    }

    /// Wrap this canal's flow with `convert`, producing a canal of `O`.
    pub(crate) fn follow<O, F>(&self, extent: Extent, convert: F) -> Canal<O>
    where
        O: Elem,
        F: Fn(Flow<T>) -> Flow<O> + Send + Sync + 'static,
    {
        Canal {
            node: Arc::new(Stage {
                upstream: Arc::clone(&self.node),
                extent,
                convert: Box::new(convert),
            }),
            runner: self.runner,
        }
    }

    /// A blocking stage: on first pull it hands the whole upstream flow to `build`.
    ///
    /// Fails on first pull with [`CanalError::Unbounded`] when this canal never ends.
    pub(crate) fn blocking<O, F>(&self, op: &'static str, build: F) -> Canal<O>
    where
        O: Elem,
        F: Fn(Flow<T>) -> Result<Flow<O>> + Send + Sync + 'static,
    {
        if !self.extent().is_finite() {
            let mut out = Canal::source(Extent::Finite, move || {
                failed(CanalError::Unbounded { op }.into())
            });
            out.runner = self.runner;
            return out;
        }
        let build = Arc::new(build);
        self.follow(Extent::Finite, move |up| {
            let build = Arc::clone(&build);
            deferred(move || {
                tracing::trace!(op, "materializing blocking stage");
                build(up)
            })
        })
    }

    pub(crate) fn open(&self) -> Flow<T> {
        self.node.open()
    }

    /// Open a traversal for a terminal that must see every element.
    pub(crate) fn drain(&self, op: &'static str) -> Result<Flow<T>> {
        if self.extent().is_finite() {
            Ok(self.open())
        } else {
            Err(CanalError::Unbounded { op }.into())
        }
    }

    pub fn extent(&self) -> Extent {
        self.node.extent()
    }

    pub fn runner(&self) -> Runner {
        self.runner
    }

    /// Same plan, different execution settings for downstream blocking operators.
    #[must_use]
    pub fn with_runner(&self, runner: Runner) -> Canal<T> {
        Canal {
            node: Arc::clone(&self.node),
            runner,
        }
    }

    /// Open a traversal as a plain iterator of `Result<T>`.
    pub fn iter(&self) -> Iter<T> {
        Iter { flow: self.open() }
    }
}

/// Iterator over one traversal of a canal.
pub struct Iter<T> {
    flow: Flow<T>,
}

impl<T> Iterator for Iter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        self.flow.next()
    }
}

impl<'a, T: Elem> IntoIterator for &'a Canal<T> {
    type Item = Result<T>;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Iter<T> {
        self.iter()
    }
}

/* ===================== element-wise operators ===================== */
impl<T: Elem> Canal<T> {
    pub fn map<O, F>(&self, f: F) -> Canal<O>
    where
        O: Elem,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.follow(self.extent(), move |up| {
            let f = Arc::clone(&f);
            Box::new(up.map(move |r| r.map(|t| f(t))))
        })
    }

    /// Like [`map`](Canal::map), but the mapper may fail; the error reaches the terminal
    /// at the position it occurred.
    pub fn try_map<O, F>(&self, f: F) -> Canal<O>
    where
        O: Elem,
        F: Fn(T) -> Result<O> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.follow(self.extent(), move |up| {
            let f = Arc::clone(&f);
            Box::new(up.map(move |r| r.and_then(|t| f(t))))
        })
    }

    pub fn filter<P>(&self, pred: P) -> Canal<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |t| Ok(pred(t)))
    }

    pub fn try_filter<P>(&self, pred: P) -> Canal<T>
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        let pred = Arc::new(pred);
        self.follow(self.extent(), move |up| {
            let pred = Arc::clone(&pred);
            Box::new(up.filter_map(move |r| match r {
                Ok(t) => match pred(&t) {
                    Ok(true) => Some(Ok(t)),
                    Ok(false) => None,
                    Err(e) => Some(Err(e)),
                },
                Err(e) => Some(Err(e)),
            }))
        })
    }

    /// Map each element to zero or more outputs, outer order first, then inner order.
    pub fn flat_map<O, I, F>(&self, f: F) -> Canal<O>
    where
        O: Elem,
        I: IntoIterator<Item = O>,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        self.try_flat_map(move |t| Ok(f(t)))
    }

    pub fn try_flat_map<O, I, F>(&self, f: F) -> Canal<O>
    where
        O: Elem,
        I: IntoIterator<Item = O>,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> Result<I> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.follow(self.extent(), move |up| {
            let f = Arc::clone(&f);
            Box::new(up.flat_map(move |r| -> Flow<O> {
                match r.and_then(|t| f(t)) {
                    Ok(inner) => Box::new(inner.into_iter().map(Ok)),
                    Err(e) => failed(e),
                }
            }))
        })
    }

    /// Run `action` on each element as it passes; the element itself is unchanged.
    pub fn peek<F>(&self, action: F) -> Canal<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let action = Arc::new(action);
        self.follow(self.extent(), move |up| {
            let action = Arc::clone(&action);
            Box::new(up.inspect(move |r| {
                if let Ok(t) = r {
                    action(t);
                }
            }))
        })
    }

    /// Map with a per-traversal state created by `init` when the traversal opens.
    pub fn map_with_state<S, O, I, F>(&self, init: I, f: F) -> Canal<O>
    where
        O: Elem,
        S: Send + 'static,
        I: Fn() -> S + Send + Sync + 'static,
        F: Fn(&mut S, T) -> O + Send + Sync + 'static,
    {
        let init = Arc::new(init);
        let f = Arc::new(f);
        self.follow(self.extent(), move |up| {
            let mut state = init();
            let f = Arc::clone(&f);
            Box::new(up.map(move |r| r.map(|t| f(&mut state, t))))
        })
    }
}

impl<T: Elem> Canal<Canal<T>> {
    /// Concatenate the inner canals in order.
    pub fn flatten(&self) -> Canal<T> {
        self.follow(self.extent(), |up| {
            Box::new(up.flat_map(|r| -> Flow<T> {
                match r {
                    Ok(inner) => inner.open(),
                    Err(e) => failed(e),
                }
            }))
        })
    }
}

/* ===================== basic terminals ===================== */
impl<T: Elem> Canal<T> {
    pub fn collect(&self) -> Result<Vec<T>> {
        self.drain("collect")?.collect()
    }

    pub fn count(&self) -> Result<usize> {
        let mut n = 0usize;
        for r in self.drain("count")? {
            r?;
            n += 1;
        }
        Ok(n)
    }

    pub fn for_each<F>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(T),
    {
        for r in self.drain("for_each")? {
            action(r?);
        }
        Ok(())
    }

    /// Stop at the first error, whether it came from upstream or from `action`.
    pub fn try_for_each<F>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(T) -> Result<()>,
    {
        for r in self.drain("try_for_each")? {
            action(r?)?;
        }
        Ok(())
    }
}
