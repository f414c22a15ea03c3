//! Materialize-once, replay-many stage.
//!
//! A cached canal owns an append-only store. Cursors read positions that are already filled
//! under a shared read lock; a cursor that needs a new position takes the fill lock, re-checks
//! the store, and pulls exactly one element from the shared upstream flow. Every upstream
//! position is therefore computed at most once, whichever cursor asks for it first.

use crate::Canal;
use crate::collection::Elem;
use crate::error::CanalError;
use crate::node::{Extent, Flow, Node};
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

struct Fill<T> {
    flow: Option<Flow<T>>,
    done: bool,
    poisoned: Option<String>,
}

struct Store<T> {
    upstream: Canal<T>,
    filled: RwLock<Vec<T>>,
    fill: Mutex<Fill<T>>,
}

struct CacheNode<T> {
    upstream: Canal<T>,
    /// `None` once the cache has been detached.
    store: RwLock<Option<Arc<Store<T>>>>,
}

impl<T: Elem> Node<T> for CacheNode<T> {
    fn open(&self) -> Flow<T> {
        match self.store.read().as_ref() {
            Some(store) => Box::new(Cursor {
                store: Arc::clone(store),
                pos: 0,
                finished: false,
            }),
            None => self.upstream.open(),
        }
    }

    fn extent(&self) -> Extent {
        self.upstream.extent()
    }

    fn detach(&self) -> Option<Result<Canal<T>>> {
        let mut slot = self.store.write();
        if let Some(store) = slot.as_ref() {
            let Some(_guard) = store.fill.try_lock() else {
                return Some(Err(CanalError::CacheBusy.into()));
            };
            tracing::debug!(
                filled = store.filled.read().len(),
                "detaching cache store"
            );
        }
        *slot = None;
        Some(Ok(self.upstream.clone()))
    }

    fn cached_len(&self) -> Option<usize> {
        self.store.read().as_ref().map(|s| s.filled.read().len())
    }
}

struct Cursor<T> {
    store: Arc<Store<T>>,
    pos: usize,
    finished: bool,
}

impl<T: Elem> Cursor<T> {
    fn filled_at(&self, pos: usize) -> Option<T> {
        self.store.filled.read().get(pos).cloned()
    }
}

impl<T: Elem> Iterator for Cursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(t) = self.filled_at(self.pos) {
                self.pos += 1;
                return Some(Ok(t));
            }

            let mut fill = self.store.fill.lock();
            // another cursor may have filled our position while we waited
            if self.store.filled.read().len() > self.pos {
                continue;
            }
            if let Some(reason) = &fill.poisoned {
                self.finished = true;
                return Some(Err(CanalError::CachePoisoned {
                    reason: reason.clone(),
                }
                .into()));
            }
            if fill.done {
                self.finished = true;
                return None;
            }

            let upstream = &self.store.upstream;
            let flow = fill.flow.get_or_insert_with(|| upstream.open());
            match flow.next() {
                Some(Ok(t)) => {
                    let mut filled = self.store.filled.write();
                    tracing::trace!(position = filled.len(), "cache extended");
                    filled.push(t);
                }
                Some(Err(e)) => {
                    fill.poisoned = Some(e.to_string());
                    fill.flow = None;
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    fill.done = true;
                    fill.flow = None;
                }
            }
        }
    }
}

impl<T: Elem> Canal<T> {
    /// Share one materialization of this canal between every later traversal.
    ///
    /// Upstream closures run at most once per position no matter how many times, or from how
    /// many threads, the cached canal is traversed. The store fills lazily: a traversal that
    /// stops early only computes what it pulled.
    ///
    /// ```
    /// use ironcanal::Canal;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// let calls = Arc::new(AtomicUsize::new(0));
    /// let seen = Arc::clone(&calls);
    /// let c = Canal::from_vec(vec![1, 2, 3])
    ///     .map(move |x| { seen.fetch_add(1, Ordering::SeqCst); x * 10 })
    ///     .cache();
    /// assert_eq!(c.collect().unwrap(), vec![10, 20, 30]);
    /// assert_eq!(c.collect().unwrap(), vec![10, 20, 30]);
    /// assert_eq!(calls.load(Ordering::SeqCst), 3);
    /// ```
    pub fn cache(&self) -> Canal<T> {
        let store = Store {
            upstream: self.clone(),
            filled: RwLock::new(Vec::new()),
            fill: Mutex::new(Fill {
                flow: None,
                done: false,
                poisoned: None,
            }),
        };
        Canal {
            node: Arc::new(CacheNode {
                upstream: self.clone(),
                store: RwLock::new(Some(Arc::new(store))),
            }),
            runner: self.runner,
        }
    }

    /// Drop the cache store and return the recomputing upstream canal.
    ///
    /// The cached canal itself turns into a pass-through. Traversals already running keep the
    /// store they started with. Fails with [`CanalError::CacheBusy`] while another cursor is
    /// pulling upstream to extend the store. On a canal that is not cached this is a no-op.
    pub fn uncache(&self) -> Result<Canal<T>> {
        match self.node.detach() {
            Some(res) => res,
            None => Ok(self.clone()),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.node.cached_len().is_some()
    }

    /// Number of positions materialized so far, or `None` when this canal is not cached.
    pub fn cached_len(&self) -> Option<usize> {
        self.node.cached_len()
    }
}
