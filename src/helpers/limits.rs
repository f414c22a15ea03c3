//! Positional bounding: `limit`, `skip`, `until`.
//!
//! These are the operators that make an unbounded producer safe to drain. None of them needs
//! to know the upstream length in advance.

use crate::collection::Elem;
use crate::node::{Extent, Flow};
use crate::Canal;
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

impl<T: Elem> Canal<T> {
    /// At most `n` elements. A negative `n` means no limit.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let naturals = Canal::iterate(0u64, |n| n + 1);
    /// assert_eq!(naturals.skip(2).limit(3).collect().unwrap(), vec![2, 3, 4]);
    /// ```
    pub fn limit(&self, n: i64) -> Canal<T> {
        let Ok(n) = usize::try_from(n) else {
            return self.clone();
        };
        self.follow(Extent::Finite, move |up| Box::new(up.take(n)))
    }

    /// Drop the first `n` elements. A negative `n` skips nothing.
    ///
    /// Errors inside the skipped prefix still reach the consumer.
    pub fn skip(&self, n: i64) -> Canal<T> {
        let Ok(n) = usize::try_from(n) else {
            return self.clone();
        };
        self.follow(self.extent(), move |up| {
            let mut left = n;
            Box::new(up.filter(move |r| {
                if left > 0 && r.is_ok() {
                    left -= 1;
                    false
                } else {
                    true
                }
            }))
        })
    }

    /// Elements before the first one matching `pred`. The matching element is consumed but
    /// not emitted; use [`until_with_drop`](Canal::until_with_drop) to see it.
    pub fn until<P>(&self, pred: P) -> Canal<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.until_with_drop(pred).canal()
    }

    /// Like [`until`](Canal::until), also reporting the element that stopped the traversal.
    pub fn until_with_drop<P>(&self, pred: P) -> Until<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred: Arc<dyn Fn(&T) -> bool + Send + Sync> = Arc::new(pred);
        let dropped = Arc::new(Mutex::new(None));

        let canal = {
            let pred = Arc::clone(&pred);
            let dropped = Arc::clone(&dropped);
            self.follow(Extent::Finite, move |up| {
                *dropped.lock() = None;
                until_flow(up, Arc::clone(&pred), Arc::clone(&dropped))
            })
        };
        Until {
            upstream: self.clone(),
            pred,
            canal,
            dropped,
        }
    }
}

fn until_flow<T: Elem>(
    up: Flow<T>,
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    slot: Arc<Mutex<Option<T>>>,
) -> Flow<T> {
    let mut stopped = false;
    Box::new(up.map_while(move |r| {
        if stopped {
            return None;
        }
        match r {
            Ok(t) if pred(&t) => {
                stopped = true;
                *slot.lock() = Some(t);
                None
            }
            other => Some(other),
        }
    }))
}

/// The result of [`Canal::until_with_drop`]: the bounded canal plus the element that ended
/// its most recent traversal.
pub struct Until<T> {
    upstream: Canal<T>,
    pred: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    canal: Canal<T>,
    dropped: Arc<Mutex<Option<T>>>,
}

impl<T: Elem> Until<T> {
    pub fn canal(&self) -> Canal<T> {
        self.canal.clone()
    }

    /// The matching element seen by the latest traversal of [`canal`](Until::canal), if it
    /// reached one. Each traversal resets this when it opens.
    pub fn dropped(&self) -> Option<T> {
        self.dropped.lock().clone()
    }

    /// One traversal returning both the kept prefix and the dropped element.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let (kept, dropped) = Canal::from_vec(vec![1, 2, 7, 3])
    ///     .until_with_drop(|x| *x > 5)
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(kept, vec![1, 2]);
    /// assert_eq!(dropped, Some(7));
    /// ```
    pub fn collect(&self) -> Result<(Vec<T>, Option<T>)> {
        let slot = Arc::new(Mutex::new(None));
        let kept = until_flow(
            self.upstream.open(),
            Arc::clone(&self.pred),
            Arc::clone(&slot),
        )
        .collect::<Result<Vec<T>>>()?;
        let dropped = slot.lock().take();
        Ok((kept, dropped))
    }
}
