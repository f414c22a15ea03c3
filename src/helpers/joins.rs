//! Key joins over two keyed canals.
//!
//! A join is blocking: on first pull it buckets both sides by key (values keep arrival order)
//! and emits the cross product of matching buckets. Output key order follows the driving
//! side's first-seen keys: the left side for inner, left and full joins (full appends keys
//! only the right side has, in right order) and the right side for right joins. Within a key
//! the left values are always the outer loop.
//!
//! | Join | key only left | key only right | key on both |
//! |---|---|---|---|
//! | [`join`](crate::Canal::join) | dropped | dropped | `(k, (l, r))` |
//! | [`left_join`](crate::Canal::left_join) | `(k, (l, None))` | dropped | `(k, (l, Some(r)))` |
//! | [`right_join`](crate::Canal::right_join) | dropped | `(k, (None, r))` | `(k, (Some(l), r))` |
//! | [`full_join`](crate::Canal::full_join) | `(k, (Some(l), None))` | `(k, (None, Some(r)))` | `(k, (Some(l), Some(r)))` |

use super::keyed::Buckets;
use crate::collection::Elem;
use crate::node::replay;
use crate::Canal;
use std::hash::Hash;

impl<K, V> Canal<(K, V)>
where
    K: Elem + Eq + Hash,
    V: Elem,
{
    pub fn join<W: Elem>(&self, right: &Canal<(K, W)>) -> Canal<(K, (V, W))> {
        let right = right.clone();
        self.blocking("join", move |up| {
            let lb = Buckets::drain(up)?;
            let rb = Buckets::drain(right.drain("join")?)?;
            let mut out = Vec::new();
            for (k, ls) in &lb.groups {
                if let Some(rs) = rb.get(k) {
                    for l in ls {
                        for r in rs {
                            out.push((k.clone(), (l.clone(), r.clone())));
                        }
                    }
                }
            }
            Ok(replay(out))
        })
    }

    pub fn left_join<W: Elem>(&self, right: &Canal<(K, W)>) -> Canal<(K, (V, Option<W>))> {
        let right = right.clone();
        self.blocking("left_join", move |up| {
            let lb = Buckets::drain(up)?;
            let rb = Buckets::drain(right.drain("left_join")?)?;
            let mut out = Vec::new();
            for (k, ls) in &lb.groups {
                for l in ls {
                    match rb.get(k) {
                        Some(rs) => {
                            out.extend(rs.iter().map(|r| (k.clone(), (l.clone(), Some(r.clone())))));
                        }
                        None => out.push((k.clone(), (l.clone(), None))),
                    }
                }
            }
            Ok(replay(out))
        })
    }

    /// Keys come in the right side's order; within a key the left values stay the outer loop,
    /// as in every other join.
    pub fn right_join<W: Elem>(&self, right: &Canal<(K, W)>) -> Canal<(K, (Option<V>, W))> {
        let right = right.clone();
        self.blocking("right_join", move |up| {
            let lb = Buckets::drain(up)?;
            let rb = Buckets::drain(right.drain("right_join")?)?;
            let mut out = Vec::new();
            for (k, rs) in &rb.groups {
                match lb.get(k) {
                    Some(ls) => {
                        for l in ls {
                            out.extend(rs.iter().map(|r| (k.clone(), (Some(l.clone()), r.clone()))));
                        }
                    }
                    None => out.extend(rs.iter().map(|r| (k.clone(), (None, r.clone())))),
                }
            }
            Ok(replay(out))
        })
    }

    pub fn full_join<W: Elem>(
        &self,
        right: &Canal<(K, W)>,
    ) -> Canal<(K, (Option<V>, Option<W>))> {
        let right = right.clone();
        self.blocking("full_join", move |up| {
            let lb = Buckets::drain(up)?;
            let rb = Buckets::drain(right.drain("full_join")?)?;
            let mut out = Vec::new();
            for (k, ls) in &lb.groups {
                for l in ls {
                    match rb.get(k) {
                        Some(rs) => out.extend(
                            rs.iter()
                                .map(|r| (k.clone(), (Some(l.clone()), Some(r.clone())))),
                        ),
                        None => out.push((k.clone(), (Some(l.clone()), None))),
                    }
                }
            }
            for (k, rs) in &rb.groups {
                if lb.get(k).is_none() {
                    out.extend(rs.iter().map(|r| (k.clone(), (None, Some(r.clone())))));
                }
            }
            Ok(replay(out))
        })
    }
}

impl<K: Elem, L: Elem, R: Elem> Canal<(K, (L, R))> {
    /// Flatten a joined canal into plain values: `(k, (l, r))` becomes `f(l, r, k)`.
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let left = Canal::from_vec(vec![(1, "a"), (2, "b")]);
    /// let right = Canal::from_vec(vec![(2, 20)]);
    /// let flat = left
    ///     .left_join(&right)
    ///     .map_joint(|l, r, k| format!("{k}:{l}:{}", r.unwrap_or(0)))
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(flat, vec!["1:a:0", "2:b:20"]);
    /// ```
    pub fn map_joint<O, F>(&self, f: F) -> Canal<O>
    where
        O: Elem,
        F: Fn(L, R, K) -> O + Send + Sync + 'static,
    {
        self.map(move |(k, (l, r))| f(l, r, k))
    }
}
