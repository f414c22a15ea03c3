//! Sequence algebra: `union`, `cartesian`, `intersection`, `subtract`, `reverse`.
//!
//! `intersection` and `subtract` stream the left side against a hash set built from the right
//! side on first pull. `reverse` is blocking. Operators that must see all of one side fail
//! fast with [`CanalError::Unbounded`] instead of hanging.

use crate::collection::Elem;
use crate::error::CanalError;
use crate::node::{Flow, deferred, failed, replay};
use crate::Canal;
use anyhow::Result;
use std::collections::HashSet;
use std::hash::Hash;

impl<T: Elem> Canal<T> {
    /// All of `self`, then all of `other`.
    pub fn union(&self, other: &Canal<T>) -> Canal<T> {
        let other = other.clone();
        let extent = self.extent().longest(other.extent());
        self.follow(extent, move |up| Box::new(up.chain(other.open())))
    }

    /// Every `(left, right)` pair, left-major. `other` is re-traversed for each left element.
    pub fn cartesian<U: Elem>(&self, other: &Canal<U>) -> Canal<(T, U)> {
        let other = other.clone();
        let right_finite = other.extent().is_finite();
        self.follow(self.extent(), move |up| -> Flow<(T, U)> {
            if !right_finite {
                return failed(CanalError::Unbounded { op: "cartesian" }.into());
            }
            let other = other.clone();
            Box::new(up.flat_map(move |r| -> Flow<(T, U)> {
                match r {
                    Ok(left) => Box::new(
                        other
                            .open()
                            .map(move |right| right.map(|right| (left.clone(), right))),
                    ),
                    Err(e) => failed(e),
                }
            }))
        })
    }

    /// Elements in reverse order. Blocking.
    pub fn reverse(&self) -> Canal<T> {
        self.blocking("reverse", |up| {
            let mut all = up.collect::<Result<Vec<T>>>()?;
            all.reverse();
            Ok(replay(all))
        })
    }
}

impl<T: Elem + Eq + Hash> Canal<T> {
    /// Elements of `self` that also occur in `other`, in `self`'s order.
    pub fn intersection(&self, other: &Canal<T>) -> Canal<T> {
        self.filter_against(other, "intersection", true)
    }

    /// Elements of `self` that do not occur in `other`, in `self`'s order.
    pub fn subtract(&self, other: &Canal<T>) -> Canal<T> {
        self.filter_against(other, "subtract", false)
    }

    fn filter_against(&self, other: &Canal<T>, op: &'static str, keep_found: bool) -> Canal<T> {
        let other = other.clone();
        self.follow(self.extent(), move |up| {
            let other = other.clone();
            deferred(move || {
                let there = other.drain(op)?.collect::<Result<HashSet<T>>>()?;
                tracing::trace!(op, elements = there.len(), "materialized right side");
                Ok(Box::new(up.filter(move |r| match r {
                    Ok(t) => there.contains(t) == keep_found,
                    Err(_) => true,
                })) as Flow<T>)
            })
        })
    }
}
