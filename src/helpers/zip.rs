//! Positional pairing: `zip`, `zip_outer`, `zip_with_index`, `zip_with_phase`.

use crate::collection::Elem;
use crate::node::Flow;
use crate::Canal;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::iter::Fuse;

/// Where an element sits in its sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    First,
    Middle,
    Last,
    /// The sole element of a one-element sequence.
    Only,
}

impl Phase {
    pub fn is_first(self) -> bool {
        matches!(self, Phase::First | Phase::Only)
    }

    pub fn is_last(self) -> bool {
        matches!(self, Phase::Last | Phase::Only)
    }
}

impl<T: Elem> Canal<T> {
    /// Pair elements positionally, stopping at the shorter side.
    pub fn zip<U: Elem>(&self, other: &Canal<U>) -> Canal<(T, U)> {
        let other = other.clone();
        let extent = self.extent().shortest(other.extent());
        self.follow(extent, move |up| {
            Box::new(up.zip(other.open()).map(|(a, b)| -> Result<(T, U)> { Ok((a?, b?)) }))
        })
    }

    /// Pair elements positionally until both sides end; the exhausted side reads `None`.
    pub fn zip_outer<U: Elem>(&self, other: &Canal<U>) -> Canal<(Option<T>, Option<U>)> {
        let other = other.clone();
        let extent = self.extent().longest(other.extent());
        self.follow(extent, move |up| {
            let mut left = up.fuse();
            let mut right = other.open().fuse();
            Box::new(std::iter::from_fn(move || {
                match (left.next(), right.next()) {
                    (None, None) => None,
                    (a, b) => Some(a.transpose().and_then(|a| Ok((a, b.transpose()?)))),
                }
            }))
        })
    }

    /// Pair each element with its zero-based position.
    pub fn zip_with_index(&self) -> Canal<(T, usize)> {
        self.follow(self.extent(), |up| {
            Box::new(up.enumerate().map(|(i, r)| r.map(|t| (t, i))))
        })
    }

    /// Pair each element with its [`Phase`], looking one element ahead.
    ///
    /// ```
    /// use ironcanal::{Canal, Phase};
    ///
    /// let phases: Vec<Phase> = Canal::from_vec(vec!['a', 'b', 'c'])
    ///     .zip_with_phase()
    ///     .map(|(_, p)| p)
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(phases, vec![Phase::First, Phase::Middle, Phase::Last]);
    /// ```
    pub fn zip_with_phase(&self) -> Canal<(T, Phase)> {
        self.follow(self.extent(), |up| {
            Box::new(Phased {
                flow: up.fuse(),
                pending: None,
                started: false,
            })
        })
    }
}

struct Phased<T> {
    flow: Fuse<Flow<T>>,
    pending: Option<Result<T>>,
    started: bool,
}

impl<T> Iterator for Phased<T> {
    type Item = Result<(T, Phase)>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = match self.pending.take().or_else(|| self.flow.next())? {
            Ok(t) => t,
            Err(e) => return Some(Err(e)),
        };
        let first = !self.started;
        self.started = true;
        self.pending = self.flow.next();
        let phase = match (first, self.pending.is_some()) {
            (true, false) => Phase::Only,
            (true, true) => Phase::First,
            (false, true) => Phase::Middle,
            (false, false) => Phase::Last,
        };
        Some(Ok((current, phase)))
    }
}
