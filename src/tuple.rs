//! Pair helpers.
//!
//! Keyed and joined canals carry plain `(A, B)` tuples, which already give structural
//! equality, hashing and lexicographic ordering. Missing join sides use `Option`.

use crate::Canal;
use crate::collection::Elem;

/// Extra views on an ordered pair.
pub trait PairExt<A, B> {
    /// The pair with its components swapped.
    fn reverse(self) -> (B, A);

    fn first(&self) -> &A;

    fn second(&self) -> &B;
}

impl<A, B> PairExt<A, B> for (A, B) {
    fn reverse(self) -> (B, A) {
        (self.1, self.0)
    }

    fn first(&self) -> &A {
        &self.0
    }

    fn second(&self) -> &B {
        &self.1
    }
}

impl<A: Elem, B: Elem> Canal<(A, B)> {
    /// Swap every pair: `(a, b)` becomes `(b, a)`.
    pub fn swap(&self) -> Canal<(B, A)> {
        self.map(PairExt::reverse)
    }
}
