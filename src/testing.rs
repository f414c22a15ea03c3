//! Helpers for testing code built on canals.
//!
//! - **Assertions**: compare canal output with expected values, ordered or not, and check the
//!   typed engine error a traversal failed with.
//! - **Fixtures**: the five-person table used for window-function checks and a thread-safe call
//!   counter for verifying at-most-once side effects.
//! - **Debug**: log elements as they flow through a canal.
//!
//! # Quick Start
//!
//! ```
//! use ironcanal::Canal;
//! use ironcanal::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let calls = CallCounter::new();
//! let counted = calls.clone();
//! let doubled = Canal::from_vec(vec![1, 2, 3])
//!     .peek(move |_| counted.hit())
//!     .debug_inspect("doubling")
//!     .map(|x| x * 2)
//!     .cache();
//!
//! assert_canal_yields(&doubled, &[2, 4, 6])?;
//! assert_canal_yields(&doubled, &[2, 4, 6])?;
//! assert_eq!(calls.get(), 3);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod debug;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
