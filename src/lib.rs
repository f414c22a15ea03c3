//! # Ironcanal
//!
//! Lazy, pull-based pipeline operators over in-memory and generated sequences: map, filter,
//! distinct, sliding windows, key joins, group-by, multi-key sorting, stratification and SQL
//! analytic window functions, with no query engine or storage underneath.
//!
//! ## Quick Start
//!
//! ```
//! use ironcanal::Canal;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let words = Canal::from_vec(vec!["hello world", "hello rust"])
//!     .flat_map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>());
//!
//! let counts = words.key_by(|w| w.clone()).map_values(|_| 1u64).reduce_by_key(|a, b| a + b);
//!
//! assert_eq!(
//!     counts.collect()?,
//!     vec![("hello".to_string(), 2), ("world".to_string(), 1), ("rust".to_string(), 1)]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Canal
//!
//! A [`Canal<T>`] is a *plan*, not a buffer. Building one runs nothing. Every terminal
//! operation (`collect`, `count`, `first`, `for_each`, ...) opens a fresh traversal and pulls
//! elements one at a time on the calling thread. Collection-backed canals replay the same
//! elements on each traversal; producer-backed canals (`generate`, `iterate`) call their producer
//! again, once per pulled element.
//!
//! ### Streaming and blocking operators
//!
//! - Streaming: `map`, `filter`, `flat_map`, `peek`, `distinct`, `limit`, `skip`, `until`,
//!   the `zip` family, `union`, `intersection`, `subtract`, `cartesian`, `sliding`.
//! - Blocking (buffer the whole input on first pull): `reverse`, `sort_*`, `stratify_*`,
//!   `group_by_key`, `combine_values`, `fold_by_key`, `reduce_by_key`, the joins, `window`.
//!
//! Every canal knows its [`Extent`]. A blocking operator or a draining terminal on an
//! unbounded canal fails with [`CanalError::Unbounded`] instead of hanging; bound the canal
//! with `limit`, `until` or a `zip` against a finite side first.
//!
//! ### Keyed canals and joins
//!
//! `Canal<(K, V)>` gains `group_by_key`, `having`, `map_values`, `combine_values` (see
//! [`combiners`]) and the four joins. Missing join sides are `None`.
//!
//! ### Sorting
//!
//! [`Order`] entries compose left to right; [`Reverse`] flips a single component of a
//! composite key. All sorts are stable.
//!
//! ### Window functions
//!
//! Record canals (`Canal<R: Record>`, [`Row`] by default) evaluate [`WindowSpec`]s with
//! PARTITION BY, ORDER BY and ROWS/RANGE frames. Rows come back in input order with one new
//! column per spec.
//!
//! ### Caching
//!
//! [`Canal::cache`] materializes a canal once, lazily, and replays it to every later traversal,
//! including concurrent ones. Upstream side effects run at most once per position until
//! [`Canal::uncache`].
//!
//! ### Execution
//!
//! A [`Runner`] travels with each canal. The default is sequential. A parallel runner lets
//! sorting and window evaluation use rayon; results are identical either way.
//!
//! ## Module Overview
//!
//! - [`collection`] - the `Canal` handle and element-wise operators
//! - [`combiners`] - per-key aggregations (Count, Sum, Min, Max, AverageF64)
//! - [`record`] - records, items and JSON value ordering
//! - [`window`] - analytic window specifications
//! - [`order`] - composite sort orders
//! - [`runner`] - execution settings
//! - [`testing`] - assertions, fixtures and debug helpers

mod cache;
pub mod collection;
pub mod combiners;
pub mod error;
mod helpers;
mod node;
pub mod order;
pub mod record;
pub mod runner;
mod source;
pub mod testing;
pub mod tuple;
pub mod window;

// General re-exports
pub use collection::{Canal, Elem, Iter};
pub use combiners::{AverageF64, CombineFn, Count, Max, Min, Sum};
pub use error::CanalError;
pub use helpers::*;
pub use node::Extent;
pub use order::{Order, Reverse};
pub use record::{Datum, Item, Record, Row, compare_values, row};
pub use runner::{ExecMode, Runner};
pub use tuple::PairExt;
pub use window::{Frame, FrameBound, WindowFn, WindowSpec};
