//! Typed failures raised by the engine itself.
//!
//! Everything public returns [`anyhow::Result`]; the variants below are the ones the engine
//! produces on its own (as opposed to errors coming out of user closures). Callers that need
//! to react to a specific condition can `downcast_ref::<CanalError>()` the returned error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanalError {
    /// A blocking operator or a full-traversal terminal was asked to drain a canal that
    /// never ends (producer-backed and not bounded by `limit`/`until`/`zip`).
    #[error("`{op}` needs a finite upstream, but this canal is unbounded; bound it with `limit`, `until` or `take` first")]
    Unbounded { op: &'static str },

    #[error("index {index} is out of bounds for a canal of {len} elements")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("sliding windows need a positive size and step (got size={size}, step={step})")]
    InvalidSliding { size: usize, step: usize },

    #[error("invalid window frame for `{alias}`: {reason}")]
    InvalidFrame { alias: String, reason: String },

    #[error("RANGE frame with value offsets for `{alias}` needs exactly one ORDER BY item, found {found}")]
    RangeOrderKey { alias: String, found: usize },

    #[error("RANGE frame for `{alias}` met a non-numeric ORDER BY value")]
    NonNumericRangeKey { alias: String },

    #[error("cannot uncache while another cursor is filling the cache")]
    CacheBusy,

    #[error("cache fill failed earlier: {reason}")]
    CachePoisoned { reason: String },

    #[error("expected a JSON object to build a row, found {found}")]
    NotARecord { found: String },
}
