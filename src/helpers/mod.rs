pub(crate) mod analytic;
pub(crate) mod combine;
pub(crate) mod distinct;
pub(crate) mod document;
pub(crate) mod joins;
pub(crate) mod keyed;
pub(crate) mod limits;
pub(crate) mod set_ops;
pub(crate) mod sliding;
pub(crate) mod sort;
pub(crate) mod terminals;
pub(crate) mod values;
pub(crate) mod zip;

// Only re-export the types operators hand back
pub use document::Table;
pub use limits::Until;
pub use zip::Phase;
