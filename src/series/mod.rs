//! Series module - one-dimensional named columns and the rolling window
//! primitive that operates on them.

pub mod base;
pub mod functions;
pub mod registry;
pub mod window;

pub use base::Series;
pub use registry::{default_registry, AggregationFn, AggregationRegistry};
pub use window::{Rolling, WindowClosed, WindowExt, WindowOps, WindowValue};
