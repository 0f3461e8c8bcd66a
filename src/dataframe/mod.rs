// DataFrame implementations module
pub mod base;
pub mod groupby;
pub mod window;

// Re-exports for convenience
pub use base::DataFrame;
pub use groupby::{DataFrameGroupBy, GroupByExt};
pub use window::DataFrameWindowExt;
