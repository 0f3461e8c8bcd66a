//! Result assembler

use crate::core::error::Result;
use crate::dataframe::DataFrame;

/// Stack partition frames and restore the caller's row order. Columns come
/// out as the input columns followed by the derived columns.
pub fn assemble(
    frames: Vec<DataFrame>,
    input_columns: &[String],
    derived_columns: &[String],
) -> Result<DataFrame> {
    let mut order = Vec::with_capacity(input_columns.len() + derived_columns.len());
    order.extend_from_slice(input_columns);
    order.extend_from_slice(derived_columns);

    DataFrame::concat(frames, &order)?.sort_by_index()
}
