//! Index join: a stock's frame side by side with a market-index frame.
//!
//! Rows are matched on date (inner join). Index columns get the `_x` suffix,
//! stock columns `_y`, and the label is the stock's. Optionally rows whose
//! stock label is Unlabeled are dropped, and named columns removed.

use featurelab_core::{Column, FeatureError, FeatureFrame};
use tracing::debug;

pub const INDEX_SUFFIX: &str = "_x";
pub const STOCK_SUFFIX: &str = "_y";

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Drop rows whose stock label is Unlabeled.
    pub drop_unlabeled: bool,
    /// Column names (after suffixing) to remove from the result.
    pub drop_columns: Vec<String>,
}

/// Join `stock` with `index` on date.
pub fn merge_with_index(
    index: &FeatureFrame,
    stock: &FeatureFrame,
    opts: &MergeOptions,
) -> Result<FeatureFrame, FeatureError> {
    let (index_rows, stock_rows) = matching_rows(index, stock);

    let index_part = index.select_rows(&index_rows)?.with_suffix(INDEX_SUFFIX);
    let stock_part = stock.select_rows(&stock_rows)?.with_suffix(STOCK_SUFFIX);

    let mut columns: Vec<Column> = index_part.columns().to_vec();
    columns.extend(stock_part.columns().iter().cloned());

    let mut merged = FeatureFrame::from_parts(
        stock.symbol().map(str::to_string),
        stock_part.dates().to_vec(),
        columns,
        stock_part.labels().to_vec(),
    )?;

    for name in &opts.drop_columns {
        merged.drop_column(name)?;
    }
    if opts.drop_unlabeled {
        merged = merged.labeled_only();
    }

    debug!(
        symbol = merged.symbol().unwrap_or("-"),
        index_rows = index.len(),
        stock_rows = stock.len(),
        merged_rows = merged.len(),
        "merged with index"
    );
    Ok(merged)
}

/// Row positions with equal dates in both frames. Dates are strictly
/// increasing in each frame.
fn matching_rows(left: &FeatureFrame, right: &FeatureFrame) -> (Vec<usize>, Vec<usize>) {
    let (l, r) = (left.dates(), right.dates());
    let mut left_rows = Vec::new();
    let mut right_rows = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < l.len() && j < r.len() {
        match l[i].cmp(&r[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                left_rows.push(i);
                right_rows.push(j);
                i += 1;
                j += 1;
            }
        }
    }
    (left_rows, right_rows)
}
