//! Monthly time series for the graph panel.

use crate::error::DataError;
use crate::models::{AreaKind, Dataset, MonthKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Area key of the national aggregate, graphed when no area is focused.
pub const NATIONAL_AREA_KEY: &str = "slovenija";

/// Number of months visible in the graph at once.
pub const DEFAULT_WINDOW: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: MonthKey,
    pub date: NaiveDate,
    pub value: f64,
}

/// The `Total` value of `area_key` for every month of `dataset`, in month order.
///
/// Pass a derived dataset to graph the current nationality selection.
pub fn area_series(
    dataset: &Dataset,
    kind: AreaKind,
    area_key: &str,
) -> Result<Vec<SeriesPoint>, DataError> {
    dataset
        .records()
        .iter()
        .map(|rec| {
            let entry = dataset.area(kind, &rec.month, area_key)?;
            let value = entry.total().ok_or_else(|| DataError::MissingTotal {
                area: area_key.to_string(),
                month: rec.month.to_string(),
            })?;
            Ok(SeriesPoint {
                month: rec.month,
                date: rec.month.first_day(),
                value,
            })
        })
        .collect()
}

/// Index range of the points visible around `index` in a `window`-month view.
///
/// The window sticks to the start for the first half-window of months, to
/// the end for the last, and slides with `index` in between.
pub fn visible_window(index: usize, len: usize, window: usize) -> Range<usize> {
    if len == 0 {
        return 0..0;
    }
    let size = window.clamp(1, len);
    let half = size / 2;
    let index = index.min(len - 1);

    let start = if index <= half {
        0
    } else if index >= len - half {
        len - size
    } else {
        index - half
    };
    start..(start + size).min(len)
}
