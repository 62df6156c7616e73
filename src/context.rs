//! Application context: the state a dashboard session carries between events.
//!
//! The context owns the loaded data and the user's choices (view, month,
//! nationality selection) and hands the aggregation and colour functions
//! only the immutable slices they need.

use crate::aggregate::{self, AreaSums, DisplayData, Selection};
use crate::color::{ColorScale, Rgb};
use crate::config::Settings;
use crate::error::DataError;
use crate::models::{AreaKind, Dataset, MonthKey, TourismData, ViewData};
use crate::normalize::normalize_area_name;
use crate::series::{self, NATIONAL_AREA_KEY, SeriesPoint};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppContext {
    data: TourismData,
    settings: Settings,
    kind: AreaKind,
    selection: Selection,
    month_index: usize,
    /// Dataset reflecting `selection`, one Total entry per area/month.
    derived: Arc<Dataset>,
    /// `settings.scale` fitted to the current derived dataset.
    scale: ColorScale,
}

impl AppContext {
    /// Start in the municipality view, first month, nothing filtered.
    pub fn new(data: TourismData, settings: Settings) -> Self {
        let derived = Arc::clone(&data.municipalities.totals);
        let scale = settings.scale.clone();
        let mut ctx = Self {
            data,
            settings,
            kind: AreaKind::Municipality,
            selection: Selection::all(),
            month_index: 0,
            derived,
            scale,
        };
        ctx.refit_scale();
        ctx
    }

    pub fn data(&self) -> &TourismData {
        &self.data
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn kind(&self) -> AreaKind {
        self.kind
    }

    pub fn view(&self) -> &ViewData {
        self.data.view(self.kind)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn derived(&self) -> &Arc<Dataset> {
        &self.derived
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.view().totals.months()
    }

    pub fn month_index(&self) -> usize {
        self.month_index
    }

    pub fn current_month(&self) -> Option<MonthKey> {
        self.months().get(self.month_index).copied()
    }

    fn month(&self) -> Result<MonthKey, DataError> {
        self.current_month().ok_or_else(|| DataError::MissingMonth {
            month: format!("#{}", self.month_index),
        })
    }

    /// Move the timeline; out-of-range indices clamp to the last month.
    pub fn set_month_index(&mut self, index: usize) -> usize {
        let len = self.months().len();
        self.month_index = index.min(len.saturating_sub(1));
        self.month_index
    }

    pub fn set_month(&mut self, month: &MonthKey) -> Result<(), DataError> {
        let idx = self
            .months()
            .iter()
            .position(|m| m == month)
            .ok_or_else(|| DataError::MissingMonth {
                month: month.to_string(),
            })?;
        self.month_index = idx;
        Ok(())
    }

    /// Advance one month, wrapping to the first after the last.
    pub fn next_month(&mut self) -> Option<MonthKey> {
        let len = self.months().len();
        if len == 0 {
            return None;
        }
        self.month_index = (self.month_index + 1) % len;
        self.current_month()
    }

    /// Switch view. The nationality universe differs per view, so the
    /// selection resets to everything.
    pub fn set_view(&mut self, kind: AreaKind) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        self.selection = Selection::all();
        self.derived = Arc::clone(&self.view().totals);
        self.set_month_index(self.month_index);
        self.refit_scale();
        debug!("switched to {} view", kind);
    }

    pub fn toggle_view(&mut self) {
        self.set_view(self.kind.toggled());
    }

    /// Confirm a nationality selection and rebuild the derived dataset.
    pub fn apply_selection(&mut self, selection: Selection) {
        self.derived = aggregate::recompute_series(&selection, self.view());
        self.selection = selection;
        self.refit_scale();
    }

    fn refit_scale(&mut self) {
        let data_max = aggregate::total_range(&self.derived, self.kind)
            .map(|(_, hi)| hi)
            .unwrap_or(1.0);
        let min = self.settings.min_value.unwrap_or(0.0);
        let max = self.settings.max_value.unwrap_or(data_max.max(min));
        self.scale = match self.settings.scale.with_range(min, max) {
            Ok(s) => s,
            Err(e) => {
                warn!("keeping configured color range: {e}");
                self.settings.scale.clone()
            }
        };
    }

    /// Detail-card data for an area, by raw or normalized name.
    pub fn area_display(&self, area: &str) -> Result<DisplayData, DataError> {
        aggregate::filtered_area_data(
            self.view(),
            &self.data.translations,
            &normalize_area_name(area),
            &self.month()?,
            &self.selection,
            &self.settings.merge,
        )
    }

    /// Tooltip sums for an area in the current month.
    pub fn area_sums(&self, area: &str) -> Result<AreaSums, DataError> {
        aggregate::area_sums(
            self.view(),
            &self.derived,
            &normalize_area_name(area),
            &self.month()?,
        )
    }

    fn area_value(&self, key: &str) -> Result<f64, DataError> {
        let month = self.month()?;
        self.derived
            .area(self.kind, &month, key)?
            .total()
            .ok_or_else(|| DataError::MissingTotal {
                area: key.to_string(),
                month: month.to_string(),
            })
    }

    /// Fill colour of one area. Missing data yields the error colour for this
    /// area only.
    pub fn area_color(&self, area: &str) -> Rgb {
        match self.area_value(&normalize_area_name(area)) {
            Ok(v) => self.scale.map_value(v),
            Err(e) => {
                warn!("{e}");
                self.settings.error_color
            }
        }
    }

    /// Fill colour of every area known for the current month.
    pub fn map_colors(&self) -> BTreeMap<String, Rgb> {
        let Ok(month) = self.month() else {
            return BTreeMap::new();
        };
        let Ok(rec) = self.view().totals.month(&month) else {
            return BTreeMap::new();
        };
        rec.areas(self.kind)
            .keys()
            .map(|key| (key.clone(), self.area_color(key)))
            .collect()
    }

    /// Monthly series for the graph: the given area, or the national total.
    pub fn series(&self, area: Option<&str>) -> Result<Vec<SeriesPoint>, DataError> {
        let key = area
            .map(normalize_area_name)
            .unwrap_or_else(|| NATIONAL_AREA_KEY.to_string());
        series::area_series(&self.derived, self.kind, &key)
    }
}
