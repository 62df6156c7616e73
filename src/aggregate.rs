//! Aggregation engine: nationality filtering, small-share merging and
//! whole-dataset recomputation for a nationality selection.
//!
//! Every function here is pure over its inputs. Derived datasets are fresh
//! values behind an `Arc`; the source datasets are never touched.

use crate::error::DataError;
use crate::models::{
    AreaEntry, AreaKind, CountryCount, DOMESTIC, Dataset, FOREIGN, MonthKey, MonthRecord, TOTAL,
    ViewData,
};
use crate::normalize::{Resolved, TranslationTable, resolve};
use ahash::AHashSet;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Synthetic table row summing every nationality left out of a partial selection.
pub const UNSELECTED: &str = "Unselected";
/// Synthetic pie slice absorbing selected nationalities below the merge threshold.
pub const OTHER: &str = "Other";
/// Synthetic table row for source labels with no known English name.
pub const UNKNOWN: &str = "Unknown";

pub const DEFAULT_MERGE_THRESHOLD_PERCENT: f64 = 2.0;

/// Canonical English nationality names chosen by the user. Empty means all.
///
/// `Total` and `Foreign` are aggregates, not nationalities, and are never kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeSet<String>", into = "BTreeSet<String>")]
pub struct Selection {
    names: BTreeSet<String>,
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let names = iter
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty() && !is_aggregate_label(s))
            .collect();
        Self { names }
    }
}

impl From<BTreeSet<String>> for Selection {
    fn from(names: BTreeSet<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<Selection> for BTreeSet<String> {
    fn from(s: Selection) -> Self {
        s.names
    }
}

impl Selection {
    /// The empty selection, i.e. every nationality.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in effect against `universe`: the selection itself, or the whole
    /// universe when nothing is selected.
    pub fn resolve<'a>(&'a self, universe: &'a [String]) -> AHashSet<&'a str> {
        if self.is_all() {
            universe.iter().map(String::as_str).collect()
        } else {
            self.names.iter().map(String::as_str).collect()
        }
    }

    fn equals_universe(&self, universe: &[String]) -> bool {
        self.names.len() == universe.len() && universe.iter().all(|n| self.names.contains(n))
    }

    fn is_all_but_domestic(&self, universe: &[String]) -> bool {
        universe.iter().any(|n| n == DOMESTIC)
            && !self.names.contains(DOMESTIC)
            && self.names.len() + 1 == universe.len()
            && universe
                .iter()
                .filter(|n| n.as_str() != DOMESTIC)
                .all(|n| self.names.contains(n))
    }
}

/// Tuning for the pie representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Slices strictly below this share (in percent of the selected total) go to "Other".
    pub threshold_percent: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_MERGE_THRESHOLD_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalityRow {
    pub nationality: String,
    pub tourists: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub nationality: String,
    pub tourists: f64,
    #[serde(rename = "relativePercentage")]
    pub relative_percentage: f64,
    /// Names folded into this slice; only set on the "Other" slice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged: Vec<String>,
}

/// Everything the detail card shows for one area in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    pub month_string: String,
    pub display_name: String,
    /// Selected nationalities by descending count, then the synthetic rows.
    pub table_list: Vec<NationalityRow>,
    pub total_tourist_sum: f64,
    pub total_tourists_filtered: f64,
    pub pie_chart_list: Vec<PieSlice>,
    pub pie_chart_sum: f64,
    /// Source labels of the rows summed into the "Unknown" row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped: Vec<String>,
}

impl DisplayData {
    /// Value of the synthetic "Unselected" row, 0 when absent.
    pub fn unselected_sum(&self) -> f64 {
        self.table_list
            .iter()
            .find(|r| r.nationality == UNSELECTED)
            .map(|r| r.tourists)
            .unwrap_or(0.0)
    }

    /// False when the selection has no visits here; the card then shows its no-data state.
    pub fn has_data(&self) -> bool {
        self.pie_chart_sum > 0.0
    }
}

fn is_aggregate_label(name: &str) -> bool {
    name.eq_ignore_ascii_case(TOTAL) || name.eq_ignore_ascii_case(FOREIGN)
}

/// Per-nationality breakdown of one area in one month, filtered by `selection`.
///
/// Rows whose English name is selected are listed by descending count (ties
/// keep source order). Everything in the universe but not selected collapses
/// into one "Unselected" row, present only for a partial selection. Labels with
/// no English name, or an English name outside both the universe and the
/// selection, are summed into an "Unknown" row and reported in `unmapped`.
///
/// ### Errors
/// [`DataError::MissingMonth`] / [`DataError::MissingArea`] when either key is absent.
pub fn filtered_area_data(
    view: &ViewData,
    translations: &TranslationTable,
    area_key: &str,
    month: &MonthKey,
    selection: &Selection,
    options: &MergeOptions,
) -> Result<DisplayData, DataError> {
    let entry = view.full.area(view.kind, month, area_key)?;

    let selected = selection.resolve(&view.universe);
    let universe: AHashSet<&str> = view.universe.iter().map(String::as_str).collect();
    let partial = universe.iter().any(|n| !selected.contains(n));

    let mut list_selected: Vec<NationalityRow> = Vec::new();
    let mut unselected_sum = 0.0;
    let mut unknown_sum = 0.0;
    let mut unmapped: Vec<String> = Vec::new();

    for c in &entry.countries {
        match resolve(c, translations) {
            Resolved::Known(en) if is_aggregate_label(en) => {}
            Resolved::Known(en) if selected.contains(en) => list_selected.push(NationalityRow {
                nationality: en.to_string(),
                tourists: c.count(),
            }),
            Resolved::Known(en) if universe.contains(en) => unselected_sum += c.count(),
            Resolved::Known(_) | Resolved::Unmapped(_) => {
                unknown_sum += c.count();
                unmapped.push(c.name.clone());
            }
        }
    }

    if !unmapped.is_empty() {
        warn!(
            "{} '{}' {}: unmapped nationalities {:?}",
            view.kind, area_key, month, unmapped
        );
    }

    // `sort_by` is stable: equal counts keep their source order.
    list_selected.sort_by(|a, b| b.tourists.total_cmp(&a.tourists));

    // fold from +0.0: an empty f64 sum() is -0.0
    let selected_total = list_selected.iter().fold(0.0, |acc, r| acc + r.tourists);

    let mut table_list = list_selected.clone();
    if partial {
        table_list.push(NationalityRow {
            nationality: UNSELECTED.to_string(),
            tourists: unselected_sum,
        });
    }
    if !unmapped.is_empty() {
        table_list.push(NationalityRow {
            nationality: UNKNOWN.to_string(),
            tourists: unknown_sum,
        });
    }
    let total_tourist_sum = table_list.iter().fold(0.0, |acc, r| acc + r.tourists);

    let pie_chart_list = merge_small_shares(&list_selected, selected_total, options);

    Ok(DisplayData {
        month_string: month.to_string(),
        display_name: entry.display_name.clone(),
        table_list,
        total_tourist_sum,
        total_tourists_filtered: selected_total,
        pie_chart_list,
        pie_chart_sum: selected_total,
        unmapped,
    })
}

/// Build pie slices from `rows` (already sorted), folding every row strictly
/// below `threshold_percent` of `total` into a trailing "Other" slice.
///
/// A zero `total` yields zero percentages, never NaN.
pub fn merge_small_shares(
    rows: &[NationalityRow],
    total: f64,
    options: &MergeOptions,
) -> Vec<PieSlice> {
    let share = |v: f64| if total > 0.0 { v / total } else { 0.0 };
    let threshold = total * options.threshold_percent / 100.0;

    let mut slices = Vec::with_capacity(rows.len());
    let mut other_sum = 0.0;
    let mut merged = Vec::new();

    for r in rows {
        if r.tourists < threshold {
            other_sum += r.tourists;
            merged.push(r.nationality.clone());
        } else {
            slices.push(PieSlice {
                nationality: r.nationality.clone(),
                tourists: r.tourists,
                relative_percentage: share(r.tourists),
                merged: Vec::new(),
            });
        }
    }

    if other_sum > 0.0 {
        slices.push(PieSlice {
            nationality: OTHER.to_string(),
            tourists: other_sum,
            relative_percentage: share(other_sum),
            merged,
        });
    }
    slices
}

/// How a selection is turned into a derived dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeCase {
    /// Nothing or everything selected: reuse the precomputed Total dataset.
    Baseline,
    /// Everything except Domestic: relabel the precomputed Foreign subtotal.
    Foreign,
    /// Any other selection: sum the selected nationalities.
    Mixed,
}

pub fn classify(selection: &Selection, universe: &[String]) -> RecomputeCase {
    if selection.is_all() || selection.equals_universe(universe) {
        RecomputeCase::Baseline
    } else if selection.is_all_but_domestic(universe) {
        RecomputeCase::Foreign
    } else {
        RecomputeCase::Mixed
    }
}

/// Derived dataset reflecting `selection`: one `Total` entry per area/month,
/// used for map colouring and the time-series graph.
pub fn recompute_series(selection: &Selection, view: &ViewData) -> Arc<Dataset> {
    let case = classify(selection, &view.universe);
    debug!(
        "recomputing {} dataset for {} selected nationalities: {:?}",
        view.kind,
        selection.names().len(),
        case
    );
    match case {
        RecomputeCase::Baseline => Arc::clone(&view.totals),
        RecomputeCase::Foreign => {
            let set = selection.resolve(&view.universe);
            Arc::new(map_areas(&view.full, view.kind, |entry| {
                match entry.labelled(FOREIGN) {
                    Some(f) => CountryCount::new(f.name.clone(), TOTAL, f.count()),
                    None => CountryCount::synthetic_total(sum_selected(entry, &set)),
                }
            }))
        }
        RecomputeCase::Mixed => Arc::new(recompute_mixed(selection, view)),
    }
}

/// The from-scratch algorithm behind every case: sum the selected
/// nationalities of every area/month into a synthetic Total entry.
pub fn recompute_mixed(selection: &Selection, view: &ViewData) -> Dataset {
    let set = selection.resolve(&view.universe);
    map_areas(&view.full, view.kind, |entry| {
        CountryCount::synthetic_total(sum_selected(entry, &set))
    })
}

fn sum_selected(entry: &AreaEntry, set: &AHashSet<&str>) -> f64 {
    entry
        .countries
        .iter()
        .filter(|c| !c.is_aggregate() && set.contains(c.country_name_english.trim()))
        .fold(0.0, |acc, c| acc + c.count())
}

fn map_areas<F>(source: &Dataset, kind: AreaKind, total_of: F) -> Dataset
where
    F: Fn(&AreaEntry) -> CountryCount,
{
    let records = source
        .records()
        .iter()
        .map(|rec| {
            let areas: BTreeMap<String, AreaEntry> = rec
                .areas(kind)
                .iter()
                .map(|(key, entry)| {
                    let derived = AreaEntry {
                        display_name: entry.display_name.clone(),
                        countries: vec![total_of(entry)],
                    };
                    (key.clone(), derived)
                })
                .collect();
            MonthRecord::new(rec.month, kind, areas)
        })
        .collect();
    Dataset::new(records)
}

/// Selected vs. unfiltered total of one area in one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaSums {
    pub selected: f64,
    pub total: f64,
}

/// Sums shown when hovering an area: `derived` is the dataset returned by
/// [`recompute_series`] for the current selection.
pub fn area_sums(
    view: &ViewData,
    derived: &Dataset,
    area_key: &str,
    month: &MonthKey,
) -> Result<AreaSums, DataError> {
    let total_of = |ds: &Dataset| -> Result<f64, DataError> {
        ds.area(view.kind, month, area_key)?
            .total()
            .ok_or_else(|| DataError::MissingTotal {
                area: area_key.to_string(),
                month: month.to_string(),
            })
    };
    Ok(AreaSums {
        selected: total_of(derived)?,
        total: total_of(&view.totals)?,
    })
}

/// Smallest and largest `Total` value over every area and month of `kind`.
pub fn total_range(dataset: &Dataset, kind: AreaKind) -> Option<(f64, f64)> {
    let values: Vec<f64> = dataset
        .records()
        .iter()
        .flat_map(|r| r.areas(kind).values())
        .filter_map(AreaEntry::total)
        .collect();
    if values.is_empty() {
        return None;
    }
    Some((
        values.iter().cloned().fold(f64::INFINITY, f64::min),
        values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: &str, v: f64) -> NationalityRow {
        NationalityRow {
            nationality: n.into(),
            tourists: v,
        }
    }

    #[test]
    fn merge_keeps_share_exactly_at_threshold() {
        // total 100, 2% threshold = 2
        let rows = vec![row("A", 90.0), row("B", 2.0), row("C", 1.5), row("D", 6.5)];
        let pie = merge_small_shares(&rows, 100.0, &MergeOptions::default());
        let names: Vec<&str> = pie.iter().map(|s| s.nationality.as_str()).collect();
        assert_eq!(names, ["A", "B", "D", "Other"]);
        let other = pie.last().unwrap();
        assert_eq!(other.tourists, 1.5);
        assert_eq!(other.merged, vec!["C".to_string()]);
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let rows = vec![row("A", 0.0), row("B", 0.0)];
        let pie = merge_small_shares(&rows, 0.0, &MergeOptions::default());
        assert_eq!(pie.len(), 2);
        assert!(pie.iter().all(|s| s.relative_percentage == 0.0));
    }

    #[test]
    fn classify_cases() {
        let universe: Vec<String> = ["Domestic", "Germany", "Italy"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(classify(&Selection::all(), &universe), RecomputeCase::Baseline);
        let full: Selection = universe.iter().collect();
        assert_eq!(classify(&full, &universe), RecomputeCase::Baseline);
        let foreign: Selection = ["Germany", "Italy"].into_iter().collect();
        assert_eq!(classify(&foreign, &universe), RecomputeCase::Foreign);
        let mixed: Selection = ["Domestic", "Italy"].into_iter().collect();
        assert_eq!(classify(&mixed, &universe), RecomputeCase::Mixed);
    }
}
