use crate::error::{DataError, MonthKeyError};
use crate::normalize::TranslationTable;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

/// Label of the unfiltered grand total entry of an area/month.
pub const TOTAL: &str = "Total";
/// Label of the precomputed foreign-visitors subtotal.
pub const FOREIGN: &str = "Foreign";
/// Label of domestic visitors. Sorted first in every nationality universe.
pub const DOMESTIC: &str = "Domestic";

/// Which kind of area a dataset is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    Municipality,
    Region,
}

impl AreaKind {
    /// JSON container name holding the areas of this kind inside a month record.
    pub fn container(self) -> &'static str {
        match self {
            AreaKind::Municipality => "municipalities",
            AreaKind::Region => "regions",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AreaKind::Municipality => AreaKind::Region,
            AreaKind::Region => AreaKind::Municipality,
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AreaKind::Municipality => write!(f, "municipality"),
            AreaKind::Region => write!(f, "region"),
        }
    }
}

/// Calendar month in the statistical office's `YYYYMmm` notation (e.g. `2020M01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

static MONTH_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})M(0[1-9]|1[0-2])$").expect("valid regex"));

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(MonthKeyError(format!("{year:04}M{month:02}")));
        }
        Ok(Self { year, month })
    }

    /// First day of the month, used as the time-axis position.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MONTH_KEY_RE
            .captures(s.trim())
            .ok_or_else(|| MonthKeyError(s.to_string()))?;
        let year = caps[1].parse::<i32>().map_err(|_| MonthKeyError(s.to_string()))?;
        let month = caps[2].parse::<u32>().map_err(|_| MonthKeyError(s.to_string()))?;
        Ok(Self { year, month })
    }
}

impl TryFrom<String> for MonthKey {
    type Error = MonthKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MonthKey> for String {
    fn from(k: MonthKey) -> Self {
        k.to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}M{:02}", self.year, self.month)
    }
}

/// Serde helper: parse an overnight-stay count from a JSON number or a string.
///
/// The statistical office writes `-`, `z` or `...` for cells with no (or
/// confidential) data; those read as 0. Negative counts are rejected.
fn de_count<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a non-negative number or numeric string")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as f64)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("negative count"));
            }
            Ok(v as f64)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v < 0.0 {
                return Err(E::custom(format!("invalid count {v}")));
            }
            Ok(v)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match s.trim() {
                "" | "-" | "z" | "..." => Ok(0.0),
                t => {
                    let v = t.parse::<f64>().map_err(E::custom)?;
                    self.visit_f64(v)
                }
            }
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(0.0)
        }
    }

    deserializer.deserialize_any(CountVisitor)
}

/// Wrapper matching the nested `data: { data: n }` shape of the source files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CountValue {
    #[serde(deserialize_with = "de_count", default)]
    pub data: f64,
}

/// One nationality's count for one area in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCount {
    /// Source-language label (e.g. "Nemčija").
    pub name: String,
    #[serde(rename = "countryNameEnglish", default)]
    pub country_name_english: String,
    #[serde(default)]
    pub data: CountValue,
}

impl CountryCount {
    pub fn new(name: impl Into<String>, english: impl Into<String>, count: f64) -> Self {
        Self {
            name: name.into(),
            country_name_english: english.into(),
            data: CountValue { data: count },
        }
    }

    /// Synthetic grand-total entry emitted by selection recomputation.
    pub fn synthetic_total(count: f64) -> Self {
        Self::new("skupaj", TOTAL, count)
    }

    #[inline]
    pub fn count(&self) -> f64 {
        self.data.data
    }

    /// Whether the English label equals `label`, ignoring case and surrounding whitespace.
    pub fn is_labelled(&self, label: &str) -> bool {
        self.country_name_english.trim().eq_ignore_ascii_case(label)
    }

    /// `Total` and `Foreign` are derived aggregates, never selectable nationalities.
    pub fn is_aggregate(&self) -> bool {
        self.is_labelled(TOTAL) || self.is_labelled(FOREIGN)
    }
}

/// All nationality counts of one area in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AreaEntry {
    /// Human-readable area name in its local form.
    #[serde(rename = "name", alias = "display_name", default)]
    pub display_name: String,
    #[serde(default)]
    pub countries: Vec<CountryCount>,
}

impl AreaEntry {
    pub fn labelled(&self, label: &str) -> Option<&CountryCount> {
        self.countries.iter().find(|c| c.is_labelled(label))
    }

    /// Value of the `Total` entry, if present.
    pub fn total(&self) -> Option<f64> {
        self.labelled(TOTAL).map(CountryCount::count)
    }
}

/// One month of data: areas keyed by their normalized name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: MonthKey,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub municipalities: BTreeMap<String, AreaEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub regions: BTreeMap<String, AreaEntry>,
}

impl MonthRecord {
    pub fn new(month: MonthKey, kind: AreaKind, areas: BTreeMap<String, AreaEntry>) -> Self {
        let mut rec = Self {
            month,
            municipalities: BTreeMap::new(),
            regions: BTreeMap::new(),
        };
        match kind {
            AreaKind::Municipality => rec.municipalities = areas,
            AreaKind::Region => rec.regions = areas,
        }
        rec
    }

    /// The one place that resolves which container holds areas of `kind`.
    pub fn areas(&self, kind: AreaKind) -> &BTreeMap<String, AreaEntry> {
        match kind {
            AreaKind::Municipality => &self.municipalities,
            AreaKind::Region => &self.regions,
        }
    }
}

/// Month records ordered by month. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "Vec<MonthRecord>", into = "Vec<MonthRecord>")]
pub struct Dataset {
    records: Vec<MonthRecord>,
}

impl From<Vec<MonthRecord>> for Dataset {
    fn from(records: Vec<MonthRecord>) -> Self {
        Self::new(records)
    }
}

impl From<Dataset> for Vec<MonthRecord> {
    fn from(ds: Dataset) -> Self {
        ds.records
    }
}

impl Dataset {
    /// Build a dataset, ordering records chronologically.
    pub fn new(mut records: Vec<MonthRecord>) -> Self {
        records.sort_by_key(|r| r.month);
        Self { records }
    }

    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.records.iter().map(|r| r.month).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn month(&self, month: &MonthKey) -> Result<&MonthRecord, DataError> {
        self.records
            .binary_search_by_key(month, |r| r.month)
            .map(|i| &self.records[i])
            .map_err(|_| DataError::MissingMonth {
                month: month.to_string(),
            })
    }

    /// Look up one area; a miss on either key is a hard error.
    pub fn area(
        &self,
        kind: AreaKind,
        month: &MonthKey,
        area_key: &str,
    ) -> Result<&AreaEntry, DataError> {
        self.month(month)?
            .areas(kind)
            .get(area_key)
            .ok_or_else(|| DataError::MissingArea {
                area: area_key.to_string(),
                month: month.to_string(),
            })
    }
}

/// Everything loaded for one view (municipalities or statistical regions).
#[derive(Debug, Clone)]
pub struct ViewData {
    pub kind: AreaKind,
    /// Per-nationality breakdown for every area/month.
    pub full: Arc<Dataset>,
    /// Precomputed Total-only variant, the unfiltered baseline.
    pub totals: Arc<Dataset>,
    /// Selectable nationalities, in display order.
    pub universe: Vec<String>,
}

/// All loaded input, for both views.
#[derive(Debug, Clone)]
pub struct TourismData {
    pub municipalities: ViewData,
    pub regions: ViewData,
    pub translations: TranslationTable,
}

impl TourismData {
    pub fn view(&self, kind: AreaKind) -> &ViewData {
        match kind {
            AreaKind::Municipality => &self.municipalities,
            AreaKind::Region => &self.regions,
        }
    }
}
