//! Name normalization and nationality translation.
//!
//! Source files label nationalities in Slovenian with inconsistent casing and
//! diacritics ("Nemčija", "NEMCIJA "). Everything that groups by nationality or
//! looks up an area joins on [`normalize`]d keys.

use crate::models::{AreaKind, CountryCount, DOMESTIC, Dataset, FOREIGN, TOTAL};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use unicode_normalization::UnicodeNormalization;

/// Canonical join key: NFD-decompose, drop combining marks (U+0300..=U+036F),
/// trim, lower-case. Total and idempotent.
///
/// Lower-casing runs before decomposition: `İ` lower-cases to `i` plus a
/// combining dot, which must be stripped in the same pass.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lookup key for an area in the month/area dataset, from a raw geographic
/// feature name such as "Škofja Loka".
pub fn normalize_area_name(raw: &str) -> String {
    normalize(raw)
}

/// Source-language nationality label -> canonical English name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TranslationTable {
    entries: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for TranslationTable {
    fn from(raw: BTreeMap<String, String>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<TranslationTable> for BTreeMap<String, String> {
    fn from(t: TranslationTable) -> Self {
        t.entries
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), v.into()))
            .collect();
        Self { entries }
    }
}

impl TranslationTable {
    pub fn english_name(&self, raw: &str) -> Option<&str> {
        self.entries.get(&normalize(raw)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of mapping a source record to its canonical nationality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a> {
    Known(&'a str),
    Unmapped(&'a str),
}

/// Translation table first, then the record's own English label, else unmapped.
pub fn resolve<'a>(country: &'a CountryCount, table: &'a TranslationTable) -> Resolved<'a> {
    if let Some(en) = table.english_name(&country.name) {
        return Resolved::Known(en);
    }
    let en = country.country_name_english.trim();
    if en.is_empty() {
        Resolved::Unmapped(country.name.as_str())
    } else {
        Resolved::Known(en)
    }
}

fn is_other_bucket(name: &str) -> bool {
    name.starts_with("Other ")
}

/// Order a nationality universe for display: `Domestic` first, then
/// nationalities alphabetically, then `Other …` buckets. `Total` and
/// `Foreign` are dropped, as are duplicates and blanks.
pub fn sort_universe<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let set: BTreeSet<String> = names
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty() && s != TOTAL && s != FOREIGN)
        .collect();

    let mut out = Vec::with_capacity(set.len());
    if set.contains(DOMESTIC) {
        out.push(DOMESTIC.to_string());
    }
    out.extend(
        set.iter()
            .filter(|s| s.as_str() != DOMESTIC && !is_other_bucket(s))
            .cloned(),
    );
    out.extend(set.iter().filter(|s| is_other_bucket(s)).cloned());
    out
}

/// Derive the selectable universe of one view from the English labels present
/// in its breakdown dataset.
pub fn collect_universe(dataset: &Dataset, kind: AreaKind) -> Vec<String> {
    let names = dataset
        .records()
        .iter()
        .flat_map(|r| r.areas(kind).values())
        .flat_map(|a| a.countries.iter())
        .map(|c| c.country_name_english.as_str());
    sort_universe(names)
}
