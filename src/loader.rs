//! Loader for the static JSON resources behind the dashboard.
//!
//! Resources come from a local directory or from a base URL. [`Loader::load`]
//! fetches all of them concurrently and only returns once every fetch has
//! finished; if any required resource fails, loading fails as a whole. There
//! is no retry: a failed load is reported, not papered over.
//!
//! The two nationality list files are optional. When one is absent, the
//! universe for that view is derived from the breakdown dataset instead.
//!
//! Typical usage:
//! ```no_run
//! # use turizem::loader::{DataSource, Loader};
//! let loader = Loader::new(DataSource::parse("data"))?;
//! let data = loader.load()?;
//! println!("{} months", data.municipalities.totals.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::models::{AreaKind, Dataset, MonthRecord, TourismData, ViewData};
use crate::normalize::{TranslationTable, collect_universe, sort_universe};
use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Where the JSON resources live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Dir(PathBuf),
    /// Base URL; resource names are appended as path segments.
    Http(String),
}

impl DataSource {
    /// `http://` and `https://` prefixes select HTTP, anything else is a directory.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Http(s.trim_end_matches('/').to_string())
        } else {
            DataSource::Dir(PathBuf::from(s))
        }
    }
}

/// File names of the resources, relative to the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub municipalities: String,
    pub regions: String,
    pub municipality_totals: String,
    pub region_totals: String,
    pub translations: String,
    pub nationalities_municipalities: String,
    pub nationalities_regions: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            municipalities: "tourist_data_grouped_ENG.json".into(),
            regions: "sr_data_grouped.json".into(),
            municipality_totals: "tourist_data_grouped_total.json".into(),
            region_totals: "sr_data_grouped_total.json".into(),
            translations: "nationality_translations.json".into(),
            nationalities_municipalities: "nationalities_mun.json".into(),
            nationalities_regions: "nationalities_sr.json".into(),
        }
    }
}

// Allow -, _, . unescaped in file names
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

#[derive(Debug, Clone)]
pub struct Loader {
    source: DataSource,
    files: DataFiles,
    http: Option<HttpClient>,
}

impl Loader {
    pub fn new(source: DataSource) -> Result<Self> {
        let http = match source {
            DataSource::Http(_) => Some(
                HttpClient::builder()
                    .timeout(Duration::from_secs(30))
                    .connect_timeout(Duration::from_secs(10))
                    .redirect(Policy::limited(5))
                    .user_agent(concat!("turizem/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .context("build http client")?,
            ),
            DataSource::Dir(_) => None,
        };
        Ok(Self {
            source,
            files: DataFiles::default(),
            http,
        })
    }

    pub fn with_files(mut self, files: DataFiles) -> Self {
        self.files = files;
        self
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Body of one resource; `None` when the source reports it as absent.
    fn fetch_text(&self, name: &str) -> Result<Option<String>> {
        match &self.source {
            DataSource::Dir(dir) => {
                let path = dir.join(name);
                match std::fs::read_to_string(&path) {
                    Ok(s) => Ok(Some(s)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
                }
            }
            DataSource::Http(base) => {
                let http = self
                    .http
                    .as_ref()
                    .ok_or_else(|| anyhow!("http client not initialised"))?;
                let url = format!(
                    "{}/{}",
                    base,
                    percent_encoding::utf8_percent_encode(name, SAFE)
                );
                let resp = http.get(&url).send().with_context(|| format!("GET {}", url))?;
                match resp.status() {
                    StatusCode::NOT_FOUND => Ok(None),
                    s if s.is_success() => {
                        Ok(Some(resp.text().with_context(|| format!("read body of {}", url))?))
                    }
                    s => bail!("GET {} failed with HTTP {}", url, s),
                }
            }
        }
    }

    /// Fetch every resource concurrently, then parse them into [`TourismData`].
    pub fn load(&self) -> Result<TourismData> {
        let f = &self.files;
        let names = [
            f.municipalities.as_str(),
            f.regions.as_str(),
            f.municipality_totals.as_str(),
            f.region_totals.as_str(),
            f.translations.as_str(),
            f.nationalities_municipalities.as_str(),
            f.nationalities_regions.as_str(),
        ];

        let mut bodies: Vec<Option<String>> = std::thread::scope(|s| {
            let handles: Vec<_> = names
                .iter()
                .map(|name| s.spawn(move || self.fetch_text(name)))
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .unwrap_or_else(|_| Err(anyhow!("loader thread panicked")))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut take = |i: usize| bodies[i].take();
        let required = |body: Option<String>, name: &str| {
            body.ok_or_else(|| anyhow!("missing data resource {}", name))
        };

        let mun_full = parse_dataset(&required(take(0), names[0])?)
            .with_context(|| format!("parse {}", names[0]))?;
        let sr_full = parse_dataset(&required(take(1), names[1])?)
            .with_context(|| format!("parse {}", names[1]))?;
        let mun_totals = parse_dataset(&required(take(2), names[2])?)
            .with_context(|| format!("parse {}", names[2]))?;
        let sr_totals = parse_dataset(&required(take(3), names[3])?)
            .with_context(|| format!("parse {}", names[3]))?;
        let translations = parse_translations(&required(take(4), names[4])?)
            .with_context(|| format!("parse {}", names[4]))?;

        let universe = |body: Option<String>, name: &str, full: &Dataset, kind: AreaKind| {
            match body {
                Some(text) => parse_universe(&text).with_context(|| format!("parse {}", name)),
                None => {
                    warn!("{} not found, deriving {} nationalities from data", name, kind);
                    Ok(collect_universe(full, kind))
                }
            }
        };
        let mun_universe = universe(take(5), names[5], &mun_full, AreaKind::Municipality)?;
        let sr_universe = universe(take(6), names[6], &sr_full, AreaKind::Region)?;

        for (ds, kind, name) in [
            (&mun_full, AreaKind::Municipality, names[0]),
            (&sr_full, AreaKind::Region, names[1]),
        ] {
            if ds.records().iter().all(|r| r.areas(kind).is_empty()) {
                warn!("{} has no {} entries", name, kind.container());
            }
        }

        info!(
            "loaded {} months, {} translations, {}/{} nationalities",
            mun_totals.len(),
            translations.len(),
            mun_universe.len(),
            sr_universe.len()
        );

        Ok(TourismData {
            municipalities: ViewData {
                kind: AreaKind::Municipality,
                full: Arc::new(mun_full),
                totals: Arc::new(mun_totals),
                universe: mun_universe,
            },
            regions: ViewData {
                kind: AreaKind::Region,
                full: Arc::new(sr_full),
                totals: Arc::new(sr_totals),
                universe: sr_universe,
            },
            translations,
        })
    }
}

/// Parse a month-record array (`[{"month": "2020M01", "municipalities": {...}}, ...]`).
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    let records: Vec<MonthRecord> = serde_json::from_str(text).context("decode month records")?;
    Ok(Dataset::new(records))
}

#[derive(Deserialize)]
struct TranslationRow {
    name: String,
    #[serde(rename = "countryNameEnglish", alias = "english")]
    english: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranslationsFile {
    Map(BTreeMap<String, String>),
    Rows(Vec<TranslationRow>),
}

/// Parse the translation table: an object `{source: english}` or an array of
/// `{name, countryNameEnglish}` rows.
pub fn parse_translations(text: &str) -> Result<TranslationTable> {
    let file: TranslationsFile = serde_json::from_str(text).context("decode translations")?;
    Ok(match file {
        TranslationsFile::Map(m) => m.into_iter().collect(),
        TranslationsFile::Rows(rows) => rows.into_iter().map(|r| (r.name, r.english)).collect(),
    })
}

/// Parse a nationality list and put it in display order.
pub fn parse_universe(text: &str) -> Result<Vec<String>> {
    let names: Vec<String> = serde_json::from_str(text).context("decode nationality list")?;
    Ok(sort_universe(names))
}
