//! turizem
//!
//! Aggregation, filtering and colour mapping of monthly overnight-stay
//! statistics for Slovenian municipalities and statistical regions. Pairs with
//! the `turizem` CLI.
//!
//! ### Features
//! - Load the month/area/nationality datasets from a directory or a base URL
//! - Per-area nationality breakdown with small shares merged into "Other"
//! - Recompute the whole dataset for a nationality selection
//! - Map aggregate values to a multi-stop colour gradient with a no-data sentinel
//! - Export tables and series as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use turizem::{AppContext, Config, Loader, DataSource, Selection};
//!
//! let config = Config::load(None)?;
//! let settings = config.validate()?;
//! let data = Loader::new(DataSource::parse(&config.data))?.load()?;
//! let mut ctx = AppContext::new(data, settings);
//! ctx.apply_selection(["Germany", "Italy"].into_iter().collect::<Selection>());
//! let card = ctx.area_display("Ljubljana")?;
//! for row in &card.table_list {
//!     println!("{}: {}", row.nationality, row.tourists);
//! }
//! println!("fill {}", ctx.area_color("Ljubljana"));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod series;
pub mod storage;

pub use aggregate::{DisplayData, MergeOptions, NationalityRow, PieSlice, Selection};
pub use color::{ColorScale, Curve, Rgb};
pub use config::{Config, Settings};
pub use context::AppContext;
pub use error::{ColorError, ConfigError, DataError, MonthKeyError};
pub use loader::{DataSource, Loader};
pub use models::{AreaKind, Dataset, MonthKey, TourismData};
