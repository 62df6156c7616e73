use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use turizem::format::{format_count, format_share};
use turizem::series::{DEFAULT_WINDOW, visible_window};
use turizem::{AppContext, AreaKind, Config, DataSource, Loader, MonthKey, Selection};
use turizem::storage;

#[derive(Parser, Debug)]
#[command(
    name = "turizem",
    version,
    about = "Aggregate, filter and colour-map monthly tourism statistics for Slovenia"
)]
struct Cli {
    /// Config file (JSON). Defaults to <config dir>/turizem/turizem.json when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Data directory or base URL, overriding the config file.
    #[arg(long, global = true)]
    data: Option<String>,
    /// Locale for number formatting (en, sl, de, fr, ...).
    #[arg(long, global = true, default_value = "en")]
    locale: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the months present in the data.
    Months(ViewOpt),
    /// List the selectable nationalities of a view, in display order.
    Nationalities(ViewOpt),
    /// Nationality breakdown of one area in one month.
    Area(AreaArgs),
    /// Fill colour of every area in one month.
    Colors(ColorsArgs),
    /// Monthly totals of one area (or the whole country).
    Series(SeriesArgs),
    /// Legend samples of the colour scale.
    Legend(LegendArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum ViewArg {
    /// Municipalities
    #[default]
    Mun,
    /// Statistical regions
    Sr,
}

impl From<ViewArg> for AreaKind {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Mun => AreaKind::Municipality,
            ViewArg::Sr => AreaKind::Region,
        }
    }
}

#[derive(Args, Debug)]
struct ViewOpt {
    #[arg(long, value_enum, default_value_t = ViewArg::Mun)]
    view: ViewArg,
}

#[derive(Args, Debug)]
struct AreaArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Mun)]
    view: ViewArg,
    /// Area name as shown on the map (e.g. "Škofja Loka").
    #[arg(short, long)]
    area: String,
    /// Month key (e.g. 2020M01).
    #[arg(short, long)]
    month: String,
    /// English nationality names separated by comma or semicolon; empty means all.
    #[arg(short, long)]
    select: Option<String>,
    /// Save the full breakdown as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Save the table rows as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ColorsArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Mun)]
    view: ViewArg,
    #[arg(short, long)]
    month: String,
    #[arg(short, long)]
    select: Option<String>,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Mun)]
    view: ViewArg,
    /// Area name; the national total when omitted.
    #[arg(short, long)]
    area: Option<String>,
    #[arg(short, long)]
    select: Option<String>,
    /// Only print the visible graph window around this month index.
    #[arg(long)]
    index: Option<usize>,
    /// Save the series as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LegendArgs {
    #[arg(long, value_enum, default_value_t = ViewArg::Mun)]
    view: ViewArg,
    /// Number of samples (default 5).
    #[arg(long, default_value_t = 5)]
    steps: usize,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_selection(s: Option<&str>) -> Selection {
    s.map(parse_list).unwrap_or_default().into_iter().collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut ctx = open(&cli)?;
    let locale = cli.locale.as_str();
    match &cli.cmd {
        Command::Months(args) => cmd_months(&mut ctx, args),
        Command::Nationalities(args) => cmd_nationalities(&mut ctx, args),
        Command::Area(args) => cmd_area(&mut ctx, args, locale),
        Command::Colors(args) => cmd_colors(&mut ctx, args),
        Command::Series(args) => cmd_series(&mut ctx, args, locale),
        Command::Legend(args) => cmd_legend(&mut ctx, args, locale),
    }
}

fn open(cli: &Cli) -> Result<AppContext> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = config.validate().context("invalid configuration")?;
    let data_src = cli.data.as_deref().unwrap_or(&config.data);
    let data = Loader::new(DataSource::parse(data_src))?
        .with_files(config.files.clone())
        .load()
        .with_context(|| format!("load data from {}", data_src))?;
    Ok(AppContext::new(data, settings))
}

fn cmd_months(ctx: &mut AppContext, args: &ViewOpt) -> Result<()> {
    ctx.set_view(args.view.into());
    for m in ctx.months() {
        println!("{}", m);
    }
    Ok(())
}

fn cmd_nationalities(ctx: &mut AppContext, args: &ViewOpt) -> Result<()> {
    ctx.set_view(args.view.into());
    for n in &ctx.view().universe {
        println!("{}", n);
    }
    Ok(())
}

fn cmd_area(ctx: &mut AppContext, args: &AreaArgs, locale: &str) -> Result<()> {
    ctx.set_view(args.view.into());
    ctx.set_month(&args.month.parse::<MonthKey>()?)?;
    ctx.apply_selection(parse_selection(args.select.as_deref()));
    let card = ctx.area_display(&args.area)?;

    println!("{} • {}", card.display_name, card.month_string);
    for row in &card.table_list {
        println!("  {:<28} {:>12}", row.nationality, format_count(row.tourists, locale));
    }
    println!(
        "  {:<28} {:>12}",
        "= total",
        format_count(card.total_tourist_sum, locale)
    );

    if card.has_data() {
        println!("shares of {}:", format_count(card.pie_chart_sum, locale));
        for s in &card.pie_chart_list {
            println!(
                "  {:<28} {:>12} {:>7}",
                s.nationality,
                format_count(s.tourists, locale),
                format_share(s.relative_percentage, locale)
            );
        }
    } else {
        println!("no visits for the selected nationalities");
    }

    if let Some(path) = args.json.as_ref() {
        storage::save_json(&card, path)?;
        eprintln!("Saved breakdown to {}", path.display());
    }
    if let Some(path) = args.csv.as_ref() {
        storage::save_table_csv(&card.table_list, path)?;
        eprintln!("Saved {} rows to {}", card.table_list.len(), path.display());
    }
    Ok(())
}

fn cmd_colors(ctx: &mut AppContext, args: &ColorsArgs) -> Result<()> {
    ctx.set_view(args.view.into());
    ctx.set_month(&args.month.parse::<MonthKey>()?)?;
    ctx.apply_selection(parse_selection(args.select.as_deref()));
    for (area, color) in ctx.map_colors() {
        println!("{:<28} {}", area, color.to_hex());
    }
    Ok(())
}

fn cmd_series(ctx: &mut AppContext, args: &SeriesArgs, locale: &str) -> Result<()> {
    ctx.set_view(args.view.into());
    ctx.apply_selection(parse_selection(args.select.as_deref()));
    let points = ctx.series(args.area.as_deref())?;

    let range = match args.index {
        Some(i) => visible_window(i, points.len(), DEFAULT_WINDOW),
        None => 0..points.len(),
    };
    for p in &points[range] {
        println!("{}  {:>12}", p.month, format_count(p.value, locale));
    }

    if let Some(path) = args.csv.as_ref() {
        storage::save_series_csv(&points, path)?;
        eprintln!("Saved {} points to {}", points.len(), path.display());
    }
    Ok(())
}

fn cmd_legend(ctx: &mut AppContext, args: &LegendArgs, locale: &str) -> Result<()> {
    ctx.set_view(args.view.into());
    for stop in ctx.scale().legend(args.steps) {
        println!(
            "{:>5.2}  {:>12}  {}",
            stop.t,
            format_count(stop.value, locale),
            stop.color.to_hex()
        );
    }
    Ok(())
}
