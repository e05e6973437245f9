use analytics::CorrelationMatrix;
use analyzer::{Analyzer, Assessment, Instrument, rank_by_composite};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, Table};
use configuration::{load_config, logging::init_tracing};
use core_types::{Fundamentals, Lens};
use std::path::PathBuf;

mod loader;

/// The main entry point for the Equilens risk and scoring tool.
fn main() -> anyhow::Result<()> {
    // EQUILENS__* overrides may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let _guard = init_tracing(&config.logging)?;
    let analyzer = Analyzer::from_config(&config)?;

    match cli.command {
        Commands::Assess(args) => handle_assess(&analyzer, args),
        Commands::Rank(args) => handle_rank(&analyzer, args),
        Commands::Correlate(args) => handle_correlate(&analyzer, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Quantitative risk metrics and Five-Lens scoring for equities.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the risk profile and lens scores of one instrument.
    Assess(AssessArgs),
    /// Assess several instruments and rank them by composite score.
    Rank(RankArgs),
    /// Pairwise return correlation of several price series.
    Correlate(CorrelateArgs),
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser)]
struct AssessArgs {
    /// CSV file with a date and a close column.
    #[arg(long)]
    prices: PathBuf,

    /// CSV file of the market index used for beta.
    #[arg(long)]
    market: Option<PathBuf>,

    /// JSON object of fundamental ratios.
    #[arg(long)]
    fundamentals: Option<PathBuf>,

    /// Ticker code, used for static and sector beta lookups (e.g. "INFY.NS").
    #[arg(long)]
    ticker: Option<String>,

    /// Latest quote, if newer than the last close.
    #[arg(long)]
    current_price: Option<f64>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Parser)]
struct RankArgs {
    /// Price files as `TICKER=path.csv` (or a bare path named after its file stem).
    #[arg(required = true, num_args = 1..)]
    instruments: Vec<String>,

    /// CSV file of the market index used for beta.
    #[arg(long)]
    market: Option<PathBuf>,

    /// Directory holding `<TICKER>.json` fundamentals files.
    #[arg(long)]
    fundamentals_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Parser)]
struct CorrelateArgs {
    /// Price files as `NAME=path.csv` (or a bare path named after its file stem).
    #[arg(required = true, num_args = 2..)]
    series: Vec<String>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_assess(analyzer: &Analyzer, args: AssessArgs) -> anyhow::Result<()> {
    let prices = loader::load_prices(&args.prices)?;
    let market = args.market.as_deref().map(loader::load_prices).transpose()?;
    let fundamentals = match &args.fundamentals {
        Some(path) => loader::load_fundamentals(path)?,
        None => Fundamentals::default(),
    };

    let instrument = Instrument {
        ticker: args.ticker.unwrap_or_default(),
        prices,
        fundamentals,
        current_price: args.current_price,
    };
    let assessment = analyzer.assess(&instrument, market.as_ref());

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
        OutputFormat::Table => print_assessment(analyzer, &assessment),
    }
    Ok(())
}

fn handle_rank(analyzer: &Analyzer, args: RankArgs) -> anyhow::Result<()> {
    let market = args.market.as_deref().map(loader::load_prices).transpose()?;

    let mut instruments = Vec::with_capacity(args.instruments.len());
    for arg in &args.instruments {
        let (ticker, path) = loader::named_path(arg);
        let fundamentals_file = args
            .fundamentals_dir
            .as_ref()
            .map(|dir| dir.join(format!("{ticker}.json")));
        let fundamentals = match fundamentals_file {
            Some(file) if file.is_file() => loader::load_fundamentals(&file)?,
            _ => Fundamentals::default(),
        };
        instruments.push(Instrument {
            ticker,
            prices: loader::load_prices(path)?,
            fundamentals,
            current_price: None,
        });
    }

    let ranked = rank_by_composite(analyzer.assess_batch(&instruments, market.as_ref()));

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Table => print_ranking(&ranked),
    }
    Ok(())
}

fn handle_correlate(analyzer: &Analyzer, args: CorrelateArgs) -> anyhow::Result<()> {
    let mut named = Vec::with_capacity(args.series.len());
    for arg in &args.series {
        let (name, path) = loader::named_path(arg);
        named.push((name, loader::load_prices(path)?));
    }

    let matrix = analyzer.engine().correlation_matrix(&named);
    if matrix.is_empty() {
        tracing::warn!("Not enough usable series to correlate");
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matrix)?),
        OutputFormat::Table => print_correlation(&matrix),
    }
    Ok(())
}

// ==============================================================================
// Table Output
// ==============================================================================

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn print_assessment(analyzer: &Analyzer, assessment: &Assessment) {
    let risk = &assessment.risk;
    let mut metrics = Table::new();
    metrics.set_header(vec!["Risk Metric", "Value"]);
    metrics.add_row(vec!["Volatility (annual)".to_string(), pct(risk.volatility)]);
    metrics.add_row(vec!["Volatility (short horizon)".to_string(), pct(risk.short_horizon_volatility)]);
    metrics.add_row(vec!["VaR 95%".to_string(), pct(risk.var_95)]);
    metrics.add_row(vec!["VaR 99%".to_string(), pct(risk.var_99)]);
    metrics.add_row(vec!["CVaR 95%".to_string(), pct(risk.cvar_95)]);
    metrics.add_row(vec!["Sharpe".to_string(), format!("{:.2}", risk.sharpe)]);
    metrics.add_row(vec!["Sortino".to_string(), format!("{:.2}", risk.sortino)]);
    metrics.add_row(vec!["Calmar".to_string(), format!("{:.2}", risk.calmar)]);
    metrics.add_row(vec!["Max Drawdown".to_string(), pct(risk.max_drawdown)]);
    metrics.add_row(vec!["Drawdown Duration".to_string(), format!("{} periods", risk.drawdown_duration)]);
    metrics.add_row(vec!["Current Drawdown".to_string(), pct(risk.current_drawdown)]);
    metrics.add_row(vec!["Skewness".to_string(), format!("{:.3}", risk.skewness)]);
    metrics.add_row(vec!["Excess Kurtosis".to_string(), format!("{:.3}", risk.kurtosis)]);
    metrics.add_row(vec!["Beta".to_string(), format!("{:.4} ({})", risk.beta, risk.beta_source)]);
    metrics.add_row(vec!["Total Return".to_string(), pct(risk.total_return)]);
    println!("{metrics}");

    let mut lenses = Table::new();
    lenses.set_header(vec!["Lens", "Score", "Weight"]);
    for lens in Lens::ALL {
        lenses.add_row(vec![
            Cell::new(lens),
            Cell::new(format!("{:.1}", assessment.scores.get(lens))),
            Cell::new(analyzer.scorer().weight(lens)),
        ]);
    }
    lenses.add_row(vec![
        Cell::new("Composite"),
        Cell::new(format!("{:.1}", assessment.scores.composite)),
        Cell::new(assessment.scores.signal),
    ]);
    println!("{lenses}");

    for flag in &assessment.summary.flags {
        let marker = if flag.is_warning() { "!" } else { "+" };
        println!("{marker} {}", flag.description());
    }
}

fn print_ranking(ranked: &[Assessment]) {
    let mut table = Table::new();
    table.set_header(vec!["Rank", "Ticker", "Composite", "Signal", "Beta", "Volatility", "Max DD"]);
    for (i, assessment) in ranked.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&assessment.ticker),
            Cell::new(format!("{:.1}", assessment.scores.composite)),
            Cell::new(assessment.scores.signal),
            Cell::new(format!("{:.2}", assessment.risk.beta)),
            Cell::new(pct(assessment.risk.volatility)),
            Cell::new(pct(assessment.risk.max_drawdown)),
        ]);
    }
    println!("{table}");
}

fn print_correlation(matrix: &CorrelationMatrix) {
    let mut table = Table::new();
    let mut header = vec![String::new()];
    header.extend(matrix.names.iter().cloned());
    table.set_header(header);
    for (name, row) in matrix.names.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(name)];
        cells.extend(row.iter().map(|v| Cell::new(format!("{v:.3}"))));
        table.add_row(cells);
    }
    println!("{table}");
}
