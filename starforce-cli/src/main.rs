mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use reports::Report;
use starforce_core::{
    CalcError, CalculationRequest, Calculator, DiscountTier, OddsTable, OptionSet, RawInput,
};

/// Exit status for requests rejected before the engine runs.
const EXIT_REJECTED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    /// No membership discount
    None,
    /// 3% off attempts up to level 15
    Silver,
    /// 5% off attempts up to level 15
    Gold,
    /// 10% off attempts up to level 15
    Diamond,
}

impl From<TierArg> for DiscountTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::None => Self::None,
            TierArg::Silver => Self::Silver,
            TierArg::Gold => Self::Gold,
            TierArg::Diamond => Self::Diamond,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "starforce", version = "0.1.0")]
#[command(
    about = "Expected cost, destructions, and survival odds of star force upgrades between two levels"
)]
struct Args {
    /// Item level (non-negative integer)
    #[arg(long)]
    item_level: Option<String>,

    /// Current star level
    #[arg(long)]
    start: Option<String>,

    /// Target star level (at most 25)
    #[arg(long)]
    target: Option<String>,

    /// Membership discount tier
    #[arg(long, value_enum, default_value_t = TierArg::None)]
    discount: TierArg,

    /// Levels 5, 10 and 15 always succeed
    #[arg(long)]
    guaranteed_milestones: bool,

    /// Successes at level 10 or below grant two levels
    #[arg(long)]
    double_step: bool,

    /// 30% off every attempt
    #[arg(long)]
    discount30: bool,

    /// Multiply success rates by 1.05
    #[arg(long)]
    star_catching: bool,

    /// Prevent destruction at levels 15 and 16 for double cost
    #[arg(long)]
    safeguard: bool,

    /// JSON odds table to use instead of the built-in rate card
    #[arg(long)]
    odds: Option<PathBuf>,

    /// Print the built-in odds table as JSON and exit
    #[arg(long)]
    print_odds: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Include the per-level breakdown
    #[arg(long)]
    breakdown: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    const fn options(&self) -> OptionSet {
        OptionSet {
            guaranteed_milestones: self.guaranteed_milestones,
            double_step_early: self.double_step,
            discount30: self.discount30,
            star_catching: self.star_catching,
            safeguard: self.safeguard,
        }
    }

    fn raw_input(&self) -> RawInput<'_> {
        RawInput {
            item_strength: self.item_level.as_deref(),
            start_level: self.start.as_deref(),
            target_level: self.target.as_deref(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_print_odds(&args)? {
        return Ok(ExitCode::SUCCESS);
    }

    let (calculator, odds_source) = load_calculator(args.odds.as_deref())?;
    let request = match build_request(&args) {
        Ok(request) => request,
        Err(err) => return Ok(reject(&err)),
    };

    match calculator.estimate(&request) {
        Ok(estimate) => {
            let report = Report::new(&request, &odds_source, &estimate);
            write_report(&args, &report)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_caller_facing() => Ok(reject(&err)),
        Err(err) => Err(err).context("estimate failed"),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn maybe_print_odds(args: &Args) -> Result<bool> {
    if !args.print_odds {
        return Ok(false);
    }
    let mut out = open_output(args.output.as_deref())?;
    let json = serde_json::to_string_pretty(OddsTable::standard())?;
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(true)
}

fn load_calculator(path: Option<&Path>) -> Result<(Calculator, String)> {
    let Some(path) = path else {
        return Ok((Calculator::standard(), "built-in".to_string()));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read odds table {}", path.display()))?;
    let odds = OddsTable::from_json(&json)
        .with_context(|| format!("invalid odds table {}", path.display()))?;
    log::info!("loaded odds table from {}", path.display());
    let calculator = Calculator::new(odds)?;
    Ok((calculator, path.display().to_string()))
}

fn build_request(args: &Args) -> Result<CalculationRequest, CalcError> {
    let request = args
        .raw_input()
        .parse(args.options(), args.discount.into())?;
    request.validate()?;
    log::debug!("request: {request:?}");
    Ok(request)
}

fn reject(err: &CalcError) -> ExitCode {
    eprintln!("{}", err.to_string().red());
    ExitCode::from(EXIT_REJECTED)
}

fn write_report(args: &Args, report: &Report<'_>) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;

    match args.report.as_str() {
        "json" => reports::generate_json_report(out.as_mut(), report)?,
        "markdown" => {
            reports::generate_markdown_report(out.as_mut(), report, args.breakdown)?;
        }
        _ => reports::generate_console_report(out.as_mut(), report, args.breakdown)?,
    }

    out.flush()?;
    Ok(())
}

/// Buffered writer over `path`, or stdout when no path is given.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}
