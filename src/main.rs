//! CLI entry point for the passenger statistics tool.
//!
//! Provides subcommands for aggregating passenger-movement files, evaluating
//! simulation runs, and plotting the distribution of disappointment rates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use passenger_stats::analyzers::aggregate::try_aggregate;
use passenger_stats::analyzers::distribution::{GaussianFit, Histogram};
use passenger_stats::analyzers::evaluation::{result_path, summarize};
use passenger_stats::{
    output::{print_json, write_json, write_report, write_results},
    parser::{RideReader, read_eval_data, read_values},
    render::{render_distribution, render_metric_series, render_time_totals},
    source::open_input,
    stations::StationLayout,
};
use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "passenger_stats")]
#[command(about = "Aggregate passenger movements and evaluate simulation runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a passenger-movement file into ride, station and time totals
    Rides {
        /// Path to the `;`-separated passenger file (may be gzipped)
        #[arg(short, long, default_value = "./final_assignment/passengers-location_day1.csv")]
        file: String,

        /// Number of preamble lines before the first ride row
        #[arg(long, default_value_t = 2)]
        skip_rows: u64,

        /// Number of entries in each ranking
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,

        /// SVG file for the riders-per-time-bucket chart
        #[arg(long, default_value = "./eval_out/time_totals.svg")]
        chart: String,

        /// Optional: write the full aggregate as JSON to this path
        #[arg(long)]
        json: Option<String>,
    },
    /// Summarize the metrics of a simulation run and plot them over time
    Eval {
        /// Path to the evaluation data file
        #[arg(short, long, default_value = "./final_assignment/default_eval.txt")]
        file: String,

        /// File the results are written to
        #[arg(short, long, default_value = "./eval_out/result.txt")]
        out: String,

        /// Identifier appended to result and chart names to distinguish runs
        #[arg(short, long, default_value = "")]
        identifier: String,

        /// Directory charts are saved to
        #[arg(long, default_value = "./eval_out/")]
        img: String,
    },
    /// Plot disappointment rates with a best-fit normal curve
    Disappointments {
        /// File with one disappointment rate per line
        #[arg(value_name = "FILE")]
        file: String,

        /// SVG file for the histogram
        #[arg(long, default_value = "./eval_out/disappointments.svg")]
        chart: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/passenger_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("passenger_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rides {
            file,
            skip_rows,
            top,
            chart,
            json,
        } => {
            let reader = open_input(&file)?;
            let records = RideReader::new(reader, StationLayout::default(), skip_rows);
            let result =
                try_aggregate(records).with_context(|| format!("Failed to aggregate '{file}'"))?;

            info!(
                records = result.records(),
                origins = result.origin_totals().len(),
                destinations = result.destination_totals().len(),
                riders = result.riders(),
                "Rides aggregated"
            );

            let mut stdout = std::io::stdout().lock();
            write_report(&mut stdout, &result, top)?;
            stdout.flush()?;

            render_time_totals(Path::new(&chart), result.time_totals())?;

            match json {
                Some(path) => write_json(&path, &result)?,
                None => print_json(&result)?,
            }
        }
        Commands::Eval {
            file,
            out,
            identifier,
            img,
        } => {
            let data = read_eval_data(open_input(&file)?)
                .with_context(|| format!("Failed to read evaluation data '{file}'"))?;
            let results = summarize(&data)?;

            let out = result_path(&out, &identifier);
            write_results(&out, &results)?;

            let charts = render_metric_series(Path::new(&img), &identifier, &data)?;
            debug!(charts = charts.len(), "Evaluation finished");
        }
        Commands::Disappointments { file, chart } => {
            let counts = read_values(open_input(&file)?)
                .with_context(|| format!("Failed to read rates '{file}'"))?;
            let histogram = Histogram::from_counts(&counts);
            let fit = GaussianFit::from_counts(&counts);

            info!(mu = fit.mu, sigma = fit.sigma, bins = histogram.len(), "Fitted distribution");
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", fit.mu)?;
            writeln!(stdout, "{}", fit.sigma)?;

            render_distribution(Path::new(&chart), &histogram, &fit)?;
        }
    }

    Ok(())
}
