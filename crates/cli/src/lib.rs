pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use shopgauge_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "shopgauge",
    about = "Shopgauge analytics CLI",
    long_about = "Run database migrations, seed demo data, inspect configuration, and compute \
                  analytics reports over the order history.",
    after_help = "Examples:\n  shopgauge migrate\n  shopgauge seed\n  shopgauge doctor --json\n  \
                  shopgauge report overview --from 2024-01-01 --to 2024-01-31\n  \
                  shopgauge report top-products --metric units --limit 5"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Migrate and load the deterministic demo dataset")]
    Seed,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Compute an analytics report and print it as pretty JSON")]
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    #[command(about = "Headline KPIs, optionally with deltas against a comparison window")]
    Overview {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        compare_from: Option<String>,
        #[arg(long)]
        compare_to: Option<String>,
    },
    #[command(about = "Revenue/order/unit series bucketed by day, week, or month")]
    Trends {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, help = "Bucket size: day, week, or month")]
        interval: Option<String>,
    },
    #[command(about = "Product leaderboard by revenue or units")]
    TopProducts {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, help = "Number of products to return (1-100)")]
        limit: Option<String>,
        #[arg(long, help = "Ranking metric: revenue or units")]
        metric: Option<String>,
    },
    #[command(about = "Per-category revenue and unit rollups")]
    Categories {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    #[command(about = "Products at risk of stockout based on trailing sales velocity")]
    InventoryRisk {
        #[arg(long, help = "Stock at or below this is always critical")]
        threshold: Option<String>,
        #[arg(long, help = "Days-of-cover boundary between low stock and normal")]
        safety_days: Option<String>,
        #[arg(long, help = "Trailing velocity window in days")]
        window_days: Option<String>,
    },
    #[command(about = "First-purchase cohorts with monthly retention")]
    Cohorts {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    #[command(about = "RFM scores and named customer segments")]
    Segments {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}

fn init_logging() {
    use tracing::Level;

    // Logging must come up even when the config is unusable; commands report
    // config errors through their own structured output.
    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Report { report } => commands::report::run(&report),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
