// ABOUTME: Entry point for the trendlens binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs one analytics operation.

use std::io::Read;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trendlens", about = "Statistical analytics over flat JSON records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summary statistics, insights, and correlations for a record array
    Analyze {
        /// Path to the JSON payload, or "-" for stdin
        input: String,
    },
    /// Two-model forecast for a date + value series
    Forecast {
        /// Path to the JSON payload, or "-" for stdin
        input: String,
        /// Number of periods to project
        #[arg(long, default_value_t = trendlens_analytics::DEFAULT_PERIODS)]
        periods: usize,
    },
    /// A/B significance check for group/metric/value records
    AbTest {
        /// Path to the JSON payload, or "-" for stdin
        input: String,
    },
    /// Chart payloads and summaries for a source-name → records mapping
    Dashboard {
        /// Path to the JSON payload, or "-" for stdin
        input: String,
    },
    /// Print the LLM tool definitions as JSON
    Tools,
}

fn read_payload(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read payload from {}", input))
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendlens=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("trendlens starting up");

    let output = match cli.command {
        Command::Analyze { input } => {
            trendlens_tools::analyze_performance_metrics(&read_payload(&input)?)
        }
        Command::Forecast { input, periods } => {
            trendlens_tools::forecast(&read_payload(&input)?, periods)
        }
        Command::AbTest { input } => {
            trendlens_tools::analyze_ab_test_results(&read_payload(&input)?)
        }
        Command::Dashboard { input } => {
            trendlens_tools::create_dashboard_data(&read_payload(&input)?)
        }
        Command::Tools => serde_json::to_string_pretty(&trendlens_tools::all_tool_definitions())
            .context("failed to serialize tool definitions")?,
    };

    println!("{}", output);
    Ok(())
}
