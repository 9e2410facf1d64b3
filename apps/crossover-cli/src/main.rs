mod commands;
mod obs;
mod output;

use clap::{Parser, Subcommand};
use commands::Command;
use obs::LogFormat;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crossover")]
#[command(about = "Moving-average crossover backtester", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  crossover backtest --config configs/sample.toml\n  crossover backtest --prices-dir data --json\n  crossover validate --config configs/sample.toml --strict\n"
)]
struct Cli {
    /// Log filter (overridden by env CROSSOVER_LOG).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on host:port.
    #[arg(long, global = true)]
    metrics_addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the crossover strategy for every configured instrument.
    Backtest {
        /// Config file path (TOML). If omitted, uses env CROSSOVER_CONFIG or built-in defaults.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overrides `data.prices_dir`.
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        /// Print one JSON line per instrument instead of human output.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check configuration and price files without running the strategy.
    Validate {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        prices_dir: Option<PathBuf>,
        /// Fail instruments with any dropped or suspicious row.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    obs::describe_metrics();

    let command = match cli.command {
        CliCommand::Backtest {
            config,
            prices_dir,
            json,
        } => Command::Backtest {
            config,
            prices_dir,
            json,
        },
        CliCommand::Validate {
            config,
            prices_dir,
            strict,
        } => Command::Validate {
            config,
            prices_dir,
            strict,
        },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
