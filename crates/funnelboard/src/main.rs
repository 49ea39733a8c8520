use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use funnelboard::{report, server};
use funnelboard_core::config::DashboardConfig;
use funnelboard_core::dashboard::refresh;
use funnelboard_core::fetch::{HttpSheetSource, SheetSource, StaticSheetSource};
use funnelboard_core::periods::PeriodSelection;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sales funnel dashboard over a published spreadsheet", long_about = None)]
struct Cli {
    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the auto-refreshing dashboard
    Serve(ServeArgs),
    /// Run one refresh cycle and print the metrics
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address, overrides `bind_addr` from the config
    #[arg(long)]
    bind: Option<String>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Signup month as YYYY-MM; every period when omitted
    #[arg(long)]
    period: Option<String>,

    /// Read a local XLSX or CSV export instead of downloading the sheet
    #[arg(long)]
    file: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve(args) => {
            let mut config = DashboardConfig::load(args.config.as_deref())
                .context("failed to load dashboard config")?;
            if let Some(bind) = args.bind {
                config.bind_addr = bind;
            }
            let source =
                HttpSheetSource::from_config(&config).context("failed to build HTTP client")?;
            server::serve(config, Arc::new(source)).await
        }
        Command::Report(args) => {
            let config = DashboardConfig::load(args.config.as_deref())
                .context("failed to load dashboard config")?;
            let selection = PeriodSelection::from_query(args.period.as_deref())
                .context("invalid --period")?;

            let source: Box<dyn SheetSource> = match &args.file {
                Some(path) => Box::new(
                    StaticSheetSource::from_file(path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                ),
                None => Box::new(
                    HttpSheetSource::from_config(&config).context("failed to build HTTP client")?,
                ),
            };

            let snapshot = refresh(source.as_ref(), &config.cycle_options(), selection)
                .await
                .context("Erro ao carregar os dados")?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", report::render_report(&snapshot));
            }
            info!(selection = %snapshot.selection, "report printed");
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
