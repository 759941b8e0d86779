use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod charts;
mod client;
mod dashboard;
mod error;
mod models;
mod page;
mod report;
mod shape;

use charts::{ChartBackend, JsonBackend, TerminalBackend};
use client::{HttpStatsClient, StatsApi};
use dashboard::Dashboard;
use page::{Page, Slot, TextTarget, DEFAULT_DAYS};

#[derive(Parser)]
#[command(name = "stats-dashboard")]
#[command(about = "Response statistics dashboard for PingBot", long_about = None)]
struct Cli {
    /// Stats server base URL; falls back to STATS_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,
    /// Render a page that has no days selector
    #[arg(long, global = true)]
    without_filter: bool,
    /// Render a page that lacks this chart mount (repeatable)
    #[arg(long = "without-mount", value_enum, global = true)]
    without_mounts: Vec<Mount>,
    /// Render a page that lacks this overview text target (repeatable)
    #[arg(long = "without-text", value_enum, global = true)]
    without_texts: Vec<Stat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every region once and print the page
    Show {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Load once, then reload on every days value read from stdin
    Watch {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mount {
    ResponseOverTime,
    Distribution,
    Heatmap,
}

#[derive(Clone, Copy, ValueEnum)]
enum Stat {
    Sent,
    Responded,
    Rate,
    Time,
}

impl From<Stat> for TextTarget {
    fn from(stat: Stat) -> Self {
        match stat {
            Stat::Sent => TextTarget::Sent,
            Stat::Responded => TextTarget::Responded,
            Stat::Rate => TextTarget::Rate,
            Stat::Time => TextTarget::Time,
        }
    }
}

impl From<Mount> for Slot {
    fn from(mount: Mount) -> Self {
        match mount {
            Mount::ResponseOverTime => Slot::ResponseOverTime,
            Mount::Distribution => Slot::Distribution,
            Mount::Heatmap => Slot::Heatmap,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "stats_dashboard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base_url = match cli.base_url.clone() {
        Some(url) => url,
        None => std::env::var("STATS_BASE_URL")
            .context("STATS_BASE_URL must be set when --base-url is not given")?,
    };
    let source = HttpStatsClient::new(&base_url)
        .with_context(|| format!("failed to build HTTP client for {base_url}"))?;

    match cli.format {
        Format::Text => run(&cli, source, TerminalBackend::new()).await,
        Format::Json => run(&cli, source, JsonBackend::new()).await,
    }
}

fn build_page(cli: &Cli, days: u32) -> Page {
    let mut page = Page::full(days);
    if cli.without_filter {
        if days != DEFAULT_DAYS {
            warn!(
                days,
                default = DEFAULT_DAYS,
                "--days has no effect on a page without a days filter; using the default window"
            );
        }
        page = page.without_filter();
    }
    for mount in cli.without_mounts.iter() {
        page = page.without_mount((*mount).into());
    }
    for stat in cli.without_texts.iter() {
        page = page.without_text_target((*stat).into());
    }
    page
}

fn print_page<S: StatsApi, B: ChartBackend>(
    dashboard: &Dashboard<S, B>,
    format: Format,
) -> anyhow::Result<()> {
    let snapshot = dashboard.snapshot();
    match format {
        Format::Text => print!("{}", report::build_report(&snapshot)),
        Format::Json => println!(
            "{}",
            report::build_json(&snapshot).context("failed to encode page as JSON")?
        ),
    }
    Ok(())
}

async fn run<S: StatsApi, B: ChartBackend>(cli: &Cli, source: S, backend: B) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show { days } => {
            let dashboard = Dashboard::new(source, build_page(cli, days), backend);
            let report = dashboard.on_ready().await;
            if report.failures() == 4 {
                anyhow::bail!("no dashboard region could be loaded; is the stats server up?");
            }
            debug!(charts = dashboard.live_charts(), "dashboard rendered");
            print_page(&dashboard, cli.format)?;
        }
        Commands::Watch { days } => {
            let dashboard = Dashboard::new(source, build_page(cli, days), backend);
            dashboard.on_ready().await;
            print_page(&dashboard, cli.format)?;

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
                let input = line.trim();
                let days = if input.is_empty() {
                    dashboard.page().days()
                } else {
                    match input.parse::<u32>() {
                        Ok(days) if days > 0 => days,
                        _ => {
                            warn!(input, "expected a positive number of days");
                            continue;
                        }
                    }
                };
                if dashboard.on_filter_change(days).await.is_some() {
                    print_page(&dashboard, cli.format)?;
                }
            }
        }
    }

    Ok(())
}
