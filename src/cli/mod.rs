use anyhow::{Result, anyhow};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

use crate::core::channels::ChannelSelection;
use crate::core::config::{DashboardConfig, default_config_path};
use crate::core::insight::InsightRequester;
use crate::core::lifecycle::LifecycleComponent;
use crate::core::llm::providers::GoogleProvider;
use crate::core::metrics::{MetricsFeed, MetricsSnapshot};
use crate::core::terminal::{self, GuideSection};
use tokio::sync::watch;
use crate::interfaces::dashboard::DashboardInterface;
use crate::logging;

const DEFAULT_METRIC_TICKS: u64 = 5;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Dashboard")
        .command("tui", "Open the live dashboard (default)")
        .print();

    GuideSection::new("Headless")
        .command("insight --channels x,li", "Generate one strategy insight")
        .command("metrics --ticks N", "Print N simulated metric updates")
        .command("config", "Show the resolved configuration")
        .print();

    GuideSection::new("Flags")
        .command("--config <path>", "Config file (default ~/.contentflow/config.toml)")
        .command("--model <id>", "Override the Gemini model")
        .command("--verbose", "Log at INFO level in headless commands")
        .print();

    println!(
        "\n {} {} <command> [flags]\n",
        style("Usage:").bold(),
        style("contentflow").green()
    );
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct GlobalFlags {
    pub config_path: Option<PathBuf>,
    pub model: Option<String>,
    pub verbose: bool,
}

/// Pulls global flags out of `args`, returning them and the remaining arguments.
pub(crate) fn parse_global_flags(args: &[String]) -> (GlobalFlags, Vec<String>) {
    let mut flags = GlobalFlags::default();
    let mut rest = Vec::with_capacity(args.len());
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    flags.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--model" | "-m" => {
                if i + 1 < args.len() {
                    flags.model = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                flags.verbose = true;
                i += 1;
            }
            _ => {
                rest.push(args[i].clone());
                i += 1;
            }
        }
    }
    (flags, rest)
}

/// `None` means no `--channels` flag was given.
pub(crate) fn parse_insight_args(args: &[String], start: usize) -> Option<String> {
    let mut channels = None;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--channels" => {
                if i + 1 < args.len() {
                    channels = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    channels = Some(String::new());
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    channels
}

pub(crate) fn parse_metrics_args(args: &[String], start: usize) -> u64 {
    let mut ticks = DEFAULT_METRIC_TICKS;
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--ticks" | "-n" => {
                if i + 1 < args.len() {
                    ticks = args[i + 1].parse().unwrap_or(DEFAULT_METRIC_TICKS);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    ticks
}

fn build_requester(config: &DashboardConfig) -> Result<InsightRequester> {
    let provider = GoogleProvider::from_config(&config.llm)?;
    Ok(InsightRequester::new(
        Arc::new(provider),
        (&config.llm).into(),
    ))
}

/// Emits the current snapshot, then `ticks` further updates. Each value is
/// marked seen as it is read, so no tick is emitted twice.
pub(crate) async fn stream_snapshots<F>(
    rx: &mut watch::Receiver<MetricsSnapshot>,
    ticks: u64,
    mut emit: F,
) where
    F: FnMut(&MetricsSnapshot),
{
    let first = *rx.borrow_and_update();
    emit(&first);
    for _ in 0..ticks {
        if rx.changed().await.is_err() {
            break;
        }
        let snapshot = *rx.borrow_and_update();
        emit(&snapshot);
    }
}

async fn load_config(flags: &GlobalFlags) -> Result<(PathBuf, DashboardConfig)> {
    let path = flags.config_path.clone().unwrap_or_else(default_config_path);
    let mut config = DashboardConfig::load(&path).await?;
    if let Some(model) = &flags.model {
        config.llm.model = model.clone();
    }
    config.resolve_api_key(|var| std::env::var(var).ok());
    Ok((path, config))
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    run_with_args(&args).await
}

pub(crate) async fn run_with_args(args: &[String]) -> Result<()> {
    let (flags, args) = parse_global_flags(args);
    let cmd = args.get(1).map(String::as_str).unwrap_or("tui");

    if matches!(cmd, "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let is_tui = cmd == "tui";
    let level = if is_tui || flags.verbose {
        Level::INFO
    } else {
        Level::WARN
    };
    let log_feed = logging::init(level, is_tui);

    let (config_path, config) = load_config(&flags).await?;

    match cmd {
        "tui" => {
            let requester = build_requester(&config)?;
            let mut dashboard = DashboardInterface::new(requester, config.metrics.clone())
                .with_log_feed(log_feed.subscribe());
            dashboard.run_tui().await?;
            terminal::print_goodbye();
        }
        "insight" => {
            let selection = match parse_insight_args(&args, 2) {
                Some(list) => ChannelSelection::parse_list(&list)?,
                None => ChannelSelection::default(),
            };
            let requester = build_requester(&config)?;
            let insight = requester.generate_insight(&selection).await;
            terminal::print_insight(&insight.text);
        }
        "metrics" => {
            let ticks = parse_metrics_args(&args, 2);
            let mut feed = MetricsFeed::new(config.metrics.clone());
            feed.on_start().await?;
            let mut rx = feed
                .subscribe()
                .ok_or_else(|| anyhow!("Metrics feed failed to start"))?;
            stream_snapshots(&mut rx, ticks, terminal::print_snapshot).await;
            feed.on_shutdown().await?;
        }
        "config" => {
            terminal::print_info(&format!("Config path: {}", config_path.display()));
            println!("{}", config.redacted_toml()?);
        }
        other => {
            print_help();
            return Err(anyhow!("Unknown command '{}'", other));
        }
    }

    Ok(())
}
