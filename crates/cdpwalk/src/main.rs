//! CLI entry point for the cdpwalk CDP crawler.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use cdpwalk::config::CrawlConfig;
use cdpwalk::crawl::TraversalEngine;
use cdpwalk::dns::SystemResolver;
use cdpwalk::report;
use cdpwalk::snapshot::SnapshotStore;
use cdpwalk::snmp::SnmpProbe;

#[derive(Parser)]
#[command(name = "cdpwalk")]
#[command(about = "CDP neighbor crawler producing baseline/current inventory snapshots")]
struct Cli {
    /// Device to start the crawl from (hostname or IP).
    #[arg(short, long)]
    device: String,

    /// SNMP community string (overrides the config file).
    #[arg(short, long)]
    community: Option<String>,

    /// Follow all discovered CDP neighbors.
    #[arg(short, long)]
    follow: bool,

    /// Disable the capability ignore list.
    #[arg(short, long)]
    ignore: bool,

    /// Verbose tracing output.
    #[arg(short, long)]
    verbose: bool,

    /// Accepted for compatibility; currently unused.
    #[arg(short, long)]
    lookup: Option<String>,

    /// Config file prefix (default: cdpwalk).
    #[arg(long, default_value = "cdpwalk")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).init();

    let mut config = load_crawl_config(&cli.config)?;
    if let Some(community) = &cli.community {
        config.community = community.clone();
    }
    if cli.ignore {
        config.ignore_list.clear();
    }

    let probe = SnmpProbe::new(config.snmp_port, &config.community, config.timeout());
    let engine = TraversalEngine::new(probe, SystemResolver, config.ignore_list.clone());

    let outcome = engine.run(&cli.device, cli.follow).await;

    if !cli.follow {
        report::print_pending(&outcome.pending);
        return Ok(());
    }

    let store = SnapshotStore::new(&config.snapshot_dir)?;
    let diff = store.save(&outcome.inventory)?;

    report::print_diff(&diff);
    report::print_failures(&outcome.failures);

    Ok(())
}

fn load_crawl_config(file_prefix: &str) -> anyhow::Result<CrawlConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("CDPWALK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<CrawlConfig>("crawl") {
        Ok(c) => Ok(c),
        Err(_) => Ok(CrawlConfig::default()),
    }
}
