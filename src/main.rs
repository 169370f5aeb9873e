use anyhow::Context;
use benchmark_engine::{spawn_workers, BenchmarkComputer, BenchmarkService};
use benchmark_store::{connect, run_migrations, BenchmarkStore};
use clap::{Parser, Subcommand};
use configuration::{load_settings, Settings};
use core_types::{BenchmarkKey, BenchmarkOutcome, PeriodType, StatementType};
use filings_client::{build_statement, resolve_company, EdgarClient, FilingsApi};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use web_server::{run_server, AppState};

mod render;

/// The main entry point for the Commonize application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one exists.
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = load_settings().context("Failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Statement(args) => handle_statement(args, settings).await,
        Commands::Worker(args) => handle_worker(args, settings).await,
        Commands::Serve(args) => handle_serve(args, settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Common-size financial statements with industry benchmarks, from SEC filings.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a company's common-size statement, optionally benchmarked
    /// against its industry peers.
    Statement(StatementArgs),

    /// Run background workers that drain the benchmark job queue.
    Worker(WorkerArgs),

    /// Run the HTTP API server.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct StatementArgs {
    /// Ticker symbol or CIK of the company (e.g. "AAPL" or "320193").
    ticker: String,

    /// Which statement to build.
    #[arg(long, default_value = "income")]
    statement: StatementType,

    /// Reporting period to use.
    #[arg(long, default_value = "annual")]
    period: PeriodType,

    /// Number of industry peers to benchmark against. 0 disables the
    /// industry column.
    #[arg(long, default_value_t = 0)]
    industry_peers: u32,

    /// Queue the benchmark for background computation instead of blocking
    /// on a cache miss. Requires a running `worker` to fill the cache.
    #[arg(long)]
    queue_industry: bool,

    /// Discard any cached benchmark for this key and recompute it.
    #[arg(long)]
    force_refresh: bool,
}

#[derive(Parser)]
struct WorkerArgs {
    /// Number of worker loops. Defaults to the configured worker count.
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on. Defaults to the configured server address.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Statement Command
// ==============================================================================

async fn handle_statement(args: StatementArgs, settings: Settings) -> anyhow::Result<()> {
    let api: Arc<dyn FilingsApi> = Arc::new(EdgarClient::new(&settings)?);

    let company = resolve_company(api.as_ref(), &args.ticker, false).await?;
    tracing::info!(ticker = %company.ticker, cik = %company.cik, "Resolved company");

    let facts = api.fetch_company_facts(&company.cik).await?;
    let statement = build_statement(&company.cik, &facts, args.statement, args.period);
    let common = common_size::normalize(&statement, common_size::base_concept(args.statement))?;

    let mut benchmark = None;
    if args.industry_peers > 0 {
        let info = api.company_industry(&company.cik).await?;
        match info.sic {
            Some(sic) => {
                let service = build_service(api.clone(), &settings).await?;
                let key = BenchmarkKey::new(sic, args.statement, args.period, args.industry_peers);
                let outcome = if args.force_refresh {
                    service
                        .force_refresh(&key, &company.cik, args.queue_industry)
                        .await?
                } else {
                    service
                        .get_or_queue_benchmark(&key, &company.cik, args.queue_industry)
                        .await?
                };
                match outcome {
                    BenchmarkOutcome::Ready(b) => benchmark = Some(b),
                    BenchmarkOutcome::Pending => {
                        println!(
                            "Industry benchmark queued; run `commonize worker` and retry to see it."
                        );
                    }
                }
            }
            None => println!(
                "No SIC code on file for {}; skipping the industry benchmark.",
                company.ticker
            ),
        }
    }

    let benchmark_ratios = benchmark.as_ref().map(|b| &b.ratios);
    let lines = common_size::build_lines(&statement, &common, benchmark_ratios);

    println!(
        "\n{} ({}) | {} statement, {} | period ending {}",
        company.title, company.ticker, args.statement, args.period, statement.fiscal_period
    );
    if let Some(b) = &benchmark {
        println!(
            "Industry benchmark: {} peers used, {} failed, computed {}",
            b.peers_used_count(),
            b.failed_count,
            b.computed_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!("{}", render::statement_table(&lines, benchmark.is_some()));

    Ok(())
}

// ==============================================================================
// Worker Command
// ==============================================================================

async fn handle_worker(args: WorkerArgs, settings: Settings) -> anyhow::Result<()> {
    let api: Arc<dyn FilingsApi> = Arc::new(EdgarClient::new(&settings)?);
    let store = open_store(&settings).await?;
    let computer = Arc::new(BenchmarkComputer::new(api, settings.fetch_concurrency));

    let count = args.workers.unwrap_or(settings.worker.count);
    let (stop_tx, stop_rx) = watch::channel(false);
    let handles = spawn_workers(count, store, computer, &settings.worker, stop_rx);
    tracing::info!(count, "Workers running; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for the shutdown signal")?;
    tracing::info!("Shutdown requested, draining workers");
    stop_tx.send(true)?;

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

// ==============================================================================
// Serve Command
// ==============================================================================

async fn handle_serve(args: ServeArgs, settings: Settings) -> anyhow::Result<()> {
    let api: Arc<dyn FilingsApi> = Arc::new(EdgarClient::new(&settings)?);
    let service = build_service(api.clone(), &settings).await?;

    let addr = match args.addr {
        Some(addr) => addr,
        None => settings
            .server
            .addr
            .parse()
            .context("Invalid server.addr in configuration")?,
    };

    let state = AppState {
        api,
        service: Arc::new(service),
        default_peer_count: 0,
    };
    run_server(addr, state).await
}

// ==============================================================================
// Shared Wiring
// ==============================================================================

async fn open_store(settings: &Settings) -> anyhow::Result<BenchmarkStore> {
    let pool = connect(&settings.database_path()).await?;
    run_migrations(&pool).await?;
    Ok(BenchmarkStore::new(pool))
}

async fn build_service(
    api: Arc<dyn FilingsApi>,
    settings: &Settings,
) -> anyhow::Result<BenchmarkService> {
    let store = open_store(settings).await?;
    let computer = BenchmarkComputer::new(api, settings.fetch_concurrency);
    Ok(BenchmarkService::new(store, computer))
}
