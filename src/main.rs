use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use filmmatch::batch::{read_lookups, run_batch};
use filmmatch::catalog::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use filmmatch::model::{CATALOG_PROVIDER, SECONDARY_PROVIDER};
use filmmatch::{cancel_pair, ClientConfig, HttpCatalog, LookupInfo, ProviderIdLookup, Resolver};
use log::{debug, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_LOG: &str = "logs/filmmatch.log";

#[derive(Parser, Debug)]
#[command(
    name = "filmmatch",
    version,
    about = "Resolve film catalog ids from a name, a year and a cross-reference id"
)]
struct Cli {
    /// Display name of the film to identify
    #[arg(long, conflicts_with = "input")]
    name: Option<String>,

    /// Release year
    #[arg(long)]
    year: Option<i32>,

    /// Secondary catalog id (e.g. tt1375666)
    #[arg(long)]
    imdb: Option<String>,

    /// Catalog id already known for the item; trusted as-is
    #[arg(long)]
    catalog_id: Option<String>,

    /// JSONL file with one lookup per line (batch mode)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSONL result file for batch mode
    #[arg(long, default_value = "output/filmmatch_results.jsonl")]
    output: PathBuf,

    /// Parallel resolutions in batch mode
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Catalog API base URL
    #[arg(long, env = "FILMMATCH_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Enable debug logs (written to logs/filmmatch.log)
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Explicit log file path (enables file logging). Ignored if empty.
    #[arg(long, default_value = "")]
    log_file: String,
}

fn init_logging(args: &Cli) {
    if !(args.debug || !args.log_file.is_empty()) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return;
    }
    let log_path = if !args.log_file.is_empty() {
        PathBuf::from(&args.log_file)
    } else {
        PathBuf::from(DEFAULT_LOG)
    };
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::File::create(&log_path) {
        Ok(file) => {
            let cfg = ConfigBuilder::new()
                .set_time_format_rfc3339()
                .set_target_level(LevelFilter::Off)
                .build();
            if let Err(e) = WriteLogger::init(LevelFilter::Debug, cfg, file) {
                eprintln!("[warn] file logger init failed: {e}");
            } else {
                println!("[debug] logs → {:?}", log_path);
            }
        }
        Err(e) => {
            eprintln!("[warn] cannot create log file {:?}: {e}", log_path);
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
        }
    }
}

fn lookup_from_args(args: &Cli, name: &str) -> LookupInfo {
    let mut info = LookupInfo::new(name);
    info.year = args.year;
    if let Some(id) = &args.imdb {
        info = info.with_provider_id(SECONDARY_PROVIDER, id.as_str());
    }
    if let Some(id) = &args.catalog_id {
        info = info.with_provider_id(CATALOG_PROVIDER, id.as_str());
    }
    info
}

async fn run() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args);

    let config = ClientConfig {
        api_base: args.api_base.clone(),
        timeout: Duration::from_secs(args.timeout),
        ..ClientConfig::default()
    };
    debug!("catalog api: {} (timeout {:?})", config.api_base, config.timeout);
    let catalog = HttpCatalog::new(&config).context("building HTTP client")?;
    let resolver = Resolver::new(Arc::new(catalog), Arc::new(ProviderIdLookup));

    let (cancel_handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            cancel_handle.cancel();
        }
    });

    let started = Instant::now();
    if let Some(input) = &args.input {
        let items = read_lookups(input)?;
        info!("{} lookups read from {:?}", items.len(), input);
        let summary = run_batch(
            &resolver,
            items,
            &args.output,
            args.concurrency,
            &cancel,
            true,
        )
        .await?;
        println!(
            "Summary: processed {}, matched {}, unmatched {}, errors {}, cancelled {}",
            summary.total, summary.matched, summary.unmatched, summary.failed, summary.cancelled
        );
        println!("Done. Wrote {:?}", args.output);
    } else {
        let name = args
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("either --name or --input is required"))?;
        let info = lookup_from_args(&args, name);
        let outcome = resolver
            .resolve_outcome(&info, &cancel)
            .await
            .with_context(|| format!("resolving {:?}", name))?;
        let rec = serde_json::json!({
            "name": info.name,
            "year": info.year,
            "succeeded": outcome.result.succeeded,
            "resolved_id": outcome.result.resolved_id(),
            "decided_by": outcome.decided_by,
            "ts": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", rec);
    }
    debug!("timing total: {} ms", started.elapsed().as_millis());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
