/// Quote Cache Tool
///
/// Fetches crypto quotes through the single-flight price cache. One-shot
/// mode prints a single price; watch mode keeps the configured hot keys
/// warm and dumps cache diagnostics every cycle.
///
/// Usage: quotecache --asset sol [--fiat eur] [--force]
///        quotecache --watch [--config quotecache.json]
use clap::{Arg, ArgAction, Command};
use quotecache::logger::{self, LogTag};
use quotecache::{PriceCoordinator, PriceRefresher, QuoteCacheConfig};
use std::process;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::main]
async fn main() {
    logger::init();

    let matches = Command::new("Quote Cache Tool")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch crypto quotes through the single-flight price cache")
        .arg(
            Arg::new("asset")
                .short('a')
                .long("asset")
                .value_name("SYMBOL")
                .help("Asset symbol to quote (e.g. sol, btc, usdc)")
                .required_unless_present("watch"),
        )
        .arg(
            Arg::new("fiat")
                .short('f')
                .long("fiat")
                .value_name("FIAT")
                .default_value("usd")
                .help("Quote currency"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Bypass the cache and force an upstream refresh"),
        )
        .arg(
            Arg::new("watch")
                .short('w')
                .long("watch")
                .action(ArgAction::SetTrue)
                .help("Run the background refresher and dump cache info until Ctrl-C"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON config file (ttl_ms, max_attempts, hot_keys, ...)"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output for all modules"),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => match QuoteCacheConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                logger::error(LogTag::System, &format!("failed to load config {}: {}", path, e));
                process::exit(1);
            }
        },
        None => QuoteCacheConfig::default(),
    };

    let coordinator = match PriceCoordinator::new(&config) {
        Ok(coordinator) => Arc::new(coordinator),
        Err(e) => {
            logger::error(LogTag::System, &format!("failed to initialize coordinator: {}", e));
            process::exit(1);
        }
    };

    if matches.get_flag("watch") {
        watch(coordinator, &config).await;
        return;
    }

    let asset = matches
        .get_one::<String>("asset")
        .expect("asset is required outside watch mode");
    let fiat = matches
        .get_one::<String>("fiat")
        .expect("fiat has a default");
    let force = matches.get_flag("force");

    match coordinator.get_price(asset, fiat, force).await {
        Ok(price) => {
            logger::info(
                LogTag::System,
                &format!("{}/{}: {}", asset.to_lowercase(), fiat.to_lowercase(), price),
            );
        }
        Err(e) => {
            logger::error(LogTag::System, &format!("{}", e));
            process::exit(1);
        }
    }
}

/// Run the refresher until Ctrl-C, dumping cache diagnostics every cycle.
async fn watch(coordinator: Arc<PriceCoordinator>, config: &QuoteCacheConfig) {
    let shutdown = Arc::new(Notify::new());
    let refresher = PriceRefresher::new(coordinator.clone(), config);
    let handle = refresher.start(shutdown.clone());

    let mut ticker = tokio::time::interval(config.ttl());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                dump_cache_info(&coordinator);
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    logger::error(LogTag::System, &format!("signal handler failed: {}", e));
                }
                break;
            }
        }
    }

    logger::info(LogTag::System, "shutting down");
    shutdown.notify_one();
    let _ = handle.await;
}

fn dump_cache_info(coordinator: &PriceCoordinator) {
    let info = coordinator.cache_info();
    match serde_json::to_string_pretty(&info) {
        Ok(json) => logger::info(LogTag::Cache, &format!("cache state:\n{}", json)),
        Err(e) => logger::error(LogTag::Cache, &format!("failed to serialize cache info: {}", e)),
    }
}
