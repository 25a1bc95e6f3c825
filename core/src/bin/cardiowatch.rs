// Enkel inspeksjon av persistert klokkestatistikk.
//
//   cardiowatch show  [config.json]
//   cardiowatch clear [config.json]
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cardiowatch_core::cli::print_stats_report;
use cardiowatch_core::{Config, FileStore, WatchStatsCache};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("show");
    let config_path = args.get(1).map(String::as_str).unwrap_or("cardiowatch.json");

    let config = Config::load(config_path).with_context(|| format!("kunne ikke lese {config_path}"))?;
    let store = Arc::new(FileStore::new(config.cache.data_dir.clone()));
    let cache = WatchStatsCache::new(store, &config.cache);

    match command {
        "show" => {
            cache.init();
            print_stats_report(&cache.snapshot());
        }
        "clear" => {
            cache.clear_all();
            println!("✅ klokkestatistikk slettet fra {}", config.cache.data_dir.display());
        }
        other => bail!("ukjent kommando `{other}` (bruk show|clear)"),
    }
    Ok(())
}
