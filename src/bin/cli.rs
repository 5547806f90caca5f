//! Page import CLI
//!
//! Imports one external page into the local page store.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use page_import::{
    error::Result,
    models::{Config, Page},
    services::{HttpFetcher, PageImporter},
    storage::LocalStorage,
};

/// Environment variable overriding the config file location.
const CONFIG_ENV: &str = "PAGE_IMPORT_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "data/config.toml";

/// Import an external web page as an editable element tree
#[derive(Parser, Debug)]
#[command(name = "page-import", version, about)]
struct Cli {
    /// URL of the page to import
    url: String,
}

/// Initialize logging with the configured level as the default filter.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(config: &Config, url: &str) -> Result<Page> {
    config.validate()?;
    let fetcher = HttpFetcher::new(&config.http)?;
    let mut storage = LocalStorage::open(&config.paths.data_dir)?;
    PageImporter::new(config, &fetcher, &mut storage).import(url)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = Config::load_or_default(&config_path);
    init_logging(&config.logging.level);

    match run(&config, &cli.url) {
        Ok(page) => {
            println!("Successfully imported page: {} ({})", page.title, page.slug);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Import of {} failed: {}", cli.url, e);
            eprintln!("Failed to parse page: {e}");
            ExitCode::FAILURE
        }
    }
}
