mod host;
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use infiniscroll_core::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::host::PreviewHost;

const DEFAULT_ITEMS: usize = 6;

fn main() -> Result<()> {
    // Logs go to stderr; redirect it when running with RUST_LOG set.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("Usage: infiniscroll [ITEM_COUNT] [CONFIG_JSON]");
        return Ok(());
    }

    let items = match args.get(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("invalid item count: {arg}"))?,
        None => DEFAULT_ITEMS,
    };
    let config = match args.get(2) {
        Some(path) => {
            let path = PathBuf::from(path);
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let mut host = PreviewHost::new(items, config);
    host.attach().context("carousel did not activate")?;
    renderer::run_tui(&mut host)?;
    Ok(())
}
