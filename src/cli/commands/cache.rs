//! Cache command - manage extracted base runtimes

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::JlinkResult;
use crate::fetch::HttpFetcher;
use crate::runtime::{CachedRuntime, RuntimeStore};
use console::style;
use std::io::{self, Write};
use std::sync::Arc;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> JlinkResult<()> {
    let store = RuntimeStore::new(
        config.runtime.cache_dir.clone(),
        config.runtime.tmp_dir.clone(),
        Arc::new(HttpFetcher::new(config.release.download_timeout())),
    );

    match args.action {
        CacheAction::List { format } => list_runtimes(&store, format).await,
        CacheAction::Clear { yes } => clear_runtimes(&store, yes).await,
    }
}

async fn list_runtimes(store: &RuntimeStore, format: OutputFormat) -> JlinkResult<()> {
    let runtimes = store.list().await?;

    match format {
        OutputFormat::Table => print_runtime_table(store, &runtimes),
        OutputFormat::Json => print_runtime_json(&runtimes)?,
        OutputFormat::Plain => {
            for runtime in &runtimes {
                println!("{}", runtime.name);
            }
        }
    }
    Ok(())
}

fn print_runtime_table(store: &RuntimeStore, runtimes: &[CachedRuntime]) {
    if runtimes.is_empty() {
        println!("No cached runtimes in {}", store.root().display());
        return;
    }

    println!("{:<60} PATH", "RUNTIME");
    println!("{}", "-".repeat(80));
    for runtime in runtimes {
        println!("{:<60} {}", runtime.name, style(runtime.path.display()).dim());
    }
    println!();
    println!("Total: {} runtime(s)", runtimes.len());
}

fn print_runtime_json(runtimes: &[CachedRuntime]) -> JlinkResult<()> {
    #[derive(serde::Serialize)]
    struct RuntimeJson<'a> {
        name: &'a str,
        path: String,
    }

    let json: Vec<RuntimeJson<'_>> = runtimes
        .iter()
        .map(|r| RuntimeJson {
            name: &r.name,
            path: r.path.display().to_string(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn clear_runtimes(store: &RuntimeStore, skip_confirm: bool) -> JlinkResult<()> {
    let runtimes = store.list().await?;
    if runtimes.is_empty() {
        println!("No cached runtimes to clear.");
        return Ok(());
    }

    println!("This will remove {} runtime(s):", runtimes.len());
    for runtime in &runtimes {
        println!("  {} {}", style("•").red(), runtime.name);
    }
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = store.clear().await?;
    println!("{} cleared {} runtime(s)", style("✓").green(), removed);
    Ok(())
}
