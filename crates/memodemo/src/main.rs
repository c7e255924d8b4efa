//! memodemo - memoizing cache demonstration
//!
//! Fetches one key several times through a cache backed by a slow loader.
//! Only the first fetch pays for the download.

mod fetch;
mod report;

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use memocache::{validate, MemoCache, Memoize, RacyMemoCache};
use tracing::info;

use crate::fetch::{fetch, Downloader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key requested on every fetch
    #[arg(short, long, default_value = "id1")]
    key: String,

    /// Simulated download time in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    delay_ms: u64,

    /// Number of fetch rounds
    #[arg(short, long, default_value_t = 2)]
    fetches: usize,

    /// Concurrent callers per round
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Allow duplicate downloads instead of waiting on an in-flight one
    #[arg(long)]
    racy: bool,

    /// Make the first download fail
    #[arg(long)]
    fail_first: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if args.threads == 0 {
        bail!("--threads must be at least 1");
    }

    info!("Starting memodemo v{}", env!("CARGO_PKG_VERSION"));
    info!("Key: {}", args.key);
    info!("Download delay: {} ms", args.delay_ms);
    info!("Rounds: {} x {} caller(s)", args.fetches, args.threads);

    let downloader = Downloader::new(Duration::from_millis(args.delay_ms), args.fail_first);

    if args.racy {
        let cache = RacyMemoCache::<String, String>::with_key_validator(validate::non_empty);
        run(&cache, "at-least-once", &args, &downloader)
    } else {
        let cache = MemoCache::<String, String>::with_key_validator(validate::non_empty);
        run(&cache, "single-flight", &args, &downloader)
    }
}

fn run<C>(cache: &C, policy: &str, args: &Args, downloader: &Downloader) -> Result<()>
where
    C: Memoize<Key = String, Value = String> + Sync,
{
    info!("Cache policy: {}", policy);

    for round in 0..args.fetches {
        println!("{}:", report::fetch_label(round));

        if args.threads == 1 {
            fetch(cache, downloader, &args.key)?;
        } else {
            thread::scope(|s| {
                let mut handles = Vec::with_capacity(args.threads);
                for _ in 0..args.threads {
                    handles.push(s.spawn(move || fetch(cache, downloader, &args.key)));
                }
                handles.into_iter().try_for_each(|handle| {
                    handle
                        .join()
                        .map_err(|_| anyhow!("fetch thread panicked"))?
                        .map(|_| ())
                })
            })?;
        }
        println!();
    }

    print!("{}", report::render(policy, cache.len(), cache.stats()));
    Ok(())
}
