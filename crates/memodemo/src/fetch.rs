//! Simulated slow fetch and the cache lookup around it

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use memocache::{Error, Memoize};
use tracing::{debug, warn};

/// Stand-in for a network or disk read that takes a while
pub struct Downloader {
    delay: Duration,
    fail_next: AtomicBool,
}

impl Downloader {
    /// Create a downloader that sleeps for `delay` on every call
    ///
    /// With `fail_first` set, the first call returns an error.
    pub fn new(delay: Duration, fail_first: bool) -> Self {
        Self {
            delay,
            fail_next: AtomicBool::new(fail_first),
        }
    }

    /// Fetch the data for `id`
    pub fn download(&self, id: &str) -> Result<String> {
        println!(
            "Downloading data for '{}' (this may take around {} ms)...",
            id,
            self.delay.as_millis()
        );
        thread::sleep(self.delay);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("simulated network failure for '{}'", id));
        }
        Ok(format!("Data for {}", id))
    }
}

/// Look `key` up through `cache`, downloading it on a miss
///
/// Returns `Ok(None)` when the download failed; the key stays absent so the
/// next fetch tries again. A rejected key is a hard error.
pub fn fetch<C>(cache: &C, downloader: &Downloader, key: &str) -> Result<Option<String>>
where
    C: Memoize<Key = String, Value = String>,
{
    let started = Instant::now();
    match cache.get_or_compute(key.to_string(), |id| downloader.download(id)) {
        Ok(data) => {
            debug!("Fetch completed in {:?}", started.elapsed());
            println!("Result: {} ({} ms)", data, started.elapsed().as_millis());
            Ok(Some(data))
        }
        Err(Error::LoaderFailure(e)) => {
            warn!("Fetch failed: {:#}", e);
            println!("Error: {:#}", e);
            Ok(None)
        }
        Err(e @ Error::InvalidArgument(_)) => bail!("{}", e),
    }
}
