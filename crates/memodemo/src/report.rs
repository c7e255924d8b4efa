//! Console output for the demo

use memocache::CacheStats;

/// Heading printed before each fetch round
pub fn fetch_label(round: usize) -> String {
    match round {
        0 => "First fetch".to_string(),
        1 => "Second fetch".to_string(),
        2 => "Third fetch".to_string(),
        n => format!("Fetch #{}", n + 1),
    }
}

/// Render cache statistics as `name:value` lines grouped under headers
pub fn render(policy: &str, stored: usize, stats: &CacheStats) -> String {
    format!(
        "# Cache\n\
         policy:{}\n\
         stored_keys:{}\n\
         \n\
         # Stats\n\
         hits:{}\n\
         misses:{}\n\
         hit_ratio:{:.2}\n\
         loads:{}\n\
         load_failures:{}\n\
         waits:{}\n\
         discarded:{}\n\
         rejected:{}\n",
        policy,
        stored,
        stats.hits(),
        stats.misses(),
        stats.hit_ratio(),
        stats.loads(),
        stats.load_failures(),
        stats.waits(),
        stats.discarded(),
        stats.rejected(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_label() {
        assert_eq!(fetch_label(0), "First fetch");
        assert_eq!(fetch_label(1), "Second fetch");
        assert_eq!(fetch_label(4), "Fetch #5");
    }

    #[test]
    fn test_render() {
        let stats = CacheStats::new();
        stats.record_miss();
        stats.record_load();
        stats.record_hit();

        let report = render("single-flight", 1, &stats);

        assert!(report.starts_with("# Cache\npolicy:single-flight\nstored_keys:1\n"));
        assert!(report.contains("hits:1\n"));
        assert!(report.contains("misses:1\n"));
        assert!(report.contains("hit_ratio:0.50\n"));
        assert!(report.contains("loads:1\n"));
        assert!(report.contains("waits:0\n"));
    }
}
