//! Parallel zone dispatch.

use popsim_config::IntegerizerConfig;
use popsim_integerizer::{Integerized, Integerizer, IntegerizerError};
use rayon::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::work::ZoneWork;

/// Integerizes every zone on a dedicated rayon pool.
///
/// The pool has `config.thread_count` threads, capped at the number of
/// zones. Results come back in the order of `work`; each zone's search is
/// seeded with `random_seed + zone id`, so the outcome does not depend on
/// the thread count.
pub fn solve_zones(
    work: &[ZoneWork],
    config: &IntegerizerConfig,
) -> Result<Vec<std::result::Result<Integerized, IntegerizerError>>> {
    let threads = config.thread_count.resolve(work.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("popsim-zone-{i}"))
        .build()?;

    info!(
        event = "dispatch",
        zones = work.len(),
        threads = threads,
        thread_count = %config.thread_count,
    );

    Ok(pool.install(|| {
        work.par_iter()
            .map(|zone| solve_zone(zone, config))
            .collect()
    }))
}

fn solve_zone(
    work: &ZoneWork,
    config: &IntegerizerConfig,
) -> std::result::Result<Integerized, IntegerizerError> {
    let seed = config.random_seed.wrapping_add(work.zone.get());
    let result = Integerizer::new(config).with_seed(seed).solve(&work.problem)?;

    info!(
        event = "zone_integerized",
        zone = %work.zone,
        households = work.household_count(),
        status = %result.status,
        total = result.total(),
        score = %result.score,
        duration_ms = result.statistics.duration.as_millis() as u64,
    );
    Ok(result)
}
