use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the resolution engine. Safe to share across threads.
#[derive(Debug, Default)]
pub struct Telemetry {
    evaluations: AtomicU64,
    cache_hits: AtomicU64,
    seed_reads: AtomicU64,
    fallbacks: AtomicU64,
}

impl Telemetry {
    #[inline]
    pub(crate) fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_seed(&self) {
        self.seed_reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> TelemetryReport {
        TelemetryReport {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            seed_reads: self.seed_reads.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [&self.evaluations, &self.cache_hits, &self.seed_reads, &self.fallbacks] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryReport {
    /// Compute functions invoked, including derived fallbacks.
    pub evaluations: u64,
    pub cache_hits: u64,
    pub seed_reads: u64,
    /// Quantities that ended on a fallback value.
    pub fallbacks: u64,
}

impl TelemetryReport {
    /// Share of non-seed lookups answered from the cache.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.evaluations + self.cache_hits;
        if lookups > 0 { self.cache_hits as f64 / lookups as f64 } else { 0.0 }
    }

    /// Counter deltas since `earlier`.
    pub fn since(&self, earlier: &TelemetryReport) -> TelemetryReport {
        TelemetryReport {
            evaluations: self.evaluations - earlier.evaluations,
            cache_hits: self.cache_hits - earlier.cache_hits,
            seed_reads: self.seed_reads - earlier.seed_reads,
            fallbacks: self.fallbacks - earlier.fallbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_reset() {
        let t = Telemetry::default();
        t.record_evaluation();
        t.record_evaluation();
        t.record_cache_hit();
        t.record_fallback();
        let report = t.report();
        assert_eq!(report.evaluations, 2);
        assert_eq!(report.fallbacks, 1);
        assert!((report.hit_rate() - 1.0 / 3.0).abs() < 1e-12);

        t.record_cache_hit();
        let delta = t.report().since(&report);
        assert_eq!(delta, TelemetryReport { cache_hits: 1, ..Default::default() });

        t.reset();
        assert_eq!(t.report(), TelemetryReport::default());
        assert_eq!(TelemetryReport::default().hit_rate(), 0.0);
    }
}
