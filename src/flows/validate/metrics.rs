// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for session validation outcomes.
#[derive(Debug, Default)]
pub struct ValidationMetrics {
	cache_hits: AtomicU64,
	provider_validations: AtomicU64,
	refreshes: AtomicU64,
	rejections: AtomicU64,
}
impl ValidationMetrics {
	/// Returns the number of sessions accepted straight from the cache.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions accepted after a provider round-trip.
	pub fn provider_validations(&self) -> u64 {
		self.provider_validations.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions accepted after refreshing an expired token.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns the number of sessions that were not authenticated.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_provider_validation(&self) {
		self.provider_validations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejection(&self) {
		self.rejections.fetch_add(1, Ordering::Relaxed);
	}
}
