//! Bounded, time-expiring membership cache for validated access tokens.
//!
//! [`CredentialsCache`] lets the session validator skip the provider round-trip for
//! tokens it has already validated within the cache timeout. Entries expire lazily: an
//! expired entry is dropped by the lookup that observes it, and otherwise lingers until
//! LRU eviction pushes it out. Capacity bounds memory either way.
//!
//! There is no way to drop a single token before its timeout elapses, so a signed-out
//! user's token stays accepted until then.

// self
use crate::{
	_prelude::*,
	auth::TokenFingerprint,
	obs::{self, CacheLookup},
};

/// Process-wide default for how long a validated token is trusted.
pub const DEFAULT_TIMEOUT: Duration = Duration::minutes(15);
/// Default entry bound for gateway caches.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug)]
struct CacheEntry {
	expires_at: OffsetDateTime,
	stamp: u64,
}

#[derive(Debug, Default)]
struct CacheState {
	entries: HashMap<TokenFingerprint, CacheEntry>,
	// Recency order: smallest stamp is the least recently used entry.
	order: BTreeMap<u64, TokenFingerprint>,
	clock: u64,
}
impl CacheState {
	fn next_stamp(&mut self) -> u64 {
		self.clock += 1;

		self.clock
	}

	fn remove(&mut self, key: &TokenFingerprint) {
		if let Some(entry) = self.entries.remove(key) {
			self.order.remove(&entry.stamp);
		}
	}

	fn touch(&mut self, key: TokenFingerprint) {
		let stamp = self.next_stamp();

		if let Some(entry) = self.entries.get_mut(&key) {
			self.order.remove(&entry.stamp);
			entry.stamp = stamp;
			self.order.insert(stamp, key);
		}
	}

	fn evict_over(&mut self, capacity: usize) {
		while self.entries.len() > capacity {
			let Some((_, key)) = self.order.pop_first() else {
				break;
			};

			self.entries.remove(&key);
		}
	}
}

/// Thread-safe LRU set of recently validated access tokens with per-entry expiry.
///
/// A single mutex guards both the entry map and the recency order, so eviction
/// bookkeeping can never interleave with a concurrent insert. The lock is never held
/// across an `.await`.
#[derive(Debug)]
pub struct CredentialsCache {
	capacity: usize,
	default_timeout: Duration,
	state: Mutex<CacheState>,
}
impl CredentialsCache {
	/// Creates a cache holding at most `capacity` entries (at least one).
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity: capacity.max(1),
			default_timeout: DEFAULT_TIMEOUT,
			state: Mutex::new(CacheState::default()),
		}
	}

	/// Overrides the timeout applied by [`add_token`](Self::add_token).
	pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;

		self
	}

	/// Maximum number of retained entries.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Timeout applied by [`add_token`](Self::add_token).
	pub fn default_timeout(&self) -> Duration {
		self.default_timeout
	}

	/// Number of entries currently held, including expired ones not yet observed.
	pub fn len(&self) -> usize {
		self.state.lock().entries.len()
	}

	/// Returns true when the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Records a freshly validated token using the default timeout.
	pub fn add_token(&self, token: impl AsRef<str>) {
		self.add_token_with_timeout(token, self.default_timeout);
	}

	/// Records a freshly validated token that stays trusted for `timeout`.
	///
	/// Re-adding a token replaces its expiry and marks it most recently used. A negative
	/// timeout stores nothing and drops any earlier entry for the token.
	pub fn add_token_with_timeout(&self, token: impl AsRef<str>, timeout: Duration) {
		self.add_token_at(token, timeout, OffsetDateTime::now_utc());
	}

	/// Same as [`add_token_with_timeout`](Self::add_token_with_timeout) with an explicit
	/// observation instant.
	pub fn add_token_at(&self, token: impl AsRef<str>, timeout: Duration, now: OffsetDateTime) {
		let key = TokenFingerprint::of(token.as_ref());
		let expires_at = now.saturating_add(timeout);
		let mut state = self.state.lock();

		state.remove(&key);

		// Already expired; storing it could only evict a live entry.
		if timeout.is_negative() {
			return;
		}

		let stamp = state.next_stamp();

		state.entries.insert(key, CacheEntry { expires_at, stamp });
		state.order.insert(stamp, key);
		state.evict_over(self.capacity);
	}

	/// Returns true iff the token is cached and has not expired.
	///
	/// Expired entries are removed by the lookup that finds them.
	pub fn check_token(&self, token: impl AsRef<str>) -> bool {
		self.check_token_at(token, OffsetDateTime::now_utc())
	}

	/// Same as [`check_token`](Self::check_token) with an explicit observation instant.
	pub fn check_token_at(&self, token: impl AsRef<str>, now: OffsetDateTime) -> bool {
		let key = TokenFingerprint::of(token.as_ref());
		let lookup = {
			let mut state = self.state.lock();

			match state.entries.get(&key).map(|entry| entry.expires_at) {
				None => CacheLookup::Miss,
				Some(expires_at) if now > expires_at => {
					state.remove(&key);

					CacheLookup::Expired
				},
				Some(_) => {
					state.touch(key);

					CacheLookup::Hit
				},
			}
		};

		obs::record_cache_lookup(lookup);

		matches!(lookup, CacheLookup::Hit)
	}
}
impl Default for CredentialsCache {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}
