//! JSON configuration for a gateway process.
//!
//! Every section except `pool` is optional and falls back to the crate defaults:
//!
//! ```json
//! {
//!   "pool": { "pool_id": "us-east-1_AbC123", "client_id": "4h1j2k3l" },
//!   "cache": { "capacity": 10000, "timeout_secs": 900 },
//!   "retry": { "max_attempts": 5, "backoff_ms": 250, "exponential": false,
//!              "max_backoff_ms": 5000, "jitter": false },
//!   "request_deadline_ms": 10000
//! }
//! ```

// std
use std::{fs, path::Path};
// self
use crate::{
	_prelude::*,
	cache::{self, CredentialsCache},
	endpoint,
	error::ConfigError,
	provider::PoolDescriptor,
	retry::{self, RetryPolicy},
};

/// Credentials cache section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
	/// Maximum number of cached tokens.
	pub capacity: usize,
	/// Seconds a validated token stays trusted.
	pub timeout_secs: i64,
}
impl CacheConfig {
	/// Builds the cache described by this section.
	pub fn build(&self) -> CredentialsCache {
		CredentialsCache::new(self.capacity)
			.with_default_timeout(Duration::seconds(self.timeout_secs))
	}
}
impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: cache::DEFAULT_CAPACITY,
			timeout_secs: cache::DEFAULT_TIMEOUT.whole_seconds(),
		}
	}
}

/// Retry section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
	/// Total attempts, including the first.
	pub max_attempts: u32,
	/// Base delay between attempts in milliseconds.
	pub backoff_ms: u64,
	/// Doubles the delay after every retry.
	pub exponential: bool,
	/// Ceiling for delays in milliseconds.
	pub max_backoff_ms: u64,
	/// Randomizes each delay.
	pub jitter: bool,
}
impl RetryConfig {
	/// Builds the policy described by this section.
	pub fn build(&self) -> RetryPolicy {
		let max_backoff = StdDuration::from_millis(self.max_backoff_ms);
		let mut policy = RetryPolicy::default()
			.with_max_attempts(self.max_attempts)
			.with_backoff(StdDuration::from_millis(self.backoff_ms))
			.with_jitter(self.jitter);

		policy.max_backoff = max_backoff;

		if self.exponential { policy.exponential(max_backoff) } else { policy }
	}
}
impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: retry::DEFAULT_MAX_ATTEMPTS,
			backoff_ms: retry::DEFAULT_BACKOFF.as_millis() as u64,
			exponential: false,
			max_backoff_ms: retry::DEFAULT_MAX_BACKOFF.as_millis() as u64,
			jitter: false,
		}
	}
}

/// Top-level gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
	/// Pool and app client.
	pub pool: PoolDescriptor,
	/// Credentials cache.
	#[serde(default)]
	pub cache: CacheConfig,
	/// Retry policy.
	#[serde(default)]
	pub retry: RetryConfig,
	/// Per-request deadline in milliseconds.
	#[serde(default = "default_request_deadline_ms")]
	pub request_deadline_ms: u64,
}
impl GatewayConfig {
	/// Creates a configuration with default sections for the given pool.
	pub fn new(pool: PoolDescriptor) -> Self {
		Self {
			pool,
			cache: CacheConfig::default(),
			retry: RetryConfig::default(),
			request_deadline_ms: default_request_deadline_ms(),
		}
	}

	/// Parses a JSON document.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(json);

		Ok(serde_path_to_error::deserialize(&mut de)?)
	}

	/// Reads and parses a JSON file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json_str(&json)
	}

	/// Per-request deadline.
	pub fn request_deadline(&self) -> StdDuration {
		StdDuration::from_millis(self.request_deadline_ms)
	}

	/// Builds a gateway on the crate's reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build_gateway(&self) -> Result<crate::flows::SessionGateway, ConfigError> {
		let cache = Arc::new(self.cache.build());

		Ok(crate::flows::SessionGateway::with_reqwest(self.pool.clone(), cache)?
			.with_retry_policy(self.retry.build()))
	}
}

fn default_request_deadline_ms() -> u64 {
	endpoint::DEFAULT_DEADLINE.as_millis() as u64
}
