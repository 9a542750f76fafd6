//! Gateway operations: sign-up, sign-in with challenge handling, refresh, and validation.

pub mod challenge;
pub mod common;
pub mod validate;

mod confirm;
mod refresh;
mod sign_in;
mod sign_up;

pub use challenge::*;
pub use validate::*;

// self
use crate::{
	_prelude::*, cache::CredentialsCache, provider::IdentityProvider, provider::PoolDescriptor,
	retry::RetryPolicy,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::CognitoHttpClient};

/// Coordinates the session protocol against a single user pool.
///
/// The gateway owns the provider handle, the pool descriptor, the injected credentials cache,
/// and the retry policy so individual operations only carry their own protocol logic. Every
/// remote call goes through [`RetryPolicy::run`].
#[derive(Clone)]
pub struct SessionGateway {
	/// Identity provider receiving every remote call.
	pub provider: Arc<dyn IdentityProvider>,
	/// Pool and app client the gateway acts for.
	pub descriptor: PoolDescriptor,
	/// Shared cache of validated access tokens.
	pub cache: Arc<CredentialsCache>,
	/// Retry budget applied to throttled calls.
	pub retry: RetryPolicy,
	/// In-process counters for session validation.
	pub validation_metrics: Arc<ValidationMetrics>,
}
impl SessionGateway {
	/// Creates a gateway around a caller-provided provider and cache.
	pub fn new(
		provider: Arc<dyn IdentityProvider>,
		descriptor: PoolDescriptor,
		cache: Arc<CredentialsCache>,
	) -> Self {
		Self {
			provider,
			descriptor,
			cache,
			retry: RetryPolicy::default(),
			validation_metrics: Default::default(),
		}
	}

	/// Overrides the retry policy.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}
}
#[cfg(feature = "reqwest")]
impl SessionGateway {
	/// Creates a gateway that talks to the descriptor's endpoint with the crate's reqwest
	/// transport.
	pub fn with_reqwest(
		descriptor: PoolDescriptor,
		cache: Arc<CredentialsCache>,
	) -> Result<Self, ConfigError> {
		let provider = CognitoHttpClient::from_descriptor(&descriptor)?;

		Ok(Self::new(Arc::new(provider), descriptor, cache))
	}
}
impl Debug for SessionGateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGateway")
			.field("descriptor", &self.descriptor)
			.field("cache_capacity", &self.cache.capacity())
			.field("retry", &self.retry)
			.finish()
	}
}
