//! Classified provider failures.

// self
use crate::{_prelude::*, provider::ProviderOperation};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical provider error categories produced by a [`ProviderStrategy`].
///
/// [`ProviderStrategy`]: crate::provider::ProviderStrategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
	/// Bad username/secret or unknown user. Never split further, to avoid user enumeration.
	InvalidCredentials,
	/// The proposed permanent secret fails the pool's password policy.
	InvalidNewSecret,
	/// The access token presented to `GetUser` has expired and may be refreshed.
	TokenExpired,
	/// `CreateUser` collided with an existing username.
	UsernameExists,
	/// The provider is throttling this caller; safe to retry after a delay.
	RateLimited,
	/// Anything else, including transport failures and malformed responses.
	Unexpected,
}

/// Failure reported by an [`IdentityProvider`] call.
///
/// [`IdentityProvider`]: crate::provider::IdentityProvider
#[derive(Debug, ThisError)]
#[error("{operation} failed ({kind:?}): {message}")]
pub struct ProviderError {
	/// Call that failed.
	pub operation: ProviderOperation,
	/// Classification used by the flows.
	pub kind: ProviderErrorKind,
	/// Provider- or gateway-supplied message.
	pub message: String,
	/// Provider error code (for Cognito, the `__type` field), when available.
	pub code: Option<String>,
	/// HTTP status code, when available.
	pub status: Option<u16>,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<StdDuration>,
	/// Number of attempts made before this error surfaced.
	pub attempts: u32,
	/// Underlying transport or parsing failure.
	#[source]
	pub source: Option<BoxError>,
}
impl ProviderError {
	/// Creates an error for the given call and classification.
	pub fn new(
		operation: ProviderOperation,
		kind: ProviderErrorKind,
		message: impl Into<String>,
	) -> Self {
		Self {
			operation,
			kind,
			message: message.into(),
			code: None,
			status: None,
			retry_after: None,
			attempts: 1,
			source: None,
		}
	}

	/// Attaches the provider error code.
	pub fn with_code(mut self, code: impl Into<String>) -> Self {
		self.code = Some(code.into());

		self
	}

	/// Attaches the HTTP status code.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches a Retry-After hint.
	pub fn with_retry_after(mut self, retry_after: StdDuration) -> Self {
		self.retry_after = Some(retry_after);

		self
	}

	/// Attaches the underlying failure.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(source));

		self
	}

	/// Returns true when the failure is a throttling signal.
	pub fn is_rate_limited(&self) -> bool {
		self.kind == ProviderErrorKind::RateLimited
	}
}
