//! Error classification hooks for identity-provider transports.
//!
//! Transports collect what they observed about a failure into a [`ProviderErrorContext`] and
//! hand it to a [`ProviderStrategy`], which decides the [`ProviderErrorKind`] flows act on.

// self
use crate::{
	_prelude::*,
	provider::{ProviderErrorKind, ProviderOperation},
};

/// Strategy hook that maps raw provider failures onto [`ProviderErrorKind`].
///
/// Implementors are required to be `Send + Sync`, and the hook works on crate-owned data so
/// downstream crates never depend on reqwest-specific structures.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a failed call.
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;
}

/// Context passed to provider strategies when classifying failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Call that failed.
	pub operation: ProviderOperation,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider error type (the `__type` field, namespace stripped).
	pub error_type: Option<String>,
	/// Provider-supplied message.
	pub message: Option<String>,
	/// Indicates whether the failure originated from the network/transport layer.
	pub network_error: bool,
}
impl ProviderErrorContext {
	/// Creates a new context scoped to the provided operation.
	pub fn new(operation: ProviderOperation) -> Self {
		Self { operation, http_status: None, error_type: None, message: None, network_error: false }
	}

	/// Convenience constructor for transport-level/network failures.
	pub fn network_failure(operation: ProviderOperation) -> Self {
		let mut ctx = Self::new(operation);

		ctx.network_error = true;

		ctx
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the provider error type, dropping any `namespace#` prefix.
	pub fn with_error_type(mut self, error_type: impl AsRef<str>) -> Self {
		let error_type = error_type.as_ref();
		let short = error_type.rsplit_once('#').map_or(error_type, |(_, short)| short);

		self.error_type = Some(short.to_owned());

		self
	}

	/// Adds the provider message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());

		self
	}
}

/// Default strategy for the Cognito JSON protocol.
///
/// Unknown users and bad passwords both classify as [`ProviderErrorKind::InvalidCredentials`].
/// A `NotAuthorizedException` from `GetUser` whose message mentions expiry is the only path to
/// [`ProviderErrorKind::TokenExpired`]. Network failures are never retried as throttling.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if ctx.network_error {
			return ProviderErrorKind::Unexpected;
		}
		if let Some(kind) = ctx.error_type.as_deref().and_then(|ty| classify_type(ctx, ty)) {
			return kind;
		}

		classify_status(ctx.http_status)
	}
}

fn classify_type(ctx: &ProviderErrorContext, error_type: &str) -> Option<ProviderErrorKind> {
	let kind = match error_type {
		"NotAuthorizedException"
			if ctx.operation == ProviderOperation::GetUser && mentions_expiry(ctx) =>
			ProviderErrorKind::TokenExpired,
		"NotAuthorizedException" | "UserNotFoundException" => ProviderErrorKind::InvalidCredentials,
		"InvalidPasswordException" => ProviderErrorKind::InvalidNewSecret,
		"UsernameExistsException" => ProviderErrorKind::UsernameExists,
		"TooManyRequestsException" | "ThrottlingException" | "LimitExceededException" =>
			ProviderErrorKind::RateLimited,
		_ => return None,
	};

	Some(kind)
}

fn mentions_expiry(ctx: &ProviderErrorContext) -> bool {
	ctx.message.as_deref().is_some_and(|message| message.to_ascii_lowercase().contains("expired"))
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(429) => ProviderErrorKind::RateLimited,
		_ => ProviderErrorKind::Unexpected,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn classify(ctx: ProviderErrorContext) -> ProviderErrorKind {
		DefaultProviderStrategy.classify_error(&ctx)
	}

	#[test]
	fn unknown_user_and_bad_password_are_indistinguishable() {
		let not_found = ProviderErrorContext::new(ProviderOperation::InitiateAuth)
			.with_http_status(400)
			.with_error_type("UserNotFoundException")
			.with_message("User does not exist.");
		let bad_password = ProviderErrorContext::new(ProviderOperation::InitiateAuth)
			.with_http_status(400)
			.with_error_type("NotAuthorizedException")
			.with_message("Incorrect username or password.");

		assert_eq!(classify(not_found), ProviderErrorKind::InvalidCredentials);
		assert_eq!(classify(bad_password), ProviderErrorKind::InvalidCredentials);
	}

	#[test]
	fn expiry_is_only_recognized_on_get_user() {
		let expired = ProviderErrorContext::new(ProviderOperation::GetUser)
			.with_error_type("NotAuthorizedException")
			.with_message("Access Token has expired");
		let revoked = ProviderErrorContext::new(ProviderOperation::GetUser)
			.with_error_type("NotAuthorizedException")
			.with_message("Access Token has been revoked");
		let refresh = ProviderErrorContext::new(ProviderOperation::InitiateAuth)
			.with_error_type("NotAuthorizedException")
			.with_message("Refresh Token has expired");

		assert_eq!(classify(expired), ProviderErrorKind::TokenExpired);
		assert_eq!(classify(revoked), ProviderErrorKind::InvalidCredentials);
		assert_eq!(classify(refresh), ProviderErrorKind::InvalidCredentials);
	}

	#[test]
	fn namespaced_types_and_status_fallbacks() {
		let namespaced = ProviderErrorContext::new(ProviderOperation::CreateUser)
			.with_error_type("com.amazonaws.cognito#UsernameExistsException");
		let throttled = ProviderErrorContext::new(ProviderOperation::GetUser).with_http_status(429);
		let policy = ProviderErrorContext::new(ProviderOperation::RespondToChallenge)
			.with_error_type("InvalidPasswordException");
		let server = ProviderErrorContext::new(ProviderOperation::GetUser).with_http_status(500);
		let network = ProviderErrorContext::network_failure(ProviderOperation::InitiateAuth);

		assert_eq!(classify(namespaced), ProviderErrorKind::UsernameExists);
		assert_eq!(classify(throttled), ProviderErrorKind::RateLimited);
		assert_eq!(classify(policy), ProviderErrorKind::InvalidNewSecret);
		assert_eq!(classify(server), ProviderErrorKind::Unexpected);
		assert_eq!(classify(network), ProviderErrorKind::Unexpected);
	}
}
