//! Session validation with cache, provider, and refresh fallbacks.
//!
//! [`SessionGateway::validate_session`] never fails: every error path ends in
//! [`SessionValidation::NotAuthenticated`] with the reason attached. The order of checks is
//! fixed. A cache hit answers without any remote call; a miss asks the provider who owns the
//! token; an expired token is refreshed once if the caller also presented a refresh token.

mod metrics;

pub use metrics::ValidationMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	flows::SessionGateway,
	obs::{self, FlowKind, FlowOutcome, FlowSpan, event},
	provider::ProviderErrorKind,
};

/// Token carriers presented by an inbound request (cookie values).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionCarriers {
	/// Access token carrier.
	pub access_token: Option<TokenSecret>,
	/// Refresh token carrier.
	pub refresh_token: Option<TokenSecret>,
}
impl SessionCarriers {
	/// Builds carriers from raw values; blank values count as absent.
	pub fn new(access_token: Option<&str>, refresh_token: Option<&str>) -> Self {
		fn present(value: Option<&str>) -> Option<TokenSecret> {
			value.map(str::trim).filter(|value| !value.is_empty()).map(TokenSecret::from)
		}

		Self { access_token: present(access_token), refresh_token: present(refresh_token) }
	}
}

/// What established an authenticated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationSource {
	/// The access token was found in the credentials cache.
	Cache,
	/// The provider confirmed the access token.
	Provider,
	/// The access token had expired and a refresh issued a new one.
	Refresh,
}

/// Why a session was not authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotAuthenticatedReason {
	/// No access token was presented.
	MissingCredentials,
	/// The provider rejected the access token.
	Rejected,
	/// The access token expired and no refresh token was presented.
	RefreshUnavailable,
	/// The access token expired and the refresh attempt failed.
	RefreshFailed,
	/// The provider kept throttling validation.
	Throttled,
}
impl NotAuthenticatedReason {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			NotAuthenticatedReason::MissingCredentials => "missing_credentials",
			NotAuthenticatedReason::Rejected => "rejected",
			NotAuthenticatedReason::RefreshUnavailable => "refresh_unavailable",
			NotAuthenticatedReason::RefreshFailed => "refresh_failed",
			NotAuthenticatedReason::Throttled => "throttled",
		}
	}
}

/// Outcome of [`SessionGateway::validate_session`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionValidation {
	/// The session is valid.
	Authenticated {
		/// How the session was established.
		source: ValidationSource,
		/// Credentials to re-issue to the client (set after a refresh).
		reissue: Option<CredentialPair>,
	},
	/// The session is not valid.
	NotAuthenticated(NotAuthenticatedReason),
}
impl SessionValidation {
	/// Returns true for authenticated sessions.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, SessionValidation::Authenticated { .. })
	}

	/// Credentials the caller should hand back to the client, if any.
	pub fn reissue(&self) -> Option<&CredentialPair> {
		match self {
			SessionValidation::Authenticated { reissue, .. } => reissue.as_ref(),
			SessionValidation::NotAuthenticated(_) => None,
		}
	}
}

impl SessionGateway {
	/// Validates the session carried by an inbound request.
	pub async fn validate_session(&self, carriers: &SessionCarriers) -> SessionValidation {
		const KIND: FlowKind = FlowKind::Validate;

		let span = FlowSpan::new(KIND, "validate_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let validation = span
			.instrument(async {
				let Some(access_token) = &carriers.access_token else {
					return SessionValidation::NotAuthenticated(
						NotAuthenticatedReason::MissingCredentials,
					);
				};

				span.record_subject(&access_token.fingerprint());

				self.validate_access_token(access_token, carriers.refresh_token.as_ref()).await
			})
			.await;

		match &validation {
			SessionValidation::Authenticated { source, .. } => {
				match source {
					ValidationSource::Cache => self.validation_metrics.record_cache_hit(),
					ValidationSource::Provider =>
						self.validation_metrics.record_provider_validation(),
					ValidationSource::Refresh => self.validation_metrics.record_refresh(),
				}

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			SessionValidation::NotAuthenticated(reason) => {
				self.validation_metrics.record_rejection();

				event!(debug, reason = reason.as_str(), "Session is not authenticated.");
				#[cfg(not(feature = "tracing"))]
				let _ = reason;

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		validation
	}

	async fn validate_access_token(
		&self,
		access_token: &TokenSecret,
		refresh_token: Option<&TokenSecret>,
	) -> SessionValidation {
		if self.cache.check_token(access_token.expose()) {
			return SessionValidation::Authenticated {
				source: ValidationSource::Cache,
				reissue: None,
			};
		}

		let err = match self.get_user_with_retry(access_token).await {
			Ok(_) => {
				self.cache.add_token(access_token.expose());

				return SessionValidation::Authenticated {
					source: ValidationSource::Provider,
					reissue: None,
				};
			},
			Err(err) => err,
		};

		match err.kind {
			ProviderErrorKind::TokenExpired => {},
			ProviderErrorKind::RateLimited => {
				event!(warn, attempts = err.attempts, "Validation gave up after throttling.");

				return SessionValidation::NotAuthenticated(NotAuthenticatedReason::Throttled);
			},
			_ => {
				event!(warn, error = %err, "Provider rejected the access token.");

				return SessionValidation::NotAuthenticated(NotAuthenticatedReason::Rejected);
			},
		}

		let Some(refresh_token) = refresh_token else {
			return SessionValidation::NotAuthenticated(NotAuthenticatedReason::RefreshUnavailable);
		};

		match self.refresh_inner(refresh_token).await {
			Ok(pair) => SessionValidation::Authenticated {
				source: ValidationSource::Refresh,
				reissue: Some(pair),
			},
			Err(Error::RateLimited { .. }) =>
				SessionValidation::NotAuthenticated(NotAuthenticatedReason::Throttled),
			Err(e) => {
				obs::warn_failure("Refreshing an expired session failed.", &e);

				SessionValidation::NotAuthenticated(NotAuthenticatedReason::RefreshFailed)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::*,
		provider::{ProviderOperation, UserInfo},
	};

	fn carriers(access: &str, refresh: Option<&str>) -> SessionCarriers {
		SessionCarriers::new(Some(access), refresh)
	}

	#[test]
	fn blank_carriers_are_absent() {
		let carriers = SessionCarriers::new(Some("  "), Some(""));

		assert_eq!(carriers, SessionCarriers::default());
	}

	#[tokio::test]
	async fn missing_access_token_is_not_authenticated_without_calls() {
		let (gateway, provider, _) = build_scripted_gateway(8);
		let validation =
			gateway.validate_session(&SessionCarriers::new(None, Some("refresh-1"))).await;

		assert_eq!(
			validation,
			SessionValidation::NotAuthenticated(NotAuthenticatedReason::MissingCredentials)
		);
		assert!(provider.calls().is_empty());
	}

	#[tokio::test]
	async fn cached_token_skips_the_provider() {
		let (gateway, provider, cache) = build_scripted_gateway(8);

		cache.add_token("access-1");

		let validation = gateway.validate_session(&carriers("access-1", None)).await;

		assert_eq!(validation, SessionValidation::Authenticated {
			source: ValidationSource::Cache,
			reissue: None,
		});
		assert!(provider.calls().is_empty());
		assert_eq!(gateway.validation_metrics.cache_hits(), 1);
	}

	#[tokio::test]
	async fn provider_validation_populates_the_cache() {
		let (gateway, provider, cache) = build_scripted_gateway(8);

		provider.push_get_user(Ok(UserInfo::new("someone@example.com")));

		let first = gateway.validate_session(&carriers("access-1", None)).await;
		let second = gateway.validate_session(&carriers("access-1", None)).await;

		assert!(first.is_authenticated());
		assert!(second.is_authenticated());
		assert!(cache.check_token("access-1"));
		assert_eq!(provider.call_count(ProviderOperation::GetUser), 1);
		assert_eq!(gateway.validation_metrics.provider_validations(), 1);
		assert_eq!(gateway.validation_metrics.cache_hits(), 1);
	}

	#[tokio::test]
	async fn expired_token_is_refreshed_and_reissued() {
		let (gateway, provider, cache) = build_scripted_gateway(8);

		provider
			.push_get_user(Err(provider_error(
				ProviderOperation::GetUser,
				ProviderErrorKind::TokenExpired,
			)))
			.push_initiate(Ok(authenticated("access-2", None)));

		let validation = gateway.validate_session(&carriers("access-1", Some("refresh-1"))).await;

		assert_eq!(
			validation.reissue().map(|pair| pair.access_token.expose()),
			Some("access-2")
		);
		assert!(cache.check_token("access-2"));
		assert!(!cache.check_token("access-1"));
		assert_eq!(gateway.validation_metrics.refreshes(), 1);
	}

	#[tokio::test]
	async fn expired_token_without_refresh_token_is_not_authenticated() {
		let (gateway, provider, _) = build_scripted_gateway(8);

		provider.push_get_user(Err(provider_error(
			ProviderOperation::GetUser,
			ProviderErrorKind::TokenExpired,
		)));

		let validation = gateway.validate_session(&carriers("access-1", None)).await;

		assert_eq!(
			validation,
			SessionValidation::NotAuthenticated(NotAuthenticatedReason::RefreshUnavailable)
		);
		assert_eq!(provider.call_count(ProviderOperation::InitiateAuth), 0);
		assert_eq!(gateway.validation_metrics.rejections(), 1);
	}

	#[tokio::test]
	async fn failed_or_challenged_refresh_fails_closed() {
		let (gateway, provider, cache) = build_scripted_gateway(8);

		provider
			.push_get_user(Err(provider_error(
				ProviderOperation::GetUser,
				ProviderErrorKind::TokenExpired,
			)))
			.push_initiate(Ok(challenged("NEW_PASSWORD_REQUIRED", "sess-1")));

		let validation = gateway.validate_session(&carriers("access-1", Some("refresh-1"))).await;

		assert_eq!(
			validation,
			SessionValidation::NotAuthenticated(NotAuthenticatedReason::RefreshFailed)
		);
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn rejected_and_throttled_tokens_fail_closed() {
		let (gateway, provider, _) = build_scripted_gateway(8);

		provider.push_get_user(Err(provider_error(
			ProviderOperation::GetUser,
			ProviderErrorKind::InvalidCredentials,
		)));

		for _ in 0..3 {
			provider.push_get_user(Err(provider_error(
				ProviderOperation::GetUser,
				ProviderErrorKind::RateLimited,
			)));
		}

		let rejected = gateway.validate_session(&carriers("forged", None)).await;
		let throttled = gateway.validate_session(&carriers("access-1", None)).await;

		assert_eq!(rejected, SessionValidation::NotAuthenticated(NotAuthenticatedReason::Rejected));
		assert_eq!(
			throttled,
			SessionValidation::NotAuthenticated(NotAuthenticatedReason::Throttled)
		);
		assert_eq!(provider.call_count(ProviderOperation::GetUser), 4);
	}
}
