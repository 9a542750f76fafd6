//! Refresh-token exchange.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	flows::{SessionGateway, challenge, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, event},
	provider::{AuthGrant, InitiateAuthRequest},
};

impl SessionGateway {
	/// Exchanges a refresh token for a new access token and caches it.
	///
	/// The provider does not rotate refresh tokens, so the returned pair normally carries
	/// none; callers keep presenting the one they already hold.
	pub async fn refresh_session(&self, refresh_token: &TokenSecret) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_session");

		span.record_subject(&refresh_token.fingerprint());
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.refresh_inner(refresh_token)).await;

		common::record_outcome(KIND, &result);

		result
	}

	pub(crate) async fn refresh_inner(
		&self,
		refresh_token: &TokenSecret,
	) -> Result<CredentialPair> {
		let request = InitiateAuthRequest {
			pool_id: self.descriptor.pool_id.clone(),
			client_id: self.descriptor.client_id.clone(),
			grant: AuthGrant::RefreshToken { refresh_token: refresh_token.clone() },
		};
		let response =
			self.initiate_with_retry(&request).await.map_err(common::map_provider_error)?;
		let pair = challenge::expect_authenticated("refresh", response)
			.inspect_err(|e| obs::warn_failure("Refresh hit a protocol violation.", e))?;

		self.cache.add_token(pair.access_token.expose());

		event!(
			debug,
			token = %pair.access_token.fingerprint(),
			"Refresh issued a new access token."
		);

		Ok(pair)
	}
}
