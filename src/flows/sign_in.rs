//! Username/password sign-in and the new-password challenge answer.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, Password, Username},
	flows::{AuthStep, PendingChallenge, SessionGateway, challenge, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, event},
	provider::{AuthGrant, ChallengeResponseRequest, InitiateAuthRequest},
};

impl SessionGateway {
	/// Starts a password sign-in.
	///
	/// Returns [`AuthStep::AwaitingNewPassword`] when the user still holds a temporary
	/// password. Issued access tokens are cached before returning.
	pub async fn sign_in(&self, username: &Username, password: &Password) -> Result<AuthStep> {
		const KIND: FlowKind = FlowKind::SignIn;

		let span = FlowSpan::new(KIND, "sign_in");

		span.record_subject(username);
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.password_request(username, password);
				let response =
					self.initiate_with_retry(&request).await.map_err(common::map_provider_error)?;
				let step = challenge::interpret("sign_in", username, response)
					.inspect_err(|e| obs::warn_failure("Sign-in hit a protocol violation.", e))?;

				match &step {
					AuthStep::Authenticated(pair) => {
						self.cache.add_token(pair.access_token.expose());

						event!(
							debug,
							token = %pair.access_token.fingerprint(),
							"Sign-in authenticated."
						);
					},
					AuthStep::AwaitingNewPassword(_) => {
						event!(debug, "Sign-in requires a new password.");
					},
				}

				Ok(step)
			})
			.await;

		common::record_outcome(KIND, &result);

		result
	}

	/// Answers a pending `NEW_PASSWORD_REQUIRED` challenge with the user's permanent password.
	///
	/// `temporary` is forwarded when known; the provider accepts the answer without it.
	pub async fn respond_to_new_password(
		&self,
		pending: &PendingChallenge,
		temporary: Option<&Password>,
		new_password: &Password,
	) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::NewPassword;

		let span = FlowSpan::new(KIND, "respond_to_new_password");

		span.record_subject(&pending.username);
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(self.answer_new_password("new_password", pending, temporary, new_password))
			.await;

		common::record_outcome(KIND, &result);

		result
	}

	pub(crate) fn password_request(
		&self,
		username: &Username,
		password: &Password,
	) -> InitiateAuthRequest {
		InitiateAuthRequest {
			pool_id: self.descriptor.pool_id.clone(),
			client_id: self.descriptor.client_id.clone(),
			grant: AuthGrant::Password { username: username.clone(), password: password.clone() },
		}
	}

	pub(crate) async fn answer_new_password(
		&self,
		stage: &'static str,
		pending: &PendingChallenge,
		temporary: Option<&Password>,
		new_password: &Password,
	) -> Result<CredentialPair> {
		let request = ChallengeResponseRequest {
			pool_id: self.descriptor.pool_id.clone(),
			client_id: self.descriptor.client_id.clone(),
			username: pending.username.clone(),
			password: temporary.cloned(),
			new_password: new_password.clone(),
			session: pending.session.clone(),
		};
		let response =
			self.respond_with_retry(&request).await.map_err(common::map_provider_error)?;
		let pair = challenge::expect_authenticated(stage, response).inspect_err(|e| {
			obs::warn_failure("Challenge answer hit a protocol violation.", e)
		})?;

		self.cache.add_token(pair.access_token.expose());

		Ok(pair)
	}
}
