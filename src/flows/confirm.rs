//! Sign-up confirmation: trade the emailed temporary password for a permanent one.

// self
use crate::{
	_prelude::*,
	auth::{ChallengeState, CredentialPair, Password, Username},
	flows::{AuthStep, SessionGateway, challenge, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, event},
};

impl SessionGateway {
	/// Signs in with the temporary password, then answers the mandatory new-password
	/// challenge.
	///
	/// A temporary password that authenticates outright means the user was already
	/// confirmed; that is reported as an unexpected (absent) challenge.
	pub async fn confirm_sign_up(
		&self,
		username: &Username,
		temporary: &Password,
		new_password: &Password,
	) -> Result<CredentialPair> {
		const KIND: FlowKind = FlowKind::ConfirmSignUp;
		const STAGE: &str = "confirm_sign_up";

		let span = FlowSpan::new(KIND, STAGE);

		span.record_subject(username);
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.password_request(username, temporary);
				let response =
					self.initiate_with_retry(&request).await.map_err(common::map_provider_error)?;
				let pending = match challenge::interpret(STAGE, username, response)? {
					AuthStep::AwaitingNewPassword(pending) => pending,
					AuthStep::Authenticated(_) => {
						let err = challenge::unexpected(STAGE, &ChallengeState::None);

						event!(
							warn,
							error = %err,
							"Temporary password authenticated without a challenge."
						);

						return Err(err.into());
					},
				};

				self.answer_new_password(STAGE, &pending, Some(temporary), new_password).await
			})
			.await;

		common::record_outcome(KIND, &result);

		result
	}
}
