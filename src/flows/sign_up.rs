//! User creation with an emailed temporary password.

// self
use crate::{
	_prelude::*,
	auth::Username,
	flows::{SessionGateway, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan, event},
	provider::{CreateUserRequest, ProviderErrorKind},
};

impl SessionGateway {
	/// Creates a user whose email address doubles as the username.
	///
	/// The address is marked verified and the provider emails a temporary password, which
	/// the user later trades in through [`SessionGateway::confirm_sign_up`].
	pub async fn sign_up(&self, username: &Username) -> Result<()> {
		const KIND: FlowKind = FlowKind::SignUp;

		let span = FlowSpan::new(KIND, "sign_up");

		span.record_subject(username);
		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let pool_id = self.descriptor.pool_id.clone();
				let request = CreateUserRequest::verified_email(pool_id, username.clone());

				self.create_user_with_retry(&request).await.map_err(|e| match e.kind {
					ProviderErrorKind::UsernameExists => {
						event!(debug, "Sign-up collided with an existing user.");

						Error::Conflict { username: username.to_string() }
					},
					_ => common::map_provider_error(e),
				})
			})
			.await;

		common::record_outcome(KIND, &result);

		result
	}
}
