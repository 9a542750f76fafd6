//! Shared helpers for gateway operations (retried provider calls, error mapping, outcomes).

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::SessionGateway,
	obs::{self, FlowKind, FlowOutcome},
	provider::{
		AuthResponse, ChallengeResponseRequest, CreateUserRequest, InitiateAuthRequest,
		ProviderError, ProviderErrorKind, ProviderOperation, UserInfo,
	},
};

impl SessionGateway {
	pub(crate) async fn initiate_with_retry(
		&self,
		request: &InitiateAuthRequest,
	) -> Result<AuthResponse, ProviderError> {
		let provider = self.provider.as_ref();

		self.retry
			.run(ProviderOperation::InitiateAuth, move || provider.initiate_auth(request))
			.await
	}

	pub(crate) async fn respond_with_retry(
		&self,
		request: &ChallengeResponseRequest,
	) -> Result<AuthResponse, ProviderError> {
		let provider = self.provider.as_ref();

		self.retry
			.run(ProviderOperation::RespondToChallenge, move || {
				provider.respond_to_challenge(request)
			})
			.await
	}

	pub(crate) async fn get_user_with_retry(
		&self,
		access_token: &TokenSecret,
	) -> Result<UserInfo, ProviderError> {
		let provider = self.provider.as_ref();

		self.retry.run(ProviderOperation::GetUser, move || provider.get_user(access_token)).await
	}

	pub(crate) async fn create_user_with_retry(
		&self,
		request: &CreateUserRequest,
	) -> Result<(), ProviderError> {
		let provider = self.provider.as_ref();

		self.retry.run(ProviderOperation::CreateUser, move || provider.create_user(request)).await
	}
}

/// Maps a classified provider failure onto the gateway error taxonomy.
///
/// `UsernameExists` is left as a provider error here; sign-up maps it with the username.
pub(crate) fn map_provider_error(err: ProviderError) -> Error {
	match err.kind {
		ProviderErrorKind::InvalidCredentials => Error::CredentialsInvalid { reason: err.message },
		ProviderErrorKind::InvalidNewSecret => Error::PolicyViolation { reason: err.message },
		ProviderErrorKind::RateLimited =>
			Error::RateLimited { operation: err.operation.action(), attempts: err.attempts },
		ProviderErrorKind::TokenExpired
		| ProviderErrorKind::UsernameExists
		| ProviderErrorKind::Unexpected => Error::Provider(err),
	}
}

/// Records the terminal outcome of an operation.
pub(crate) fn record_outcome<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}
}
