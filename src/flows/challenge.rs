//! Challenge-response interpretation for `InitiateAuth` and `RespondToChallenge` results.
//!
//! The provider answers every auth call with a challenge name (possibly absent), an
//! optional session, and an optional authentication result. Only two shapes are legal:
//! no challenge with credentials, or `NEW_PASSWORD_REQUIRED` with a session. Anything else
//! is a [`ProtocolError`].

// self
use crate::{
	_prelude::*,
	auth::{ChallengeState, CredentialPair, TokenSecret, Username},
	error::ProtocolError,
	provider::AuthResponse,
};

/// Sign-in paused on a `NEW_PASSWORD_REQUIRED` challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChallenge {
	/// User the challenge was issued for.
	pub username: Username,
	/// Session that must accompany the answer.
	pub session: TokenSecret,
}

/// Where an authentication exchange stands after a provider response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStep {
	/// The exchange finished and issued credentials.
	Authenticated(CredentialPair),
	/// The user must choose a permanent password before credentials are issued.
	AwaitingNewPassword(PendingChallenge),
}
impl AuthStep {
	/// Returns the issued credentials, if the exchange finished.
	pub fn credentials(&self) -> Option<&CredentialPair> {
		match self {
			AuthStep::Authenticated(pair) => Some(pair),
			AuthStep::AwaitingNewPassword(_) => None,
		}
	}
}

/// Interprets a response at a stage where a new-password challenge is acceptable.
pub fn interpret(
	stage: &'static str,
	username: &Username,
	response: AuthResponse,
) -> Result<AuthStep, ProtocolError> {
	match response.challenge {
		ChallengeState::None => response
			.credentials
			.map(AuthStep::Authenticated)
			.ok_or(ProtocolError::MissingAuthenticationResult { stage }),
		ChallengeState::NewPasswordRequired => {
			let session = response.session.ok_or(ProtocolError::MissingSession { stage })?;

			Ok(AuthStep::AwaitingNewPassword(PendingChallenge {
				username: username.clone(),
				session,
			}))
		},
		other => Err(unexpected(stage, &other)),
	}
}

/// Interprets a response at a stage where only issued credentials are acceptable.
pub fn expect_authenticated(
	stage: &'static str,
	response: AuthResponse,
) -> Result<CredentialPair, ProtocolError> {
	if !response.challenge.is_none() {
		return Err(unexpected(stage, &response.challenge));
	}

	response.credentials.ok_or(ProtocolError::MissingAuthenticationResult { stage })
}

pub(crate) fn unexpected(stage: &'static str, challenge: &ChallengeState) -> ProtocolError {
	ProtocolError::UnexpectedChallenge { stage, challenge: challenge.to_string() }
}
