//! Transport-agnostic request and response shapes for [`IdentityProvider`] calls.
//!
//! [`IdentityProvider`]: crate::provider::IdentityProvider

// self
use crate::{
	_prelude::*,
	auth::{ChallengeState, ClientId, CredentialPair, Password, PoolId, TokenSecret, Username},
	provider::{AuthFlow, DeliveryMedium},
};

/// Credential material presented to `InitiateAuth`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthGrant {
	/// Username + password (`ADMIN_NO_SRP_AUTH`).
	Password {
		/// User signing in.
		username: Username,
		/// Permanent or temporary password.
		password: Password,
	},
	/// Refresh-token grant (`REFRESH_TOKEN`).
	RefreshToken {
		/// Refresh token previously issued to the client.
		refresh_token: TokenSecret,
	},
}
impl AuthGrant {
	/// Auth flow selected by this grant.
	pub fn flow(&self) -> AuthFlow {
		match self {
			AuthGrant::Password { .. } => AuthFlow::AdminNoSrpAuth,
			AuthGrant::RefreshToken { .. } => AuthFlow::RefreshToken,
		}
	}

	/// Wire `AuthParameters` map. Contains secrets; never log the result.
	pub fn parameters(&self) -> BTreeMap<&'static str, &str> {
		match self {
			AuthGrant::Password { username, password } =>
				BTreeMap::from([("USERNAME", username.as_ref()), ("PASSWORD", password.expose())]),
			AuthGrant::RefreshToken { refresh_token } =>
				BTreeMap::from([("REFRESH_TOKEN", refresh_token.expose())]),
		}
	}
}

/// `InitiateAuth` parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiateAuthRequest {
	/// User pool receiving the attempt.
	pub pool_id: PoolId,
	/// App client the attempt is made for.
	pub client_id: ClientId,
	/// Credential material.
	pub grant: AuthGrant,
}

/// `RespondToChallenge` parameters for the `NEW_PASSWORD_REQUIRED` challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeResponseRequest {
	/// User pool that issued the challenge.
	pub pool_id: PoolId,
	/// App client the challenge belongs to.
	pub client_id: ClientId,
	/// User answering the challenge.
	pub username: Username,
	/// Temporary password used to open the challenge session, when known.
	pub password: Option<Password>,
	/// New permanent password.
	pub new_password: Password,
	/// Opaque session returned alongside the challenge.
	pub session: TokenSecret,
}
impl ChallengeResponseRequest {
	/// Challenge being answered.
	pub fn challenge(&self) -> ChallengeState {
		ChallengeState::NewPasswordRequired
	}

	/// Wire `ChallengeResponses` map. Contains secrets; never log the result.
	pub fn responses(&self) -> BTreeMap<&'static str, &str> {
		let mut responses = BTreeMap::from([
			("USERNAME", self.username.as_ref()),
			("NEW_PASSWORD", self.new_password.expose()),
		]);

		if let Some(password) = &self.password {
			responses.insert("PASSWORD", password.expose());
		}

		responses
	}
}

/// User attribute name/value pair, serialized in wire casing (`Name`, `Value`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserAttribute {
	/// Attribute name (e.g. `email`).
	pub name: String,
	/// Attribute value.
	pub value: String,
}
impl UserAttribute {
	/// Creates an attribute.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: value.into() }
	}
}

/// `CreateUser` parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateUserRequest {
	/// User pool receiving the new user.
	pub pool_id: PoolId,
	/// Username to create.
	pub username: Username,
	/// Initial attributes.
	pub attributes: Vec<UserAttribute>,
	/// Channel used to deliver the temporary password.
	pub delivery_medium: DeliveryMedium,
}
impl CreateUserRequest {
	/// Request for an email-addressed user whose address is considered verified.
	pub fn verified_email(pool_id: PoolId, username: Username) -> Self {
		let attributes = vec![
			UserAttribute::new("email", username.as_ref()),
			UserAttribute::new("email_verified", "true"),
		];

		Self { pool_id, username, attributes, delivery_medium: DeliveryMedium::Email }
	}
}

/// Outcome of `InitiateAuth` or `RespondToChallenge`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthResponse {
	/// Challenge demanded by the provider.
	pub challenge: ChallengeState,
	/// Session used to answer the challenge.
	pub session: Option<TokenSecret>,
	/// Issued credentials when no challenge is pending.
	pub credentials: Option<CredentialPair>,
}
impl AuthResponse {
	/// Response carrying credentials and no challenge.
	pub fn authenticated(credentials: CredentialPair) -> Self {
		Self { challenge: ChallengeState::None, session: None, credentials: Some(credentials) }
	}

	/// Response demanding a challenge.
	pub fn challenged(challenge: ChallengeState, session: impl Into<TokenSecret>) -> Self {
		Self { challenge, session: Some(session.into()), credentials: None }
	}
}

/// Outcome of `GetUser`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInfo {
	/// Username owning the access token.
	pub username: String,
	/// User attributes by name.
	pub attributes: BTreeMap<String, String>,
}
impl UserInfo {
	/// Creates a user without attributes.
	pub fn new(username: impl Into<String>) -> Self {
		Self { username: username.into(), attributes: BTreeMap::new() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn username() -> Username {
		Username::new("someone@example.com").expect("Username fixture should be valid.")
	}

	#[test]
	fn grants_select_flow_and_parameters() {
		let password = AuthGrant::Password {
			username: username(),
			password: Password::new("PASSWORD", "Secret-1").expect("Password should be valid."),
		};
		let refresh = AuthGrant::RefreshToken { refresh_token: TokenSecret::new("refresh-1") };

		assert_eq!(password.flow(), AuthFlow::AdminNoSrpAuth);
		assert_eq!(password.parameters().get("USERNAME"), Some(&"someone@example.com"));
		assert_eq!(refresh.flow(), AuthFlow::RefreshToken);
		assert_eq!(refresh.parameters().len(), 1);
		assert_eq!(refresh.parameters().get("REFRESH_TOKEN"), Some(&"refresh-1"));
	}

	#[test]
	fn challenge_responses_include_temporary_password_when_known() {
		let pool_id = PoolId::new("us-east-1_Pool").expect("Pool fixture should be valid.");
		let client_id = ClientId::new("client").expect("Client fixture should be valid.");
		let mut request = ChallengeResponseRequest {
			pool_id,
			client_id,
			username: username(),
			password: None,
			new_password: Password::new("PASSWORD", "Permanent-1")
				.expect("Password should be valid."),
			session: TokenSecret::new("session"),
		};

		assert!(!request.responses().contains_key("PASSWORD"));

		request.password =
			Some(Password::new("TEMPORARY_PASSWORD", "Temp-1").expect("Password should be valid."));

		assert_eq!(request.responses().get("PASSWORD"), Some(&"Temp-1"));
		assert_eq!(request.challenge(), ChallengeState::NewPasswordRequired);
	}

	#[test]
	fn verified_email_request_sets_attributes() {
		let pool_id = PoolId::new("us-east-1_Pool").expect("Pool fixture should be valid.");
		let request = CreateUserRequest::verified_email(pool_id, username());

		assert_eq!(request.attributes, vec![
			UserAttribute::new("email", "someone@example.com"),
			UserAttribute::new("email_verified", "true"),
		]);
		assert_eq!(request.delivery_medium, DeliveryMedium::Email);
	}
}
