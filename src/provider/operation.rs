//! Remote call identifiers and their `X-Amz-Target` mapping.

// self
use crate::_prelude::*;

/// Content type of every request and response body in the JSON protocol.
pub const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Remote calls issued against the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderOperation {
	/// `AdminInitiateAuth`.
	InitiateAuth,
	/// `AdminRespondToAuthChallenge`.
	RespondToChallenge,
	/// `GetUser`.
	GetUser,
	/// `AdminCreateUser`.
	CreateUser,
}
impl ProviderOperation {
	const TARGET_PREFIX: &'static str = "AWSCognitoIdentityProviderService";

	/// Cognito action name.
	pub const fn action(self) -> &'static str {
		match self {
			ProviderOperation::InitiateAuth => "AdminInitiateAuth",
			ProviderOperation::RespondToChallenge => "AdminRespondToAuthChallenge",
			ProviderOperation::GetUser => "GetUser",
			ProviderOperation::CreateUser => "AdminCreateUser",
		}
	}

	/// Value of the `X-Amz-Target` header selecting this action.
	pub fn target(self) -> String {
		format!("{}.{}", Self::TARGET_PREFIX, self.action())
	}
}
impl Display for ProviderOperation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.action())
	}
}
