//! Credential pair issued by a successful authentication or refresh.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token plus the optional refresh token.
///
/// Refresh results carry no refresh token because the provider does not reissue it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialPair {
	/// Bearer token validated by `GetUser`.
	pub access_token: TokenSecret,
	/// Long-lived token used to mint new access tokens.
	pub refresh_token: Option<TokenSecret>,
	/// OpenID Connect ID token, when the provider returns one.
	pub id_token: Option<TokenSecret>,
	/// Access token lifetime announced by the provider.
	pub expires_in: Option<Duration>,
}
impl CredentialPair {
	/// Creates a pair holding only an access token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token: None,
			id_token: None,
			expires_in: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Attaches an ID token.
	pub fn with_id_token(mut self, id_token: impl Into<TokenSecret>) -> Self {
		self.id_token = Some(id_token.into());

		self
	}

	/// Records the provider-announced lifetime.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = Some(expires_in);

		self
	}

	/// Returns the refresh token when it carries a non-blank value.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref().filter(|token| !token.expose().trim().is_empty())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_refresh_tokens_are_ignored() {
		let pair = CredentialPair::new("access").with_refresh_token("");

		assert!(pair.refresh_token.is_some());
		assert!(pair.refresh_token().is_none());

		let pair = CredentialPair::new("access").with_refresh_token("refresh");

		assert_eq!(pair.refresh_token().map(TokenSecret::expose), Some("refresh"));
	}
}
