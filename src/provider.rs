//! Identity-provider contract (behavior) plus pool descriptors and error classification (data).
//!
//! [`IdentityProvider`] is the only seam between the gateway and the remote service. It
//! mirrors the four remote calls the session protocol needs, parameter for parameter, and
//! reports failures as [`ProviderError`] values whose [`ProviderErrorKind`] has already been
//! classified by a [`ProviderStrategy`]. Flows match on that kind and never inspect wire
//! messages.

pub mod descriptor;
pub mod error;
pub mod operation;
pub mod request;
pub mod strategy;

pub use descriptor::*;
pub use error::*;
pub use operation::*;
pub use request::*;
pub use strategy::*;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`IdentityProvider`] calls.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Remote identity provider reachable over a synchronous RPC-style call.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Starts an authentication attempt with a password or refresh-token grant.
	fn initiate_auth<'a>(
		&'a self,
		request: &'a InitiateAuthRequest,
	) -> ProviderFuture<'a, AuthResponse>;

	/// Answers a pending challenge (currently only `NEW_PASSWORD_REQUIRED`).
	fn respond_to_challenge<'a>(
		&'a self,
		request: &'a ChallengeResponseRequest,
	) -> ProviderFuture<'a, AuthResponse>;

	/// Resolves the user that owns an access token; fails when the token is invalid or expired.
	fn get_user<'a>(&'a self, access_token: &'a TokenSecret) -> ProviderFuture<'a, UserInfo>;

	/// Creates a user whose temporary password is delivered out of band.
	fn create_user<'a>(&'a self, request: &'a CreateUserRequest) -> ProviderFuture<'a, ()>;
}
