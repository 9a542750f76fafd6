//! Cognito-backed sign-up, sign-in and session validation with a bounded credentials cache,
//! structured challenge handling, and throttling-aware retries.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod ext;
pub mod flows;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod provider;
pub mod retry;
#[cfg(feature = "server")] pub mod server;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		auth::{ChallengeState, ClientId, CredentialPair, PoolId, TokenSecret},
		cache::CredentialsCache,
		flows::SessionGateway,
		provider::{
			AuthResponse, ChallengeResponseRequest, CreateUserRequest, IdentityProvider,
			InitiateAuthRequest, PoolDescriptor, ProviderError, ProviderErrorKind,
			ProviderFuture, ProviderOperation, UserInfo,
		},
		retry::RetryPolicy,
	};

	type Script<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

	/// In-memory [`IdentityProvider`] that replays queued responses and records every call.
	#[derive(Debug, Default)]
	pub struct ScriptedProvider {
		initiate: Script<AuthResponse>,
		respond: Script<AuthResponse>,
		get_user: Script<UserInfo>,
		create_user: Script<()>,
		calls: Mutex<Vec<ProviderOperation>>,
		initiate_requests: Mutex<Vec<InitiateAuthRequest>>,
		respond_requests: Mutex<Vec<ChallengeResponseRequest>>,
		create_requests: Mutex<Vec<CreateUserRequest>>,
	}
	impl ScriptedProvider {
		/// Queues the next `InitiateAuth` result.
		pub fn push_initiate(&self, result: Result<AuthResponse, ProviderError>) -> &Self {
			self.initiate.lock().push_back(result);

			self
		}

		/// Queues the next `RespondToChallenge` result.
		pub fn push_respond(&self, result: Result<AuthResponse, ProviderError>) -> &Self {
			self.respond.lock().push_back(result);

			self
		}

		/// Queues the next `GetUser` result.
		pub fn push_get_user(&self, result: Result<UserInfo, ProviderError>) -> &Self {
			self.get_user.lock().push_back(result);

			self
		}

		/// Queues the next `CreateUser` result.
		pub fn push_create_user(&self, result: Result<(), ProviderError>) -> &Self {
			self.create_user.lock().push_back(result);

			self
		}

		/// Returns every operation invoked so far, in order.
		pub fn calls(&self) -> Vec<ProviderOperation> {
			self.calls.lock().clone()
		}

		/// Counts invocations of a single operation.
		pub fn call_count(&self, operation: ProviderOperation) -> usize {
			self.calls.lock().iter().filter(|op| **op == operation).count()
		}

		/// Returns the recorded `InitiateAuth` requests.
		pub fn initiate_requests(&self) -> Vec<InitiateAuthRequest> {
			self.initiate_requests.lock().clone()
		}

		/// Returns the recorded `RespondToChallenge` requests.
		pub fn respond_requests(&self) -> Vec<ChallengeResponseRequest> {
			self.respond_requests.lock().clone()
		}

		/// Returns the recorded `CreateUser` requests.
		pub fn create_requests(&self) -> Vec<CreateUserRequest> {
			self.create_requests.lock().clone()
		}

		fn next<T>(
			&self,
			operation: ProviderOperation,
			script: &Script<T>,
		) -> Result<T, ProviderError> {
			self.calls.lock().push(operation);

			script.lock().pop_front().unwrap_or_else(|| {
				Err(ProviderError::new(
					operation,
					ProviderErrorKind::Unexpected,
					"No scripted response is queued.",
				))
			})
		}
	}
	impl IdentityProvider for ScriptedProvider {
		fn initiate_auth<'a>(
			&'a self,
			request: &'a InitiateAuthRequest,
		) -> ProviderFuture<'a, AuthResponse> {
			self.initiate_requests.lock().push(request.clone());

			let result = self.next(ProviderOperation::InitiateAuth, &self.initiate);

			Box::pin(async move { result })
		}

		fn respond_to_challenge<'a>(
			&'a self,
			request: &'a ChallengeResponseRequest,
		) -> ProviderFuture<'a, AuthResponse> {
			self.respond_requests.lock().push(request.clone());

			let result = self.next(ProviderOperation::RespondToChallenge, &self.respond);

			Box::pin(async move { result })
		}

		fn get_user<'a>(&'a self, _access_token: &'a TokenSecret) -> ProviderFuture<'a, UserInfo> {
			let result = self.next(ProviderOperation::GetUser, &self.get_user);

			Box::pin(async move { result })
		}

		fn create_user<'a>(&'a self, request: &'a CreateUserRequest) -> ProviderFuture<'a, ()> {
			self.create_requests.lock().push(request.clone());

			let result = self.next(ProviderOperation::CreateUser, &self.create_user);

			Box::pin(async move { result })
		}
	}

	/// Descriptor pointing at a loopback endpoint that no test ever dials.
	pub fn test_descriptor() -> PoolDescriptor {
		PoolDescriptor::builder(
			PoolId::new("us-east-1_TestPool").expect("Pool fixture should be valid."),
			ClientId::new("test-client").expect("Client fixture should be valid."),
		)
		.endpoint(Url::parse("http://127.0.0.1:9/").expect("Loopback endpoint should parse."))
		.build()
		.expect("Test descriptor should build.")
	}

	/// Retry policy with millisecond backoff so throttling tests stay fast.
	pub fn fast_retry_policy(max_attempts: u32) -> RetryPolicy {
		RetryPolicy::default()
			.with_max_attempts(max_attempts)
			.with_backoff(std::time::Duration::from_millis(1))
	}

	/// Builds a gateway around a fresh [`ScriptedProvider`] and cache.
	pub fn build_scripted_gateway(
		capacity: usize,
	) -> (SessionGateway, Arc<ScriptedProvider>, Arc<CredentialsCache>) {
		let provider = Arc::new(ScriptedProvider::default());
		let cache = Arc::new(CredentialsCache::new(capacity));
		let gateway = SessionGateway::new(provider.clone(), test_descriptor(), cache.clone())
			.with_retry_policy(fast_retry_policy(3));

		(gateway, provider, cache)
	}

	/// Successful authentication result without a challenge.
	pub fn authenticated(access: &str, refresh: Option<&str>) -> AuthResponse {
		let mut pair = CredentialPair::new(access);

		if let Some(refresh) = refresh {
			pair = pair.with_refresh_token(refresh);
		}

		AuthResponse::authenticated(pair)
	}

	/// Challenge result carrying a session token.
	pub fn challenged(name: &str, session: &str) -> AuthResponse {
		AuthResponse::challenged(ChallengeState::from_name(Some(name)), session)
	}

	/// Provider failure of the given kind.
	pub fn provider_error(operation: ProviderOperation, kind: ProviderErrorKind) -> ProviderError {
		ProviderError::new(operation, kind, format!("scripted {kind:?} failure"))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tracing_subscriber as _};
