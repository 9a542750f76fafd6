//! Cognito JSON-protocol transport built on reqwest.
//!
//! [`CognitoHttpClient`] implements [`IdentityProvider`] by POSTing JSON bodies to the pool
//! endpoint with the `X-Amz-Target` header selecting the action. Failed calls are described in
//! a [`ProviderErrorContext`] together with the [`ResponseMetadata`] captured from the response,
//! and classified by the configured [`ProviderStrategy`].

// crates.io
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::{ChallengeState, CredentialPair, TokenSecret},
	error::ConfigError,
	ext::{RequestSigner, SignableRequest},
	provider::{
		AuthResponse, ChallengeResponseRequest, CreateUserRequest, DefaultProviderStrategy,
		IdentityProvider, InitiateAuthRequest, PoolDescriptor, ProviderError,
		ProviderErrorContext, ProviderErrorKind, ProviderFuture, ProviderOperation,
		ProviderStrategy, UserAttribute, UserInfo,
	},
};

/// Metadata captured from the most recent HTTP response for error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<StdDuration>,
}

/// [`IdentityProvider`] speaking the Cognito JSON protocol over reqwest.
///
/// The client never follows redirects; configure any custom [`ReqwestClient`] the same way.
#[derive(Clone)]
pub struct CognitoHttpClient {
	client: ReqwestClient,
	endpoint: Url,
	strategy: Arc<dyn ProviderStrategy>,
	signer: Option<Arc<dyn RequestSigner>>,
}
impl CognitoHttpClient {
	/// Builds a client with its own reqwest pool.
	pub fn new(endpoint: Url) -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self::with_client(client, endpoint))
	}

	/// Builds a client targeting the descriptor's endpoint.
	pub fn from_descriptor(descriptor: &PoolDescriptor) -> Result<Self, ConfigError> {
		Self::new(descriptor.endpoint.clone())
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint, strategy: Arc::new(DefaultProviderStrategy), signer: None }
	}

	/// Overrides the error classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Signs every outbound call with `signer`.
	pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
		self.signer = Some(signer);

		self
	}

	/// Endpoint receiving every call.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn call<Req>(
		&self,
		operation: ProviderOperation,
		body: &Req,
	) -> Result<Vec<u8>, ProviderError>
	where
		Req: Serialize,
	{
		let body = serde_json::to_vec(body).map_err(|e| {
			ProviderError::new(
				operation,
				ProviderErrorKind::Unexpected,
				"Request body could not be serialized.",
			)
			.with_source(e)
		})?;
		let mut request = SignableRequest::new(operation, self.endpoint.clone(), body);

		if let Some(signer) = &self.signer {
			signer.sign(&mut request).map_err(|e| {
				ProviderError::new(operation, ProviderErrorKind::Unexpected, e.message.clone())
					.with_source(e)
			})?;
		}

		let mut builder = self.client.post(request.url);

		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}

		let response = builder
			.body(request.body)
			.send()
			.await
			.map_err(|e| self.network_error(operation, e))?;
		let status = response.status();
		let meta = ResponseMetadata {
			status: Some(status.as_u16()),
			retry_after: parse_retry_after(response.headers()),
		};
		let bytes = response.bytes().await.map_err(|e| self.network_error(operation, e))?;

		if status.is_success() {
			Ok(bytes.to_vec())
		} else {
			Err(self.response_error(operation, &meta, &bytes))
		}
	}

	fn network_error(&self, operation: ProviderOperation, e: ReqwestError) -> ProviderError {
		let ctx = ProviderErrorContext::network_failure(operation);
		let kind = self.strategy.classify_error(&ctx);

		ProviderError::new(
			operation,
			kind,
			"Network error occurred while calling the identity provider.",
		)
		.with_source(e)
	}

	fn response_error(
		&self,
		operation: ProviderOperation,
		meta: &ResponseMetadata,
		body: &[u8],
	) -> ProviderError {
		let wire = serde_json::from_slice::<WireError>(body).unwrap_or_default();
		let mut ctx = ProviderErrorContext::new(operation);

		if let Some(status) = meta.status {
			ctx = ctx.with_http_status(status);
		}
		if let Some(error_type) = &wire.error_type {
			ctx = ctx.with_error_type(error_type);
		}
		if let Some(message) = &wire.message {
			ctx = ctx.with_message(message);
		}

		let kind = self.strategy.classify_error(&ctx);
		let message = ctx.message.clone().unwrap_or_else(|| match meta.status {
			Some(status) => format!("Identity provider answered with HTTP {status}."),
			None => "Identity provider call failed.".to_owned(),
		});
		let mut err = ProviderError::new(operation, kind, message);

		if let Some(code) = ctx.error_type {
			err = err.with_code(code);
		}
		if let Some(status) = meta.status {
			err = err.with_status(status);
		}
		if let Some(retry_after) = meta.retry_after {
			err = err.with_retry_after(retry_after);
		}

		err
	}
}
impl Debug for CognitoHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CognitoHttpClient")
			.field("endpoint", &self.endpoint.as_str())
			.field("signed", &self.signer.is_some())
			.finish()
	}
}
impl IdentityProvider for CognitoHttpClient {
	fn initiate_auth<'a>(
		&'a self,
		request: &'a InitiateAuthRequest,
	) -> ProviderFuture<'a, AuthResponse> {
		Box::pin(async move {
			let operation = ProviderOperation::InitiateAuth;
			let body = WireInitiateAuth {
				user_pool_id: &request.pool_id,
				client_id: &request.client_id,
				auth_flow: request.grant.flow().as_str(),
				auth_parameters: request.grant.parameters(),
			};
			let bytes = self.call(operation, &body).await?;

			decode::<WireAuthResponse>(operation, &bytes).map(WireAuthResponse::into_response)
		})
	}

	fn respond_to_challenge<'a>(
		&'a self,
		request: &'a ChallengeResponseRequest,
	) -> ProviderFuture<'a, AuthResponse> {
		Box::pin(async move {
			let operation = ProviderOperation::RespondToChallenge;
			let challenge = request.challenge();
			let body = WireRespondToChallenge {
				user_pool_id: &request.pool_id,
				client_id: &request.client_id,
				challenge_name: challenge.name().unwrap_or_default(),
				challenge_responses: request.responses(),
				session: request.session.expose(),
			};
			let bytes = self.call(operation, &body).await?;

			decode::<WireAuthResponse>(operation, &bytes).map(WireAuthResponse::into_response)
		})
	}

	fn get_user<'a>(&'a self, access_token: &'a TokenSecret) -> ProviderFuture<'a, UserInfo> {
		Box::pin(async move {
			let operation = ProviderOperation::GetUser;
			let body = WireGetUser { access_token: access_token.expose() };
			let bytes = self.call(operation, &body).await?;
			let user = decode::<WireUser>(operation, &bytes)?;

			Ok(UserInfo {
				username: user.username,
				attributes: user
					.user_attributes
					.into_iter()
					.map(|attribute| (attribute.name, attribute.value))
					.collect(),
			})
		})
	}

	fn create_user<'a>(&'a self, request: &'a CreateUserRequest) -> ProviderFuture<'a, ()> {
		Box::pin(async move {
			let body = WireCreateUser {
				user_pool_id: &request.pool_id,
				username: &request.username,
				user_attributes: &request.attributes,
				desired_delivery_mediums: [request.delivery_medium.as_str()],
				force_alias_creation: false,
			};

			self.call(ProviderOperation::CreateUser, &body).await.map(|_| ())
		})
	}
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireInitiateAuth<'a> {
	user_pool_id: &'a str,
	client_id: &'a str,
	auth_flow: &'static str,
	auth_parameters: BTreeMap<&'static str, &'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireRespondToChallenge<'a> {
	user_pool_id: &'a str,
	client_id: &'a str,
	challenge_name: &'a str,
	challenge_responses: BTreeMap<&'static str, &'a str>,
	session: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireGetUser<'a> {
	access_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireCreateUser<'a> {
	user_pool_id: &'a str,
	username: &'a str,
	user_attributes: &'a [UserAttribute],
	desired_delivery_mediums: [&'static str; 1],
	force_alias_creation: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAuthResponse {
	#[serde(default)]
	challenge_name: Option<String>,
	#[serde(default)]
	session: Option<String>,
	#[serde(default)]
	authentication_result: Option<WireAuthenticationResult>,
}
impl WireAuthResponse {
	fn into_response(self) -> AuthResponse {
		AuthResponse {
			challenge: ChallengeState::from_name(self.challenge_name.as_deref()),
			session: self.session.filter(|session| !session.is_empty()).map(TokenSecret::from),
			credentials: self.authentication_result.and_then(WireAuthenticationResult::into_pair),
		}
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAuthenticationResult {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	id_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
}
impl WireAuthenticationResult {
	fn into_pair(self) -> Option<CredentialPair> {
		let access_token = self.access_token.filter(|token| !token.is_empty())?;
		let mut pair = CredentialPair::new(access_token);

		if let Some(refresh_token) = self.refresh_token {
			pair = pair.with_refresh_token(refresh_token);
		}
		if let Some(id_token) = self.id_token {
			pair = pair.with_id_token(id_token);
		}
		if let Some(secs) = self.expires_in {
			pair = pair.with_expires_in(Duration::seconds(secs));
		}

		Some(pair)
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireUser {
	username: String,
	#[serde(default)]
	user_attributes: Vec<UserAttribute>,
}

#[derive(Default, Deserialize)]
struct WireError {
	#[serde(rename = "__type", default)]
	error_type: Option<String>,
	#[serde(alias = "Message", default)]
	message: Option<String>,
}

fn decode<T>(operation: ProviderOperation, bytes: &[u8]) -> Result<T, ProviderError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut de).map_err(|e| {
		let path = e.path().to_string();

		ProviderError::new(
			operation,
			ProviderErrorKind::Unexpected,
			format!("Identity provider response is malformed at `{path}`."),
		)
		.with_source(e.into_inner())
	})
}

fn parse_retry_after(headers: &HeaderMap) -> Option<StdDuration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(StdDuration::from_secs(secs));
	}
	// HTTP dates name GMT; parse it as a numeric offset.
	let normalized = match raw.strip_suffix(" GMT") {
		Some(stem) => format!("{stem} +0000"),
		None => raw.to_owned(),
	};

	if let Ok(moment) = OffsetDateTime::parse(&normalized, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return StdDuration::try_from(delta).ok();
		}
	}

	None
}
