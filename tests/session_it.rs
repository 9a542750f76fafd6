#![cfg(feature = "reqwest")]

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use cognito_session::{
	auth::{ClientId, PoolId},
	cache::CredentialsCache,
	endpoint::{
		ACCESS_TOKEN, ConfirmSignUp, EMAIL, Handler, InboundRequest, Operation, PASSWORD,
		REFRESH_TOKEN, SignIn, SignUp, StatusMessage, TEMPORARY_PASSWORD, Validate,
	},
	error::Error,
	flows::SessionGateway,
	http::CognitoHttpClient,
	provider::{AMZ_JSON_CONTENT_TYPE, PoolDescriptor},
	retry::RetryPolicy,
	url::Url,
};

const POOL: &str = "us-east-1_AbCdEf";
const CLIENT: &str = "client-1";
const USER: &str = "someone@example.com";
const INITIATE: &str = "AWSCognitoIdentityProviderService.AdminInitiateAuth";
const RESPOND: &str = "AWSCognitoIdentityProviderService.AdminRespondToAuthChallenge";
const GET_USER: &str = "AWSCognitoIdentityProviderService.GetUser";
const CREATE_USER: &str = "AWSCognitoIdentityProviderService.AdminCreateUser";

struct Harness {
	gateway: Arc<SessionGateway>,
	cache: Arc<CredentialsCache>,
}
impl Harness {
	fn new(server: &MockServer) -> Self {
		let endpoint = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
		let descriptor = PoolDescriptor::builder(
			PoolId::new(POOL).expect("Pool fixture should be valid."),
			ClientId::new(CLIENT).expect("Client fixture should be valid."),
		)
		.endpoint(endpoint.clone())
		.build()
		.expect("Loopback descriptors should be accepted.");
		let provider = CognitoHttpClient::new(endpoint).expect("HTTP client should build.");
		let cache = Arc::new(CredentialsCache::new(16));
		let retry =
			RetryPolicy::default().with_max_attempts(3).with_backoff(StdDuration::from_millis(1));
		let gateway = SessionGateway::new(Arc::new(provider), descriptor, cache.clone())
			.with_retry_policy(retry);

		Self { gateway: Arc::new(gateway), cache }
	}

	fn handler<O>(&self, operation: O) -> Handler<O>
	where
		O: Operation,
	{
		Handler::new(self.gateway.clone(), operation)
	}
}

fn sign_in_request(password: &str) -> InboundRequest {
	InboundRequest::new().with_param(EMAIL, USER).with_param(PASSWORD, password)
}

#[tokio::test]
async fn sign_in_caches_the_access_token_and_validation_skips_the_provider() {
	let server = MockServer::start_async().await;
	let initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(200).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"AuthenticationResult\":{\"AccessToken\":\"access-1\",\"RefreshToken\":\"refresh-1\",\"ExpiresIn\":3600}}",
			);
		})
		.await;
	let get_user = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", GET_USER);
			then.status(200)
				.header("content-type", AMZ_JSON_CONTENT_TYPE)
				.body("{\"Username\":\"someone\"}");
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(SignIn)
		.handle(&sign_in_request("Secret-1"))
		.await
		.expect("Sign-in should produce a reply.");

	assert_eq!(reply.status, StatusMessage::LoggedIn);
	assert_eq!(reply.set_cookie_headers(), vec![
		"ACCESS_TOKEN=access-1; Path=/; HttpOnly; SameSite=Lax".to_owned(),
		"REFRESH_TOKEN=refresh-1; Path=/; HttpOnly; SameSite=Lax".to_owned(),
	]);
	assert!(harness.cache.check_token("access-1"));

	let validation = harness
		.handler(Validate)
		.handle(&InboundRequest::new().with_cookie(ACCESS_TOKEN, "access-1"))
		.await
		.expect("Validation should produce a reply.");

	assert_eq!(validation.status, StatusMessage::LoggedIn);
	assert!(validation.credentials.is_none());

	initiate.assert_async().await;
	get_user.assert_calls_async(0).await;
}

#[tokio::test]
async fn provider_validation_populates_the_cache() {
	let server = MockServer::start_async().await;
	let get_user = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("x-amz-target", GET_USER)
				.json_body(json!({ "AccessToken": "access-9" }));
			then.status(200)
				.header("content-type", AMZ_JSON_CONTENT_TYPE)
				.body("{\"Username\":\"someone\"}");
		})
		.await;
	let harness = Harness::new(&server);
	let request = InboundRequest::from_cookie_header("ACCESS_TOKEN=access-9");

	for _ in 0..3 {
		let reply =
			harness.handler(Validate).handle(&request).await.expect("Validation should reply.");

		assert_eq!(reply.status, StatusMessage::LoggedIn);
	}

	get_user.assert_calls_async(1).await;

	assert_eq!(harness.gateway.validation_metrics.cache_hits(), 2);
	assert_eq!(harness.gateway.validation_metrics.provider_validations(), 1);
}

#[tokio::test]
async fn expired_sessions_are_refreshed_and_reissued() {
	let server = MockServer::start_async().await;
	let get_user = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", GET_USER);
			then.status(400).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"__type\":\"NotAuthorizedException\",\"message\":\"Access Token has expired\"}",
			);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE).json_body(json!({
				"UserPoolId": POOL,
				"ClientId": CLIENT,
				"AuthFlow": "REFRESH_TOKEN",
				"AuthParameters": { "REFRESH_TOKEN": "refresh-1" },
			}));
			then.status(200).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"AuthenticationResult\":{\"AccessToken\":\"access-2\",\"ExpiresIn\":3600}}",
			);
		})
		.await;
	let harness = Harness::new(&server);
	let request = InboundRequest::new()
		.with_cookie(ACCESS_TOKEN, "access-1")
		.with_cookie(REFRESH_TOKEN, "refresh-1");
	let reply = harness.handler(Validate).handle(&request).await.expect("Validation should reply.");

	get_user.assert_async().await;
	refresh.assert_async().await;

	assert_eq!(reply.status, StatusMessage::LoggedIn);
	assert_eq!(reply.set_cookie_headers(), vec![
		"ACCESS_TOKEN=access-2; Path=/; HttpOnly; SameSite=Lax".to_owned()
	]);
	assert!(harness.cache.check_token("access-2"));
	assert!(!harness.cache.check_token("access-1"));
}

#[tokio::test]
async fn expired_sessions_without_refresh_tokens_are_not_logged_in() {
	let server = MockServer::start_async().await;
	let _get_user = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", GET_USER);
			then.status(400).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"__type\":\"NotAuthorizedException\",\"message\":\"Access Token has expired\"}",
			);
		})
		.await;
	let initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(500);
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(Validate)
		.handle(&InboundRequest::new().with_cookie(ACCESS_TOKEN, "access-1"))
		.await
		.expect("Validation should reply.");

	assert_eq!(reply.status, StatusMessage::NotLoggedIn);
	assert!(reply.set_cookie_headers().is_empty());

	initiate.assert_calls_async(0).await;
}

#[tokio::test]
async fn throttling_beyond_the_retry_bound_is_reported() {
	let server = MockServer::start_async().await;
	let initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(400)
				.header("content-type", AMZ_JSON_CONTENT_TYPE)
				.body("{\"__type\":\"TooManyRequestsException\",\"message\":\"Rate exceeded\"}");
		})
		.await;
	let harness = Harness::new(&server);
	let err = harness
		.handler(SignIn)
		.handle(&sign_in_request("Secret-1"))
		.await
		.expect_err("Exhausted retries should fail the request.");

	initiate.assert_calls_async(3).await;

	assert!(matches!(err, Error::RateLimited { attempts: 3, .. }), "Unexpected error: {err:?}");
	assert_eq!(err.http_status(), 503);
}

#[tokio::test]
async fn blank_passwords_never_reach_the_provider() {
	let server = MockServer::start_async().await;
	let any_call = server
		.mock_async(|when, then| {
			when.method(POST).path("/");
			then.status(500);
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(SignIn)
		.handle(&sign_in_request("   "))
		.await
		.expect("Blank passwords should produce a status reply.");

	assert_eq!(reply.status, StatusMessage::InvalidRequest);

	any_call.assert_calls_async(0).await;
}

#[tokio::test]
async fn wrong_passwords_read_no_such_user() {
	let server = MockServer::start_async().await;
	let _initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(400).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"__type\":\"NotAuthorizedException\",\"message\":\"Incorrect username or password.\"}",
			);
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(SignIn)
		.handle(&sign_in_request("Wrong-1"))
		.await
		.expect("Rejected credentials should produce a status reply.");

	assert_eq!(reply.status, StatusMessage::NoSuchUser);
	assert!(harness.cache.is_empty());
}

#[tokio::test]
async fn new_password_challenges_force_a_password_change() {
	let server = MockServer::start_async().await;
	let _initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(200).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"ChallengeName\":\"NEW_PASSWORD_REQUIRED\",\"Session\":\"session-1\"}",
			);
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(SignIn)
		.handle(&sign_in_request("Temp-1"))
		.await
		.expect("Challenges should produce a status reply.");

	assert_eq!(reply.status, StatusMessage::ForcePasswordChange);
	assert!(reply.credentials.is_none());
}

#[tokio::test]
async fn sign_up_then_confirm_logs_the_user_in() {
	let server = MockServer::start_async().await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", CREATE_USER);
			then.status(200)
				.header("content-type", AMZ_JSON_CONTENT_TYPE)
				.body("{\"User\":{\"Username\":\"someone@example.com\"}}");
		})
		.await;
	let initiate = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", INITIATE);
			then.status(200).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"ChallengeName\":\"NEW_PASSWORD_REQUIRED\",\"Session\":\"session-1\"}",
			);
		})
		.await;
	let respond = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", RESPOND).json_body(json!({
				"UserPoolId": POOL,
				"ClientId": CLIENT,
				"ChallengeName": "NEW_PASSWORD_REQUIRED",
				"ChallengeResponses": {
					"USERNAME": USER,
					"PASSWORD": "Temp-1",
					"NEW_PASSWORD": "Permanent-1",
				},
				"Session": "session-1",
			}));
			then.status(200).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"AuthenticationResult\":{\"AccessToken\":\"access-3\",\"RefreshToken\":\"refresh-3\"}}",
			);
		})
		.await;
	let harness = Harness::new(&server);
	let created = harness
		.handler(SignUp)
		.handle(&InboundRequest::new().with_param(EMAIL, USER))
		.await
		.expect("Sign-up should reply.");

	assert_eq!(created.status, StatusMessage::UserCreated);

	let confirmed = harness
		.handler(ConfirmSignUp)
		.handle(
			&InboundRequest::new()
				.with_param(EMAIL, USER)
				.with_param(TEMPORARY_PASSWORD, "Temp-1")
				.with_param(PASSWORD, "Permanent-1"),
		)
		.await
		.expect("Confirmation should reply.");

	create.assert_async().await;
	initiate.assert_async().await;
	respond.assert_async().await;

	assert_eq!(confirmed.status, StatusMessage::LoggedIn);
	assert!(harness.cache.check_token("access-3"));
}

#[tokio::test]
async fn duplicate_sign_ups_read_user_already_exists() {
	let server = MockServer::start_async().await;
	let _create = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", CREATE_USER);
			then.status(400).header("content-type", AMZ_JSON_CONTENT_TYPE).body(
				"{\"__type\":\"UsernameExistsException\",\"message\":\"User account already exists\"}",
			);
		})
		.await;
	let harness = Harness::new(&server);
	let reply = harness
		.handler(SignUp)
		.handle(&InboundRequest::new().with_param(EMAIL, USER))
		.await
		.expect("Duplicate sign-ups should produce a status reply.");

	assert_eq!(reply.status, StatusMessage::UserAlreadyExists);
}

#[tokio::test]
async fn slow_providers_hit_the_deadline() {
	let server = MockServer::start_async().await;
	let _get_user = server
		.mock_async(|when, then| {
			when.method(POST).path("/").header("x-amz-target", GET_USER);
			then.status(200)
				.header("content-type", AMZ_JSON_CONTENT_TYPE)
				.body("{\"Username\":\"someone\"}")
				.delay(StdDuration::from_millis(500));
		})
		.await;
	let harness = Harness::new(&server);
	let err = harness
		.handler(Validate)
		.with_deadline(StdDuration::from_millis(50))
		.handle(&InboundRequest::new().with_cookie(ACCESS_TOKEN, "access-1"))
		.await
		.expect_err("Slow providers should exceed the deadline.");

	assert!(matches!(err, Error::DeadlineExceeded(_)));
	assert_eq!(err.http_status(), 504);
}
