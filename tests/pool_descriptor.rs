// std
use std::{fs, process};
// self
use cognito_session::{
	auth::{ClientId, PoolId},
	config::GatewayConfig,
	error::ConfigError,
	provider::{
		DefaultProviderStrategy, PoolDescriptor, PoolDescriptorError, ProviderErrorContext,
		ProviderErrorKind, ProviderOperation, ProviderStrategy,
	},
	url::Url,
};

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse descriptor URL.")
}

fn descriptor(pool: &str) -> Result<PoolDescriptor, PoolDescriptorError> {
	PoolDescriptor::builder(
		PoolId::new(pool).expect("Pool fixture should be valid."),
		ClientId::new("client-1").expect("Client fixture should be valid."),
	)
	.build()
}

#[test]
fn regional_endpoints_are_derived_from_the_pool() {
	let descriptor = descriptor("eu-west-2_Pool").expect("Regional pools should build.");

	assert_eq!(descriptor.region(), Some("eu-west-2"));
	assert_eq!(descriptor.endpoint, url("https://cognito-idp.eu-west-2.amazonaws.com/"));
}

#[test]
fn pools_without_a_region_need_an_explicit_endpoint() {
	let err = descriptor("Pool").expect_err("Region-less pools should be rejected.");

	assert!(matches!(err, PoolDescriptorError::MissingEndpoint { .. }));

	let descriptor = PoolDescriptor::builder(
		PoolId::new("Pool").expect("Pool fixture should be valid."),
		ClientId::new("client-1").expect("Client fixture should be valid."),
	)
	.endpoint(url("https://idp.internal.example/"))
	.build()
	.expect("Explicit endpoints should be accepted.");

	assert_eq!(descriptor.endpoint.host_str(), Some("idp.internal.example"));
}

#[test]
fn plain_http_is_limited_to_loopback() {
	let build = |endpoint: &str| {
		PoolDescriptor::builder(
			PoolId::new("us-east-1_Pool").expect("Pool fixture should be valid."),
			ClientId::new("client-1").expect("Client fixture should be valid."),
		)
		.endpoint(url(endpoint))
		.build()
	};

	assert!(build("http://127.0.0.1:9229/").is_ok());
	assert!(build("http://localhost:9229/").is_ok());
	assert!(build("http://[::1]:9229/").is_ok());
	assert!(matches!(
		build("http://cognito.example.com/"),
		Err(PoolDescriptorError::InsecureEndpoint { .. })
	));
}

#[derive(Debug)]
struct PoolLockStrategy;
impl ProviderStrategy for PoolLockStrategy {
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		match ctx.error_type.as_deref() {
			Some("PasswordResetRequiredException") => ProviderErrorKind::InvalidCredentials,
			_ => DefaultProviderStrategy.classify_error(ctx),
		}
	}
}

#[test]
fn custom_strategies_can_extend_the_default() {
	let reset = ProviderErrorContext::new(ProviderOperation::InitiateAuth)
		.with_http_status(400)
		.with_error_type("PasswordResetRequiredException");
	let throttled = ProviderErrorContext::new(ProviderOperation::InitiateAuth)
		.with_http_status(400)
		.with_error_type("LimitExceededException");

	assert_eq!(DefaultProviderStrategy.classify_error(&reset), ProviderErrorKind::Unexpected);
	assert_eq!(PoolLockStrategy.classify_error(&reset), ProviderErrorKind::InvalidCredentials);
	assert_eq!(PoolLockStrategy.classify_error(&throttled), ProviderErrorKind::RateLimited);
}

#[test]
fn gateway_config_loads_from_disk() {
	let path = std::env::temp_dir().join(format!("cognito-session-{}.json", process::id()));

	fs::write(
		&path,
		r#"{
			"pool": { "pool_id": "us-east-1_Pool", "client_id": "client-1" },
			"cache": { "capacity": 64, "timeout_secs": 60 },
			"request_deadline_ms": 2500
		}"#,
	)
	.expect("Config fixture should be writable.");

	let config = GatewayConfig::load(&path);

	fs::remove_file(&path).expect("Config fixture should be removable.");

	let config = config.expect("Config should load.");

	assert_eq!(config.pool.endpoint, url("https://cognito-idp.us-east-1.amazonaws.com/"));
	assert_eq!(config.cache.build().capacity(), 64);
	assert_eq!(config.request_deadline().as_millis(), 2500);
	assert_eq!(config.retry.max_attempts, 5);
}

#[test]
fn missing_config_files_are_read_errors() {
	let err = GatewayConfig::load("/nonexistent/cognito-session.json")
		.expect_err("Missing files should fail.");

	assert!(matches!(err, ConfigError::Read { .. }));
}
