//! Request-handling boundary: parameters and cookies in, one status token out.
//!
//! Each externally visible operation is a unit type implementing [`Operation`]. A single
//! generic [`Handler`] runs any operation under a per-request deadline and turns classified
//! failures into status replies, so a rejected password reads `NO_SUCH_USER` instead of
//! failing the request. Only fatal failures (protocol violations, unclassified provider
//! errors, exhausted retries, the deadline) surface as [`Error`].

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, Password, Username},
	error::ValidationError,
	flows::{AuthStep, SessionCarriers, SessionGateway},
	obs::event,
};

/// Email address parameter; doubles as the username.
pub const EMAIL: &str = "EMAIL";
/// Password parameter (permanent password).
pub const PASSWORD: &str = "PASSWORD";
/// Temporary password parameter used by sign-up confirmation.
pub const TEMPORARY_PASSWORD: &str = "TEMPORARY_PASSWORD";
/// Access-token cookie.
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
/// Refresh-token cookie.
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";

/// Default per-request deadline.
pub const DEFAULT_DEADLINE: StdDuration = StdDuration::from_secs(10);

/// Boxed future returned by [`Operation::execute`].
pub type OperationFuture<'a> = Pin<Box<dyn Future<Output = Result<Reply>> + 'a + Send>>;

/// Parameters and cookies of one inbound request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InboundRequest {
	params: BTreeMap<String, String>,
	cookies: BTreeMap<String, String>,
}
impl InboundRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Adds a cookie.
	pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.cookies.insert(name.into(), value.into());

		self
	}

	/// Adds every cookie from a `Cookie` header value (`a=1; b=2`).
	pub fn with_cookie_header(mut self, header: &str) -> Self {
		for pair in header.split(';') {
			if let Some((name, value)) = pair.split_once('=') {
				let name = name.trim();

				if !name.is_empty() {
					self.cookies.insert(name.to_owned(), value.trim().trim_matches('"').to_owned());
				}
			}
		}

		self
	}

	/// Builds a request from a `Cookie` header value.
	pub fn from_cookie_header(header: &str) -> Self {
		Self::new().with_cookie_header(header)
	}

	/// Returns a parameter value.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns a cookie value.
	pub fn cookie(&self, name: &str) -> Option<&str> {
		self.cookies.get(name).map(String::as_str)
	}

	fn username(&self) -> Result<Username, ValidationError> {
		let value = self
			.param(EMAIL)
			.map(str::trim)
			.filter(|value| !value.is_empty())
			.ok_or(ValidationError::MissingField { field: EMAIL })?;

		Ok(Username::new(value)?)
	}

	fn password(&self, field: &'static str) -> Result<Password, ValidationError> {
		Password::new(field, self.param(field).unwrap_or_default())
	}

	fn carriers(&self) -> SessionCarriers {
		SessionCarriers::new(self.cookie(ACCESS_TOKEN), self.cookie(REFRESH_TOKEN))
	}
}

/// Plain-text status token returned to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusMessage {
	/// No valid session.
	NotLoggedIn,
	/// Valid session; credentials may accompany the reply.
	LoggedIn,
	/// A required parameter is missing or malformed.
	InvalidRequest,
	/// Wrong password or unknown user.
	NoSuchUser,
	/// Sign-up collided with an existing user.
	UserAlreadyExists,
	/// Sign-up succeeded; a temporary password was emailed.
	UserCreated,
	/// The user must confirm sign-up with a permanent password.
	ForcePasswordChange,
	/// The new password was rejected by the pool policy.
	InvalidPassword,
}
impl StatusMessage {
	/// Returns the wire token.
	pub const fn as_str(self) -> &'static str {
		match self {
			StatusMessage::NotLoggedIn => "NOT_LOGGED_IN",
			StatusMessage::LoggedIn => "LOGGED_IN",
			StatusMessage::InvalidRequest => "INVALID_REQUEST",
			StatusMessage::NoSuchUser => "NO_SUCH_USER",
			StatusMessage::UserAlreadyExists => "USER_ALREADY_EXISTS",
			StatusMessage::UserCreated => "USER_CREATED",
			StatusMessage::ForcePasswordChange => "FORCE_PASSWORD_CHANGE",
			StatusMessage::InvalidPassword => "INVALID_PASSWORD",
		}
	}
}
impl Display for StatusMessage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Status token plus the credentials to (re-)issue as cookies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
	/// Status token.
	pub status: StatusMessage,
	/// Credentials to hand back to the client.
	pub credentials: Option<CredentialPair>,
}
impl Reply {
	/// Reply without credentials.
	pub fn status(status: StatusMessage) -> Self {
		Self { status, credentials: None }
	}

	/// `LOGGED_IN` reply carrying credentials.
	pub fn logged_in(credentials: CredentialPair) -> Self {
		Self { status: StatusMessage::LoggedIn, credentials: Some(credentials) }
	}

	/// `Set-Cookie` header values for the carried credentials.
	///
	/// The refresh-token cookie is only emitted when the credentials include one.
	pub fn set_cookie_headers(&self) -> Vec<String> {
		let Some(credentials) = &self.credentials else {
			return Vec::new();
		};
		let mut headers = vec![set_cookie(ACCESS_TOKEN, credentials.access_token.expose())];

		if let Some(refresh_token) = credentials.refresh_token() {
			headers.push(set_cookie(REFRESH_TOKEN, refresh_token.expose()));
		}

		headers
	}
}

fn set_cookie(name: &str, value: &str) -> String {
	format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax")
}

/// One externally visible operation.
pub trait Operation
where
	Self: Send + Sync,
{
	/// Stable name used in logs.
	const NAME: &'static str;

	/// Runs the operation. Classified failures are returned as errors and turned into status
	/// replies by [`Handler`].
	fn execute<'a>(
		&'a self,
		gateway: &'a SessionGateway,
		request: &'a InboundRequest,
	) -> OperationFuture<'a>;
}

/// `EMAIL` → `USER_CREATED`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignUp;
impl Operation for SignUp {
	const NAME: &'static str = "sign_up";

	fn execute<'a>(
		&'a self,
		gateway: &'a SessionGateway,
		request: &'a InboundRequest,
	) -> OperationFuture<'a> {
		Box::pin(async move {
			let username = request.username()?;

			gateway.sign_up(&username).await?;

			Ok(Reply::status(StatusMessage::UserCreated))
		})
	}
}

/// `EMAIL`, `TEMPORARY_PASSWORD`, `PASSWORD` → `LOGGED_IN`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfirmSignUp;
impl Operation for ConfirmSignUp {
	const NAME: &'static str = "confirm_sign_up";

	fn execute<'a>(
		&'a self,
		gateway: &'a SessionGateway,
		request: &'a InboundRequest,
	) -> OperationFuture<'a> {
		Box::pin(async move {
			let username = request.username()?;
			let temporary = request.password(TEMPORARY_PASSWORD)?;
			let new_password = request.password(PASSWORD)?;
			let pair = gateway.confirm_sign_up(&username, &temporary, &new_password).await?;

			Ok(Reply::logged_in(pair))
		})
	}
}

/// `EMAIL`, `PASSWORD` → `LOGGED_IN` or `FORCE_PASSWORD_CHANGE`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignIn;
impl Operation for SignIn {
	const NAME: &'static str = "sign_in";

	fn execute<'a>(
		&'a self,
		gateway: &'a SessionGateway,
		request: &'a InboundRequest,
	) -> OperationFuture<'a> {
		Box::pin(async move {
			let username = request.username()?;
			let password = request.password(PASSWORD)?;

			match gateway.sign_in(&username, &password).await? {
				AuthStep::Authenticated(pair) => Ok(Reply::logged_in(pair)),
				AuthStep::AwaitingNewPassword(_) =>
					Ok(Reply::status(StatusMessage::ForcePasswordChange)),
			}
		})
	}
}

/// Cookies → `LOGGED_IN` or `NOT_LOGGED_IN`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validate;
impl Operation for Validate {
	const NAME: &'static str = "validate";

	fn execute<'a>(
		&'a self,
		gateway: &'a SessionGateway,
		request: &'a InboundRequest,
	) -> OperationFuture<'a> {
		Box::pin(async move {
			let validation = gateway.validate_session(&request.carriers()).await;

			if !validation.is_authenticated() {
				return Ok(Reply::status(StatusMessage::NotLoggedIn));
			}

			Ok(match validation.reissue() {
				Some(pair) => Reply::logged_in(pair.clone()),
				None => Reply::status(StatusMessage::LoggedIn),
			})
		})
	}
}

/// Runs an [`Operation`] against a shared gateway under a deadline.
#[derive(Clone, Debug)]
pub struct Handler<O> {
	gateway: Arc<SessionGateway>,
	operation: O,
	deadline: StdDuration,
}
impl<O> Handler<O>
where
	O: Operation,
{
	/// Creates a handler with the default deadline.
	pub fn new(gateway: Arc<SessionGateway>, operation: O) -> Self {
		Self { gateway, operation, deadline: DEFAULT_DEADLINE }
	}

	/// Overrides the per-request deadline.
	pub fn with_deadline(mut self, deadline: StdDuration) -> Self {
		self.deadline = deadline;

		self
	}

	/// Per-request deadline.
	pub fn deadline(&self) -> StdDuration {
		self.deadline
	}

	/// Handles one request.
	///
	/// Classified failures become status replies; fatal failures are returned.
	pub async fn handle(&self, request: &InboundRequest) -> Result<Reply> {
		let outcome =
			tokio::time::timeout(self.deadline, self.operation.execute(&self.gateway, request))
				.await
				.map_err(|_| Error::DeadlineExceeded(self.deadline))
				.and_then(|result| result);

		match outcome {
			Ok(reply) => Ok(reply),
			Err(e) => match e.status_message() {
				Some(status) => {
					event!(
						debug,
						operation = O::NAME,
						status = status.as_str(),
						"Request was refused."
					);

					Ok(Reply::status(status))
				},
				None => {
					event!(error, operation = O::NAME, error = %e, "Request failed.");

					Err(e)
				},
			},
		}
	}
}
