//! axum surface over the endpoint handlers.
//!
//! `POST /signup`, `POST /confirm-signup`, and `POST /signin` take form-encoded parameters;
//! `GET /validate` reads cookies. Every answer is the status token as `text/plain` with
//! HTTP 200, plus `Set-Cookie` headers when credentials are issued. Fatal failures map to
//! 500, 503 or 504 with an empty body.

// crates.io
use axum::{
	Form, Router,
	extract::State,
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{COOKIE, SET_COOKIE},
	},
	response::{IntoResponse, Response},
	routing::{get, post},
};
// self
use crate::{
	_prelude::*,
	endpoint::{
		ConfirmSignUp, Handler, InboundRequest, Operation, Reply, SignIn, SignUp, Validate,
	},
	flows::SessionGateway,
	obs::event,
};

#[derive(Clone, Debug)]
struct Handlers {
	sign_up: Handler<SignUp>,
	confirm_sign_up: Handler<ConfirmSignUp>,
	sign_in: Handler<SignIn>,
	validate: Handler<Validate>,
}

/// Builds the router; every handler shares `gateway` and runs under `deadline`.
pub fn router(gateway: Arc<SessionGateway>, deadline: StdDuration) -> Router {
	let handlers = Arc::new(Handlers {
		sign_up: Handler::new(gateway.clone(), SignUp).with_deadline(deadline),
		confirm_sign_up: Handler::new(gateway.clone(), ConfirmSignUp).with_deadline(deadline),
		sign_in: Handler::new(gateway.clone(), SignIn).with_deadline(deadline),
		validate: Handler::new(gateway, Validate).with_deadline(deadline),
	});

	Router::new()
		.route("/signup", post(sign_up))
		.route("/confirm-signup", post(confirm_sign_up))
		.route("/signin", post(sign_in))
		.route("/validate", get(validate))
		.with_state(handlers)
}

async fn sign_up(
	State(handlers): State<Arc<Handlers>>,
	Form(params): Form<HashMap<String, String>>,
) -> Response {
	respond(&handlers.sign_up, from_params(params)).await
}

async fn confirm_sign_up(
	State(handlers): State<Arc<Handlers>>,
	Form(params): Form<HashMap<String, String>>,
) -> Response {
	respond(&handlers.confirm_sign_up, from_params(params)).await
}

async fn sign_in(
	State(handlers): State<Arc<Handlers>>,
	Form(params): Form<HashMap<String, String>>,
) -> Response {
	respond(&handlers.sign_in, from_params(params)).await
}

async fn validate(State(handlers): State<Arc<Handlers>>, headers: HeaderMap) -> Response {
	let request = headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.fold(InboundRequest::new(), InboundRequest::with_cookie_header);

	respond(&handlers.validate, request).await
}

fn from_params(params: HashMap<String, String>) -> InboundRequest {
	params.into_iter().fold(InboundRequest::new(), |request, (name, value)| {
		request.with_param(name, value)
	})
}

async fn respond<O>(handler: &Handler<O>, request: InboundRequest) -> Response
where
	O: Operation,
{
	match handler.handle(&request).await {
		Ok(reply) => reply_response(&reply),
		Err(e) => StatusCode::from_u16(e.http_status())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			.into_response(),
	}
}

fn reply_response(reply: &Reply) -> Response {
	let mut headers = HeaderMap::new();

	for cookie in reply.set_cookie_headers() {
		match HeaderValue::from_str(&cookie) {
			Ok(value) => {
				headers.append(SET_COOKIE, value);
			},
			Err(_) => {
				event!(error, "Issued token is not a valid cookie value.");

				return StatusCode::INTERNAL_SERVER_ERROR.into_response();
			},
		}
	}

	(StatusCode::OK, headers, reply.status.as_str()).into_response()
}
