//! Gateway-level error types shared across flows, providers, and the endpoint layer.

// self
use crate::{
	_prelude::*, auth::IdentifierError, endpoint::StatusMessage, provider::ProviderError,
};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// Every provider failure is mapped to exactly one variant at the boundary of the
/// operation that observed it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Request was missing required input; no remote call was made.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Bad secret or unknown identity. The two cases are deliberately not distinguished.
	#[error("Credentials were rejected: {reason}.")]
	CredentialsInvalid {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The new permanent secret does not satisfy the pool's password policy.
	#[error("New password was rejected: {reason}.")]
	PolicyViolation {
		/// Provider-supplied reason string.
		reason: String,
	},
	/// The identity already exists.
	#[error("User `{username}` already exists.")]
	Conflict {
		/// Username that collided.
		username: String,
	},
	/// The provider kept throttling the operation until the retry budget ran out.
	#[error("Identity provider throttled {operation} after {attempts} attempts.")]
	RateLimited {
		/// Provider operation label.
		operation: &'static str,
		/// Attempts made before giving up.
		attempts: u32,
	},
	/// The provider answered outside the authentication protocol.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
	/// Provider failure that has no user-facing classification.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The per-request deadline elapsed before the operation finished.
	#[error("Request did not finish within {0:?}.")]
	DeadlineExceeded(StdDuration),
}
impl Error {
	/// Returns the user-visible status for classified failures.
	///
	/// Fatal failures return `None` and must fail the request as a whole.
	pub fn status_message(&self) -> Option<StatusMessage> {
		match self {
			Self::Validation(_) => Some(StatusMessage::InvalidRequest),
			Self::CredentialsInvalid { .. } => Some(StatusMessage::NoSuchUser),
			Self::PolicyViolation { .. } => Some(StatusMessage::InvalidPassword),
			Self::Conflict { .. } => Some(StatusMessage::UserAlreadyExists),
			Self::RateLimited { .. }
			| Self::Protocol(_)
			| Self::Provider(_)
			| Self::Config(_)
			| Self::DeadlineExceeded(_) => None,
		}
	}

	/// HTTP status code used when the error fails the request.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::RateLimited { .. } => 503,
			Self::DeadlineExceeded(_) => 504,
			_ if self.status_message().is_some() => 200,
			_ => 500,
		}
	}
}

/// Input validation failures raised before any remote call.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required field was absent or blank.
	#[error("Required field `{field}` is missing or blank.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// A field was present but is not a valid identifier.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
}

/// Responses that violate the authentication protocol.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProtocolError {
	/// The provider issued a challenge the current stage cannot answer.
	#[error("Unexpected challenge during {stage}: {challenge}.")]
	UnexpectedChallenge {
		/// Stage of the exchange that observed the challenge.
		stage: &'static str,
		/// Challenge name as reported by the provider (`<none>` when absent).
		challenge: String,
	},
	/// The provider reported success without an authentication result.
	#[error("Provider omitted the authentication result during {stage}.")]
	MissingAuthenticationResult {
		/// Stage of the exchange that observed the omission.
		stage: &'static str,
	},
	/// The provider issued a challenge without a session to answer it with.
	#[error("Provider omitted the challenge session during {stage}.")]
	MissingSession {
		/// Stage of the exchange that observed the omission.
		stage: &'static str,
	},
}

/// Configuration and validation failures raised by the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Pool descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::PoolDescriptorError),
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`.")]
	Parse {
		/// JSON path of the offending value.
		path: String,
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
	/// Configuration file could not be read.
	#[error("Configuration file {path} could not be read.")]
	Read {
		/// File that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: e.into_inner() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::{ProviderErrorKind, ProviderOperation};

	#[test]
	fn classified_errors_carry_status_messages() {
		let validation: Error = ValidationError::MissingField { field: "PASSWORD" }.into();
		let invalid = Error::CredentialsInvalid { reason: "Incorrect username or password".into() };
		let policy = Error::PolicyViolation { reason: "too short".into() };
		let conflict = Error::Conflict { username: "someone@example.com".into() };

		assert_eq!(validation.status_message(), Some(StatusMessage::InvalidRequest));
		assert_eq!(invalid.status_message(), Some(StatusMessage::NoSuchUser));
		assert_eq!(policy.status_message(), Some(StatusMessage::InvalidPassword));
		assert_eq!(conflict.status_message(), Some(StatusMessage::UserAlreadyExists));
		assert_eq!(conflict.http_status(), 200);
	}

	#[test]
	fn fatal_errors_fail_the_request() {
		let protocol: Error = ProtocolError::UnexpectedChallenge {
			stage: "sign_in",
			challenge: "SMS_MFA".into(),
		}
		.into();
		let provider: Error = ProviderError::new(
			ProviderOperation::GetUser,
			ProviderErrorKind::Unexpected,
			"boom",
		)
		.into();
		let throttled = Error::RateLimited { operation: "GetUser", attempts: 5 };
		let deadline = Error::DeadlineExceeded(StdDuration::from_secs(1));

		assert_eq!(protocol.status_message(), None);
		assert_eq!(protocol.http_status(), 500);
		assert_eq!(provider.http_status(), 500);
		assert_eq!(throttled.http_status(), 503);
		assert_eq!(deadline.http_status(), 504);
		assert!(protocol.to_string().contains("SMS_MFA"));
	}

	#[test]
	fn parse_errors_report_json_path() {
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Doc {
			cache: Inner,
		}
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Inner {
			capacity: usize,
		}

		let mut de = serde_json::Deserializer::from_str(r#"{"cache":{"capacity":"many"}}"#);
		let err = serde_path_to_error::deserialize::<_, Doc>(&mut de)
			.expect_err("String capacity should fail to parse.");
		let config_error = ConfigError::from(err);

		assert!(matches!(
			&config_error,
			ConfigError::Parse { path, .. } if path == "cache.capacity"
		));
	}
}
