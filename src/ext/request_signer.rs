//! Request signing hook applied by transports right before dispatch.

// self
use crate::{
	_prelude::*,
	provider::{AMZ_JSON_CONTENT_TYPE, ProviderOperation},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outbound provider call exposed to a [`RequestSigner`].
///
/// Header names are lowercase. The body is the exact byte sequence that will be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignableRequest {
	/// Call being signed.
	pub operation: ProviderOperation,
	/// Target URL.
	pub url: Url,
	/// Headers that will be sent; signers may add to them.
	pub headers: BTreeMap<String, String>,
	/// Serialized JSON body.
	pub body: Vec<u8>,
}
impl SignableRequest {
	/// Creates a request with the protocol headers for `operation`.
	pub fn new(operation: ProviderOperation, url: Url, body: Vec<u8>) -> Self {
		let headers = BTreeMap::from([
			("content-type".to_owned(), AMZ_JSON_CONTENT_TYPE.to_owned()),
			("x-amz-target".to_owned(), operation.target()),
		]);

		Self { operation, url, headers, body }
	}

	/// Sets (or replaces) a header, normalizing the name to lowercase.
	pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}
}

/// Signing failure reported by a [`RequestSigner`].
#[derive(Debug, ThisError)]
#[error("Request signing failed: {message}.")]
pub struct SignerError {
	/// Human-readable reason.
	pub message: String,
	/// Underlying failure, if any.
	#[source]
	pub source: Option<BoxError>,
}
impl SignerError {
	/// Creates an error with a message only.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), source: None }
	}

	/// Attaches the underlying failure.
	pub fn with_source(mut self, source: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(source));

		self
	}
}

/// Adds authentication material (e.g. AWS SigV4 headers) to outbound provider calls.
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Mutates the request in place; returning an error aborts the call.
	fn sign(&self, request: &mut SignableRequest) -> Result<(), SignerError>;
}
