// self
use crate::{
	_prelude::*,
	auth::{ClientId, PoolId},
	provider::PoolDescriptor,
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum PoolDescriptorError {
	/// No endpoint was supplied and none can be derived from the pool identifier.
	#[error("Missing endpoint and pool `{pool_id}` does not encode a region.")]
	MissingEndpoint {
		/// Pool identifier lacking a region prefix.
		pool_id: String,
	},
	/// Region prefix is not a plain region name (`[a-z0-9-]`).
	#[error("Region `{region}` is not a valid region name.")]
	InvalidRegion {
		/// Region that failed to produce a URL.
		region: String,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`PoolDescriptor`] values.
#[derive(Debug)]
pub struct PoolDescriptorBuilder {
	/// User pool being described.
	pub pool_id: PoolId,
	/// App client being described.
	pub client_id: ClientId,
	/// Explicit endpoint; derived from the pool region when absent.
	pub endpoint: Option<Url>,
}
impl PoolDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifiers.
	pub fn new(pool_id: PoolId, client_id: ClientId) -> Self {
		Self { pool_id, client_id, endpoint: None }
	}

	/// Overrides the endpoint (local emulators, VPC endpoints, tests).
	pub fn endpoint(mut self, url: Url) -> Self {
		self.endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<PoolDescriptor, PoolDescriptorError> {
		let endpoint = match self.endpoint {
			Some(endpoint) => endpoint,
			None => regional_endpoint(&self.pool_id)?,
		};
		let descriptor =
			PoolDescriptor { pool_id: self.pool_id, client_id: self.client_id, endpoint };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl PoolDescriptor {
	/// Validates invariants for the descriptor.
	pub fn validate(&self) -> Result<(), PoolDescriptorError> {
		validate_endpoint(&self.endpoint)
	}
}

fn regional_endpoint(pool_id: &PoolId) -> Result<Url, PoolDescriptorError> {
	let region = pool_id
		.region()
		.ok_or_else(|| PoolDescriptorError::MissingEndpoint { pool_id: pool_id.to_string() })?;

	// Regions are interpolated into the host name.
	if !region.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
		return Err(PoolDescriptorError::InvalidRegion { region: region.to_owned() });
	}

	Url::parse(&format!("https://cognito-idp.{region}.amazonaws.com/"))
		.map_err(|_| PoolDescriptorError::InvalidRegion { region: region.to_owned() })
}

fn validate_endpoint(url: &Url) -> Result<(), PoolDescriptorError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(PoolDescriptorError::InsecureEndpoint { url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		None => false,
	}
}
