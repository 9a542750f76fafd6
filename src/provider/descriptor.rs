//! User-pool descriptors shared by every flow.
//!
//! A [`PoolDescriptor`] names the pool and app client a gateway acts for and the endpoint the
//! JSON protocol is spoken against. Descriptors are validated once at construction so flows
//! never re-check them.

/// Builder API for assembling pool descriptors.
pub mod builder;
/// Auth flow and delivery identifiers used on the wire.
pub mod flow;

pub use builder::*;
pub use flow::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, PoolId},
};

/// Immutable pool descriptor consumed by flows and transports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPoolDescriptor")]
pub struct PoolDescriptor {
	/// User pool the gateway authenticates against.
	pub pool_id: PoolId,
	/// App client issuing the auth calls.
	pub client_id: ClientId,
	/// JSON protocol endpoint.
	pub endpoint: Url,
}
impl PoolDescriptor {
	/// Creates a new builder for the provided pool and client.
	pub fn builder(pool_id: PoolId, client_id: ClientId) -> PoolDescriptorBuilder {
		PoolDescriptorBuilder::new(pool_id, client_id)
	}

	/// Region encoded in the pool identifier, when present.
	pub fn region(&self) -> Option<&str> {
		self.pool_id.region()
	}
}

#[derive(Deserialize)]
struct RawPoolDescriptor {
	pool_id: PoolId,
	client_id: ClientId,
	#[serde(default)]
	endpoint: Option<Url>,
}
impl TryFrom<RawPoolDescriptor> for PoolDescriptor {
	type Error = PoolDescriptorError;

	fn try_from(raw: RawPoolDescriptor) -> Result<Self, Self::Error> {
		let mut builder = PoolDescriptorBuilder::new(raw.pool_id, raw.client_id);

		if let Some(endpoint) = raw.endpoint {
			builder = builder.endpoint(endpoint);
		}

		builder.build()
	}
}
