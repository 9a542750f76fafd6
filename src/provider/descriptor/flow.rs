// self
use crate::_prelude::*;

/// Auth flows the gateway drives through `InitiateAuth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthFlow {
	/// Server-side username/password authentication.
	AdminNoSrpAuth,
	/// Refresh-token exchange.
	RefreshToken,
}
impl AuthFlow {
	/// Returns the wire identifier for the flow.
	pub fn as_str(self) -> &'static str {
		match self {
			AuthFlow::AdminNoSrpAuth => "ADMIN_NO_SRP_AUTH",
			AuthFlow::RefreshToken => "REFRESH_TOKEN",
		}
	}
}
impl Display for AuthFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Channel used to deliver a newly created user's temporary password.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMedium {
	#[default]
	/// Email to the user's `email` attribute.
	Email,
	/// SMS to the user's `phone_number` attribute.
	Sms,
}
impl DeliveryMedium {
	/// Returns the wire identifier for the medium.
	pub fn as_str(self) -> &'static str {
		match self {
			DeliveryMedium::Email => "EMAIL",
			DeliveryMedium::Sms => "SMS",
		}
	}
}
impl Display for DeliveryMedium {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
