//! Challenge states reported by the provider after an authentication attempt.

// self
use crate::_prelude::*;

/// Follow-up demanded by the provider; governs which next call is legal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChallengeState {
	/// No challenge: the attempt either authenticated or failed outright.
	None,
	/// The user signed in with a temporary password and must choose a permanent one.
	NewPasswordRequired,
	/// Any challenge this gateway does not answer (MFA, custom auth, ...).
	Other(String),
}
impl ChallengeState {
	const NEW_PASSWORD_REQUIRED: &'static str = "NEW_PASSWORD_REQUIRED";

	/// Parses the provider's `ChallengeName`; absent or blank names mean no challenge.
	pub fn from_name(name: Option<&str>) -> Self {
		match name.map(str::trim) {
			None | Some("") => Self::None,
			Some(Self::NEW_PASSWORD_REQUIRED) => Self::NewPasswordRequired,
			Some(other) => Self::Other(other.to_owned()),
		}
	}

	/// Wire name of the challenge, if any.
	pub fn name(&self) -> Option<&str> {
		match self {
			Self::None => None,
			Self::NewPasswordRequired => Some(Self::NEW_PASSWORD_REQUIRED),
			Self::Other(name) => Some(name),
		}
	}

	/// Returns true when no challenge is pending.
	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}
}
impl Display for ChallengeState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.name().unwrap_or("<none>"))
	}
}
