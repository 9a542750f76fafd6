//! Redacted wrappers for bearer tokens and passwords.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ValidationError};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// SHA-256 digest of the token, safe to log and to use as a map key.
	pub fn fingerprint(&self) -> TokenFingerprint {
		TokenFingerprint::of(&self.0)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<&str> for TokenSecret {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// SHA-256 digest of a token.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenFingerprint([u8; 32]);
impl TokenFingerprint {
	/// Hashes the provided raw token.
	pub fn of(token: &str) -> Self {
		Self(Sha256::digest(token.as_bytes()).into())
	}
}
impl Debug for TokenFingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "TokenFingerprint({self})")
	}
}
impl Display for TokenFingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Eight bytes are enough to correlate log lines.
		for byte in &self.0[..8] {
			write!(f, "{byte:02x}")?;
		}

		Ok(())
	}
}

/// User-supplied password (temporary or permanent), redacted in all formatters.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);
impl Password {
	/// Wraps a password, rejecting blank input.
	pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, ValidationError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(ValidationError::MissingField { field });
		}

		Ok(Self(value))
	}

	/// Returns the raw password. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for Password {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Password").field(&"<redacted>").finish()
	}
}
