//! Optional observability helpers for gateway flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `cognito_session.flow`
//!   with the `flow` and `stage` fields, plus debug/warn events from each flow.
//! - Enable `metrics` to increment `cognito_session_flow_total` (labeled by `flow` +
//!   `outcome`), `cognito_session_cache_lookup_total` (labeled by `result`), and
//!   `cognito_session_retry_total` (labeled by `operation`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Emits a `tracing` event when the `tracing` feature is enabled; compiles to nothing
/// otherwise.
macro_rules! event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!($($arg)+);
		}
	};
}
pub(crate) use event;

/// Gateway operations observed by the instrumentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// User creation.
	SignUp,
	/// Temporary-to-permanent password exchange.
	ConfirmSignUp,
	/// Username/password authentication.
	SignIn,
	/// Answering a pending new-password challenge.
	NewPassword,
	/// Refresh-token grant.
	Refresh,
	/// Session validation.
	Validate,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::SignUp => "sign_up",
			FlowKind::ConfirmSignUp => "confirm_sign_up",
			FlowKind::SignIn => "sign_in",
			FlowKind::NewPassword => "new_password",
			FlowKind::Refresh => "refresh",
			FlowKind::Validate => "validate",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gateway operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of a credentials cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLookup {
	/// Token present and fresh.
	Hit,
	/// Token never cached or already evicted.
	Miss,
	/// Token found but past its expiry; the lookup removed it.
	Expired,
}
impl CacheLookup {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheLookup::Hit => "hit",
			CacheLookup::Miss => "miss",
			CacheLookup::Expired => "expired",
		}
	}
}
