//! Bounded retry on provider throttling.
//!
//! [`RetryPolicy::run`] re-issues an operation while it fails with
//! [`ProviderErrorKind::RateLimited`], sleeping between attempts. Every other failure is
//! returned immediately. When the budget runs out the last throttling error is returned with
//! [`ProviderError::attempts`] set so callers can surface how hard the gateway tried.
//!
//! [`ProviderErrorKind::RateLimited`]: crate::provider::ProviderErrorKind::RateLimited

// crates.io
use rand::Rng;
// self
use crate::{
	_prelude::*,
	obs::{self, event},
	provider::{ProviderError, ProviderOperation},
};

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default delay between attempts.
pub const DEFAULT_BACKOFF: StdDuration = StdDuration::from_millis(250);
/// Default ceiling applied to exponential growth and to provider hints.
pub const DEFAULT_MAX_BACKOFF: StdDuration = StdDuration::from_secs(5);

/// Growth of the delay between attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
	#[default]
	/// Same delay before every retry.
	Fixed,
	/// Delay doubles after every retry, up to the policy's maximum.
	Exponential,
}

/// Delay advice for one retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Attempt that just failed (1-based).
	pub attempt: u32,
	/// How long to wait before the next attempt.
	pub delay: StdDuration,
	/// Whether the provider's `Retry-After` hint decided the delay.
	pub from_hint: bool,
}

/// Retry budget and backoff schedule for throttled provider calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, including the first. Never below 1.
	pub max_attempts: u32,
	/// Base delay between attempts.
	pub backoff: StdDuration,
	/// Backoff growth.
	pub kind: BackoffKind,
	/// Ceiling for computed delays and provider hints.
	pub max_backoff: StdDuration,
	/// Randomizes each delay within `[delay / 2, delay]`.
	pub jitter: bool,
}
impl RetryPolicy {
	/// Overrides the attempt budget (clamped to at least 1).
	pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
		self.max_attempts = max_attempts.max(1);

		self
	}

	/// Overrides the base delay.
	pub fn with_backoff(mut self, backoff: StdDuration) -> Self {
		self.backoff = backoff;

		self
	}

	/// Switches to exponential growth capped at `max_backoff`.
	pub fn exponential(mut self, max_backoff: StdDuration) -> Self {
		self.kind = BackoffKind::Exponential;
		self.max_backoff = max_backoff;

		self
	}

	/// Enables or disables jitter.
	pub fn with_jitter(mut self, jitter: bool) -> Self {
		self.jitter = jitter;

		self
	}

	/// Computes the wait after `attempt` failed, honoring a provider hint when it is larger.
	///
	/// Jitter is not applied here so the schedule stays deterministic for callers that only
	/// want to inspect it.
	pub fn directive(&self, attempt: u32, hint: Option<StdDuration>) -> RetryDirective {
		let computed = match self.kind {
			BackoffKind::Fixed => self.backoff,
			BackoffKind::Exponential => {
				let exponent = attempt.saturating_sub(1).min(16);

				self.backoff.saturating_mul(1 << exponent).min(self.max_backoff)
			},
		};
		let hint = hint.map(|hint| hint.min(self.max_backoff));

		match hint {
			Some(hint) if hint > computed =>
				RetryDirective { attempt, delay: hint, from_hint: true },
			_ => RetryDirective { attempt, delay: computed, from_hint: false },
		}
	}

	/// Runs `call` until it succeeds, fails with a non-throttling error, or the budget is spent.
	pub async fn run<T, F, Fut>(
		&self,
		operation: ProviderOperation,
		mut call: F,
	) -> Result<T, ProviderError>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<T, ProviderError>>,
	{
		let mut attempt = 1;

		loop {
			let mut err = match call().await {
				Ok(value) => return Ok(value),
				Err(err) => err,
			};

			err.attempts = attempt;

			if !err.is_rate_limited() || attempt >= self.max_attempts {
				return Err(err);
			}

			let directive = self.directive(attempt, err.retry_after);
			let delay = if self.jitter { jittered(directive.delay) } else { directive.delay };

			event!(
				warn,
				operation = %operation,
				attempt,
				max_attempts = self.max_attempts,
				delay_ms = delay.as_millis() as u64,
				"Provider throttled the call; retrying."
			);
			obs::record_retry(operation.action());

			tokio::time::sleep(delay).await;

			attempt += 1;
		}
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			backoff: DEFAULT_BACKOFF,
			kind: BackoffKind::Fixed,
			max_backoff: DEFAULT_MAX_BACKOFF,
			jitter: false,
		}
	}
}

fn jittered(delay: StdDuration) -> StdDuration {
	let floor = delay / 2;
	let spread = (delay - floor).as_millis() as u64;

	if spread == 0 {
		return delay;
	}

	floor + StdDuration::from_millis(rand::rng().random_range(0..=spread))
}
