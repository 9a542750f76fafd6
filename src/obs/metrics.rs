// self
use crate::obs::{CacheLookup, FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cognito_session_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a credentials cache lookup result.
pub fn record_cache_lookup(lookup: CacheLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("cognito_session_cache_lookup_total", "result" => lookup.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = lookup;
	}
}

/// Records a throttled provider call that is about to be retried.
pub fn record_retry(operation: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("cognito_session_retry_total", "operation" => operation).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = operation;
	}
}
