// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping one gateway operation.
///
/// The `subject` field starts empty and is filled once the flow knows who or what it is
/// acting on (a username, or a token fingerprint; never a raw token).
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"cognito_session.flow",
				flow = kind.as_str(),
				stage,
				subject = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Records the subject of the flow on the span.
	pub fn record_subject(&self, subject: &dyn Display) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("subject", tracing::field::display(subject));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = subject;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a failed step at `warn` with the error attached as the `error` field.
pub(crate) fn warn_failure(message: &'static str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (message, error);
	}
}
