//! Optional human-readable trace sink.
//!
//! Line content is diagnostic only and carries no format guarantees.

/// Receives trace lines from a planning call.
pub trait TraceSink {
    fn record(&mut self, line: &str);
}

impl TraceSink for Vec<String> {
    fn record(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Forwards every trace line as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&mut self, line: &str) {
        tracing::debug!(target: "quarry::trace", "{line}");
    }
}

/// Lazily formats lines only when a sink is attached.
#[derive(Default)]
pub(crate) struct Tracer<'s> {
    sink: Option<&'s mut dyn TraceSink>,
}

impl<'s> Tracer<'s> {
    pub(crate) fn new(sink: Option<&'s mut dyn TraceSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub(crate) fn emit(&mut self, line: impl FnOnce() -> String) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.record(&line());
        }
    }
}
