//! Optional diagnostic output for an analysis run.
//!
//! Two independent sinks: a trace of the algorithms' decisions and periodic
//! dumps of the decompression model's tissue state. Both are off by
//! default and neither affects computed results.

use std::fmt;
use std::io::Write;

type Sink = Box<dyn Write + Send>;

#[derive(Default)]
pub struct Diagnostics {
    trace: Option<Sink>,
    model: Option<Sink>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, sink: impl Write + Send + 'static) -> Self {
        self.enable_trace(sink);
        self
    }

    pub fn with_model_print(mut self, sink: impl Write + Send + 'static) -> Self {
        self.enable_model_print(sink);
        self
    }

    pub fn enable_trace(&mut self, sink: impl Write + Send + 'static) {
        self.trace = Some(Box::new(sink));
    }

    pub fn disable_trace(&mut self) {
        self.trace = None;
    }

    pub fn enable_model_print(&mut self, sink: impl Write + Send + 'static) {
        self.model = Some(Box::new(sink));
    }

    pub fn disable_model_print(&mut self) {
        self.model = None;
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace.is_some()
    }

    pub fn model_print_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Write one trace line. Sink failures are logged and otherwise ignored.
    pub(crate) fn trace(&mut self, args: fmt::Arguments<'_>) {
        if let Some(sink) = self.trace.as_mut() {
            if let Err(e) = writeln!(sink, "{args}") {
                tracing::warn!("diagnostic trace sink failed: {e}");
            }
        }
    }

    pub(crate) fn model_sink(&mut self) -> Option<&mut (dyn Write + Send + 'static)> {
        self.model.as_deref_mut()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("trace", &self.trace_enabled())
            .field("model_print", &self.model_print_enabled())
            .finish()
    }
}

/// Shorthand for `diag.trace(format_args!(..))`, skipping formatting when
/// tracing is off.
macro_rules! diag_trace {
    ($diag:expr, $($arg:tt)*) => {
        if $diag.trace_enabled() {
            $diag.trace(format_args!($($arg)*));
        }
    };
}

pub(crate) use diag_trace;
