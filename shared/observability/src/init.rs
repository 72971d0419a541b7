//! Tracing setup for the `hybrid-rag` binary.
//!
//! Everything is written to stderr; stdout is reserved for command output
//! (JSON reports and chat replies).

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Crates whose level follows the verbosity flag. Dependencies stay at `warn`.
const WORKSPACE_TARGETS: &[&str] = &[
    "hybrid_rag",
    "graph_rag",
    "vector_rag",
    "hybridrag_config",
    "hybridrag_observability",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service_name: String,
    pub format: LogFormat,
    /// 0 = info, 1 = debug, 2+ = trace for workspace crates
    pub verbosity: u8,
    /// Emit span open/close events (ingest stages, store calls)
    pub log_spans: bool,
}

impl TracingConfig {
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            format: LogFormat::default(),
            verbosity: 0,
            log_spans: false,
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_spans(mut self, enabled: bool) -> Self {
        self.log_spans = enabled;
        self
    }

    /// Filter used when `RUST_LOG` is unset
    pub fn default_directives(&self) -> String {
        let level = match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        let mut directives = String::from("warn");
        for target in WORKSPACE_TARGETS {
            directives.push_str(&format!(",{}={}", target, level));
        }
        directives
    }

    fn span_events(&self) -> FmtSpan {
        if self.log_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flag.
///
/// Panics if a subscriber is already installed, so call it once from `main`.
pub fn init_tracing(config: TracingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.default_directives()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(config.span_events())
                .with_current_span(true)
                .with_target(true);

            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_span_events(config.span_events())
                .with_target(config.verbosity > 0);

            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }

    tracing::debug!(
        service = %config.service_name,
        format = ?config.format,
        verbosity = config.verbosity,
        "Tracing initialized"
    );
}
