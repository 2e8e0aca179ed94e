//! Tracing setup for the node binary.
//!
//! Logs go to stderr; stdout carries only the summaries printed by `init`
//! and `version`. `RUST_LOG` replaces the default directive when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used by `run` when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str =
    "credledger_node=info,credledger_contracts=info,credledger_protocol=info,tower_http=debug";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored lines with source locations, for a terminal.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// `"json"` in any case selects [`LogFormat::Json`]; anything else is
    /// [`LogFormat::Pretty`].
    pub fn from_str_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Install the global subscriber. Each subcommand calls this once before
/// touching the world state.
///
/// ```text
/// RUST_LOG=credledger_contracts=debug,tower_http=info credledger-node run
/// ```
pub fn init_logging(directive: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    tracing::debug!(?format, "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parsing_is_lossy() {
        assert_eq!(LogFormat::from_str_lossy("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str_lossy("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str_lossy("yaml"), LogFormat::Pretty);
    }
}
