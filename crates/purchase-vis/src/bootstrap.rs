use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` value onto an [`EnvFilter`] directive.
///
/// Unrecognised values are passed through unchanged so that full filter
/// strings such as `"vis_data=debug"` also work.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, writing to stderr so that
/// chart output on stdout stays clean.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_known_levels() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("error"), "error");
    }

    #[test]
    fn test_level_directive_passthrough() {
        assert_eq!(level_directive("vis_data=trace"), "vis_data=trace");
    }
}
