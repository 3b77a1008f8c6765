use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::coercion::CoercionPolicy;

// ── Pipeline options ───────────────────────────────────────────────────────────

/// How the parser treats a leading `sep=<char>` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterPolicy {
    /// Drop the directive and always split on `~`.
    #[default]
    Fixed,
    /// Drop the directive and split on the character it declares.
    Declared,
}

/// Knobs for a single parse → normalize → group run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub delimiter_policy: DelimiterPolicy,
    pub coercion: CoercionPolicy,
}

/// How the binary presents the chart data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise a `~`-delimited purchase export into chart series
#[derive(Parser, Debug, Clone)]
#[command(
    name = "purchase-vis",
    about = "Summarise a ~-delimited purchase export into chart series",
    version
)]
pub struct Settings {
    /// Purchase export to read
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Whether a leading `sep=` line changes the delimiter
    #[arg(long, default_value = "fixed", value_parser = ["fixed", "declared"])]
    pub delimiter_policy: String,

    /// Fail on fields that are not numbers or dates instead of using zero
    #[arg(long)]
    pub strict: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Parse an explicit argument list and apply the `--debug` override.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        let delimiter_policy = match self.delimiter_policy.as_str() {
            "declared" => DelimiterPolicy::Declared,
            _ => DelimiterPolicy::Fixed,
        };
        let coercion = if self.strict {
            CoercionPolicy::Strict
        } else {
            CoercionPolicy::Lossy
        };
        PipelineOptions {
            delimiter_policy,
            coercion,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["purchase-vis", "purchases.csv"]);

        assert_eq!(settings.file, PathBuf::from("purchases.csv"));
        assert_eq!(settings.format, "text");
        assert_eq!(settings.delimiter_policy, "fixed");
        assert!(!settings.strict);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_default_pipeline_options() {
        let settings = Settings::load_from_args(["purchase-vis", "p.csv"]);
        assert_eq!(settings.pipeline_options(), PipelineOptions::default());
        assert_eq!(settings.output_format(), OutputFormat::Text);
    }

    #[test]
    fn test_settings_declared_strict_json() {
        let settings = Settings::load_from_args([
            "purchase-vis",
            "p.csv",
            "--delimiter-policy",
            "declared",
            "--strict",
            "--format",
            "json",
        ]);
        let opts = settings.pipeline_options();
        assert_eq!(opts.delimiter_policy, DelimiterPolicy::Declared);
        assert_eq!(opts.coercion, CoercionPolicy::Strict);
        assert_eq!(settings.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["purchase-vis", "p.csv", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = Settings::try_parse_from(["purchase-vis", "p.csv", "--format", "xml"]);
        assert!(result.is_err());
    }
}
