//! End-to-end run: raw text in, summaries and chart specs out.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use vis_core::error::Result;
use vis_core::models::NormalizedRecord;
use vis_core::settings::PipelineOptions;

use crate::aggregator::Summaries;
use crate::normalizer::{coercion_fallbacks, normalize_with};
use crate::parser::parse_with;
use crate::presentation::{chart_specs, ChartSpec};

/// Bookkeeping about one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    /// Data rows read from the file.
    pub rows: usize,
    /// Rows where at least one numeric or date field fell back to a default.
    pub rows_with_fallbacks: usize,
    /// Rows whose `dateTime` did not parse.
    pub invalid_dates: usize,
    pub elapsed_seconds: f64,
}

/// Output of [`run`], ready for a chart renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    #[serde(skip)]
    pub records: Vec<NormalizedRecord>,
    pub summaries: Summaries,
    pub charts: Vec<ChartSpec>,
    pub stats: PipelineStats,
}

impl Visualization {
    /// `true` when there were no data rows and nothing should be drawn.
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse, normalize and summarise `text`.
///
/// Parse errors end the run. Coercion failures only do so under
/// [`vis_core::coercion::CoercionPolicy::Strict`].
pub fn run(text: &str, options: &PipelineOptions) -> Result<Visualization> {
    let started = Instant::now();

    let parsed = parse_with(text, options.delimiter_policy)?;
    let rows_with_fallbacks = parsed
        .records
        .iter()
        .filter(|r| !coercion_fallbacks(r).is_empty())
        .count();

    let records = normalize_with(&parsed.records, options.coercion)?;
    let invalid_dates = records.iter().filter(|r| !r.date_time.is_valid()).count();
    if rows_with_fallbacks > 0 {
        debug!(
            "{} of {} rows had fields replaced by defaults",
            rows_with_fallbacks,
            records.len()
        );
    }

    let summaries = Summaries::build(&records);
    let charts = chart_specs(&summaries, &records);

    if charts.is_empty() {
        warn!("No data rows found; nothing to render");
    } else {
        info!(
            "Summarised {} rows into {} dates, {} stores, {} products",
            records.len(),
            summaries.by_date.len(),
            summaries.by_store.len(),
            summaries.by_product.len()
        );
    }

    let stats = PipelineStats {
        rows: records.len(),
        rows_with_fallbacks,
        invalid_dates,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };

    Ok(Visualization {
        records,
        summaries,
        charts,
        stats,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use vis_core::coercion::CoercionPolicy;
    use vis_core::error::VisError;
    use vis_core::models::INVALID_DATE_KEY;
    use vis_core::settings::DelimiterPolicy;

    const SCENARIO_A: &str = "sep=~\n\
dateTime~storeName~productName~totalCost~quantity~weight\n\
2024-01-01T10:00~A~Apple~500~2~1.0\n\
2024-01-01T15:00~A~Apple~300~1~0.5\n\
2024-01-02T09:00~B~Banana~200~3~2.0";

    fn lossy() -> PipelineOptions {
        PipelineOptions::default()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scenario_a_summaries() {
        let vis = run(SCENARIO_A, &lossy()).unwrap();
        let s = &vis.summaries;

        let day = s.by_date.get("2024-01-01").unwrap();
        assert!(close(day.total_cost, 8.0));
        assert!(close(day.quantity, 3.0));
        assert!(close(day.weight, 1.5));

        assert!(close(s.by_store.get("A").unwrap().total_cost, 8.0));

        let apple = s.by_product.get("Apple").unwrap();
        assert!(close(apple.quantity, 3.0));
        assert!(close(apple.total_cost, 8.0));
        assert_eq!(apple.count, 2);

        let dates: Vec<&str> = s.by_date.keys().collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(vis.stats.rows, 3);
        assert_eq!(vis.stats.rows_with_fallbacks, 0);
    }

    #[test]
    fn test_scenario_b_bad_cost_contributes_zero() {
        let text = "dateTime~storeName~productName~totalCost~quantity~weight\n\
2024-01-01T10:00~A~Apple~500~2~1.0\n\
2024-01-01T11:00~A~Apple~abc~1~0.5";
        let vis = run(text, &lossy()).unwrap();
        let s = &vis.summaries;

        assert!(close(s.by_date.get("2024-01-01").unwrap().total_cost, 5.0));
        assert!(close(s.by_store.get("A").unwrap().total_cost, 5.0));
        let apple = s.by_product.get("Apple").unwrap();
        assert!(close(apple.total_cost, 5.0));
        assert!(close(apple.quantity, 3.0));
        assert_eq!(apple.count, 2);
        assert_eq!(vis.stats.rows_with_fallbacks, 1);
    }

    #[test]
    fn test_scenario_c_header_only() {
        let header_only = "dateTime~storeName~productName~totalCost~quantity~weight\n";
        let vis = run(header_only, &lossy()).unwrap();

        assert!(vis.summaries.by_date.is_empty());
        assert!(vis.summaries.by_store.is_empty());
        assert!(vis.summaries.by_product.is_empty());
        assert!(vis.charts.is_empty());
        assert!(vis.is_empty());
    }

    #[test]
    fn test_values_with_unit_suffixes_keep_their_number() {
        let text = "dateTime~storeName~productName~totalCost~quantity~weight\n\
2024-01-01T10:00~A~Apple~500c~2 pcs~1.5kg";
        let vis = run(text, &lossy()).unwrap();
        let apple = vis.summaries.by_product.get("Apple").unwrap();

        assert!(close(apple.total_cost, 5.0));
        assert!(close(apple.quantity, 2.0));
        assert!(close(vis.summaries.by_date.get("2024-01-01").unwrap().weight, 1.5));
        assert_eq!(vis.stats.rows_with_fallbacks, 0);
    }

    #[test]
    fn test_zoned_minute_timestamps_are_dated() {
        let text = "dateTime~storeName~productName~totalCost~quantity~weight\n\
2024-01-01T10:00Z~A~Apple~100~1~1\n\
2024-01-01T10:00+02:00~A~Apple~100~1~1";
        let vis = run(text, &lossy()).unwrap();
        let dates: Vec<&str> = vis.summaries.by_date.keys().collect();

        assert_eq!(dates, vec!["2024-01-01"]);
        assert_eq!(vis.stats.invalid_dates, 0);
    }

    #[test]
    fn test_empty_input_halts() {
        let err = run("", &lossy()).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_strict_mode_rejects_bad_row() {
        let text = "dateTime~storeName~productName~totalCost~quantity~weight\n\
2024-01-01T10:00~A~Apple~abc~1~0.5";
        let options = PipelineOptions {
            coercion: CoercionPolicy::Strict,
            ..PipelineOptions::default()
        };
        assert!(matches!(run(text, &options), Err(VisError::Coercion { .. })));
    }

    #[test]
    fn test_invalid_date_row_is_grouped() {
        let text = "dateTime~storeName~productName~totalCost~quantity~weight\n\
not-a-date~A~Apple~100~1~1\n\
2024-01-01~A~Apple~100~1~1";
        let vis = run(text, &lossy()).unwrap();

        assert_eq!(vis.stats.invalid_dates, 1);
        assert!(vis.summaries.by_date.get(INVALID_DATE_KEY).is_some());
        assert!(close(vis.summaries.total_cost(), 2.0));
    }

    #[test]
    fn test_declared_delimiter_policy() {
        let text = "sep=;\ndateTime;storeName;productName;totalCost;quantity;weight\n\
2024-01-01;A;Apple;250;1;1";
        let options = PipelineOptions {
            delimiter_policy: DelimiterPolicy::Declared,
            ..PipelineOptions::default()
        };
        let vis = run(text, &options).unwrap();
        assert!(close(vis.summaries.by_store.get("A").unwrap().total_cost, 2.5));
    }

    #[test]
    fn test_run_is_deterministic() {
        let first = run(SCENARIO_A, &lossy()).unwrap();
        let second = run(SCENARIO_A, &lossy()).unwrap();

        assert_eq!(first.records, second.records);
        assert_eq!(first.summaries, second.summaries);
        assert_eq!(first.charts, second.charts);
    }

    #[test]
    fn test_to_json_contains_charts() {
        let json = run(SCENARIO_A, &lossy()).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["charts"][0]["targetId"], "chart1");
        assert_eq!(value["stats"]["rows"], 3);
        assert!(value["summaries"]["byStore"]["A"]["totalCost"].is_number());
    }
}
