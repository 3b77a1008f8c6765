//! Parsing and aggregation pipeline for purchase exports.
//!
//! Turns raw `~`-delimited text into header-keyed records, coerces them into
//! typed purchases, folds those into per-date, per-store and per-product
//! summaries and lays the summaries out as chart series.

pub mod aggregator;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod presentation;

pub use vis_core as core;
