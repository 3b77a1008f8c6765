//! Core types shared by the purchase visualisation crates.
//!
//! Holds the error type, the raw and normalized record models, the lossy
//! numeric coercion helpers, number formatting and CLI settings.

pub mod coercion;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
