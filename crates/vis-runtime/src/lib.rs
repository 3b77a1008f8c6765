//! Runtime layer for purchase visualisation.
//!
//! Reads selected files through a [`provider::FileProvider`] and runs the
//! pipeline for each selection, delivering only the newest run's result.

pub mod orchestrator;
pub mod provider;

pub use vis_core as core;
pub use vis_data as data;
