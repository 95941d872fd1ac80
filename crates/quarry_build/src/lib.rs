//! The parallel extraction orchestrator.
//!
//! This crate drives one run: normalize targets, expand workspaces,
//! short-circuit unchanged targets at the application cache tier, fan out
//! per-unit extraction with a bounded concurrency cap, merge the partial
//! results, write the output tree, and record fresh build information in
//! both cache tiers.

#![warn(missing_docs)]

pub mod copy;
pub mod error;
pub mod output;
pub mod pipeline;

pub use copy::copy_outputs;
pub use error::BuildError;
pub use output::write_outputs;
pub use pipeline::{BuildOptions, BuildPipeline, RunSummary, TargetOutcome};
