// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line front-end of the zk-packet observer

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod server;

pub use cli::Cli;
pub use config::{CaptureConfig, MetricsConfig, SnifferConfig};
pub use pipeline::{open_source, Pipeline, PipelineStats};
