// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration: defaults, TOML file, `ZKP_*` environment

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides, e.g. `ZKP_CAPTURE__SERVICE_PORT`
pub const ENV_PREFIX: &str = "ZKP";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnifferConfig {
    pub capture: CaptureConfig,
    pub metrics: MetricsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Interface for live capture
    pub interface: String,
    /// Read this capture file instead of a live interface
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcap_file: Option<PathBuf>,
    pub snaplen: i32,
    pub promiscuous: bool,
    /// Port the coordination service listens on
    pub service_port: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
            pcap_file: None,
            snaplen: 65535,
            promiscuous: false,
            service_port: 2181,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_address: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_address: SocketAddr::from(([0, 0, 0, 0], 8085)),
        }
    }
}

impl SnifferConfig {
    /// Load from an optional TOML file overlaid with the process environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, None)
    }

    /// Like [`SnifferConfig::load`], reading overrides from `env` when given
    pub fn load_with_env(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let built = builder.build().with_context(|| match file {
            Some(path) => format!("reading config file {}", path.display()),
            None => "reading configuration".to_string(),
        })?;
        built
            .try_deserialize()
            .context("invalid configuration values")
    }

    /// Render as TOML, the same format `--config` accepts
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
