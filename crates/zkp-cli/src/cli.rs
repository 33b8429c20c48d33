// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use zkp_logging::CliLoggingArgs;

use crate::config::SnifferConfig;

/// Passive ZooKeeper traffic observer exporting Prometheus metrics
#[derive(Parser, Debug)]
#[command(name = "zk-packet", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Network interface to capture on
    #[arg(short = 'i', long)]
    pub interface: Option<String>,

    /// Read packets from a pcap file instead of an interface
    #[arg(short = 'r', long)]
    pub pcap_file: Option<PathBuf>,

    /// Port the ZooKeeper service listens on
    #[arg(long)]
    pub service_port: Option<u16>,

    /// Capture snapshot length in bytes
    #[arg(long)]
    pub snaplen: Option<i32>,

    /// Put the interface into promiscuous mode
    #[arg(long)]
    pub promiscuous: bool,

    /// Address of the metrics endpoint
    #[arg(long)]
    pub metrics_listen: Option<SocketAddr>,

    /// Do not serve metrics over HTTP
    #[arg(long)]
    pub no_metrics: bool,

    /// Print the final metrics to stdout on exit
    #[arg(long)]
    pub dump_metrics: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,

    #[command(flatten)]
    pub logging: CliLoggingArgs,
}

impl Cli {
    /// Command-line flags take precedence over file and environment values
    pub fn apply(&self, config: &mut SnifferConfig) {
        if let Some(interface) = &self.interface {
            config.capture.interface = interface.clone();
        }
        if let Some(path) = &self.pcap_file {
            config.capture.pcap_file = Some(path.clone());
        }
        if let Some(port) = self.service_port {
            config.capture.service_port = port;
        }
        if let Some(snaplen) = self.snaplen {
            config.capture.snaplen = snaplen;
        }
        if self.promiscuous {
            config.capture.promiscuous = true;
        }
        if let Some(address) = self.metrics_listen {
            config.metrics.listen_address = address;
        }
        if self.no_metrics {
            config.metrics.enabled = false;
        }
    }
}
