// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Drives segments from a packet source through the correlation engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, trace};
use zkp_capture::{CaptureError, PacketSource, PcapFileSource, Segment, SourceStats};
use zkp_correlate::{Direction, Engine, Observer, PendingRequests};

use crate::config::CaptureConfig;

/// Segment counters for the end-of-run summary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub segments: u64,
    pub decoded: u64,
    pub decode_errors: u64,
    /// Segments on another port or without a message body
    pub ignored: u64,
}

pub struct Pipeline<O> {
    engine: Engine<O>,
    service_port: u16,
    stats: PipelineStats,
}

impl<O: Observer> Pipeline<O> {
    pub fn new(service_port: u16, observer: O) -> Self {
        Self {
            engine: Engine::new(PendingRequests::new(), observer),
            service_port,
            stats: PipelineStats::default(),
        }
    }

    pub fn engine(&self) -> &Engine<O> {
        &self.engine
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Route one segment to the client or service side of the engine
    pub fn handle(&mut self, segment: &Segment) {
        self.stats.segments += 1;

        let Some(direction) = segment.direction(self.service_port) else {
            trace!(source = %segment.source, destination = %segment.destination, "not service traffic");
            self.stats.ignored += 1;
            return;
        };
        let Some(body) = segment.body() else {
            self.stats.ignored += 1;
            return;
        };

        let client = segment.client(direction);
        let decoded = match direction {
            Direction::Incoming => self
                .engine
                .on_client_packet(client, segment.timestamp, body)
                .map(|outcome| debug!(peer = %client, ?outcome, "client packet")),
            Direction::Outgoing => self
                .engine
                .on_service_packet(client, segment.timestamp, body)
                .map(|outcome| debug!(peer = %client, ?outcome, "service packet")),
        };
        match decoded {
            Ok(()) => self.stats.decoded += 1,
            Err(_) => self.stats.decode_errors += 1,
        }
    }

    /// Consume `source` until it is exhausted or `stop` is set
    pub fn run(&mut self, source: &mut dyn PacketSource, stop: &AtomicBool) -> Result<(), CaptureError> {
        while !stop.load(Ordering::Relaxed) {
            match source.next_segment()? {
                Some(segment) => self.handle(&segment),
                None => break,
            }
        }
        self.log_summary(source.stats());
        Ok(())
    }

    fn log_summary(&self, source: SourceStats) {
        info!(
            frames = source.frames,
            skipped_frames = source.skipped,
            segments = self.stats.segments,
            decoded = self.stats.decoded,
            decode_errors = self.stats.decode_errors,
            ignored = self.stats.ignored,
            pending = self.engine.pending().len(),
            "capture finished"
        );
    }
}

/// Open the capture file when one is configured, else the live interface
pub fn open_source(config: &CaptureConfig, stop: Arc<AtomicBool>) -> Result<Box<dyn PacketSource + Send>> {
    if let Some(path) = &config.pcap_file {
        info!(path = %path.display(), "reading capture file");
        let source = PcapFileSource::open(path).context("opening capture")?;
        return Ok(Box::new(source));
    }
    open_live(config, stop)
}

#[cfg(feature = "live")]
fn open_live(config: &CaptureConfig, stop: Arc<AtomicBool>) -> Result<Box<dyn PacketSource + Send>> {
    use zkp_capture::{LiveOptions, LiveSource};

    let options = LiveOptions {
        interface: config.interface.clone(),
        snaplen: config.snaplen,
        promiscuous: config.promiscuous,
        service_port: config.service_port,
    };
    let source = LiveSource::open(&options, stop)
        .with_context(|| format!("opening interface {}", config.interface))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "live"))]
fn open_live(config: &CaptureConfig, _stop: Arc<AtomicBool>) -> Result<Box<dyn PacketSource + Send>> {
    anyhow::bail!(
        "live capture on {} needs the `live` feature; use --pcap-file to read a capture",
        config.interface
    )
}
