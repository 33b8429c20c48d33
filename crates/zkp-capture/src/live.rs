// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Live capture from a network interface through libpcap

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pcap::{Active, Capture};
use tracing::info;

use crate::demux::{parse_segment, LinkType};
use crate::segment::Segment;
use crate::source::{CaptureError, PacketSource, SourceStats};

/// How long a read blocks before the stop flag is checked again
const READ_TIMEOUT_MS: i32 = 500;

/// Parameters of a live capture
#[derive(Clone, Debug)]
pub struct LiveOptions {
    pub interface: String,
    pub snaplen: i32,
    pub promiscuous: bool,
    pub service_port: u16,
}

impl LiveOptions {
    /// BPF program restricting the capture to service traffic
    pub fn filter(&self) -> String {
        format!("tcp and port {}", self.service_port)
    }
}

pub struct LiveSource {
    capture: Capture<Active>,
    link: LinkType,
    stop: Arc<AtomicBool>,
    stats: SourceStats,
}

impl LiveSource {
    /// Open `options.interface`; the source ends once `stop` is set
    pub fn open(options: &LiveOptions, stop: Arc<AtomicBool>) -> Result<Self, CaptureError> {
        let mut capture = Capture::from_device(options.interface.as_str())?
            .promisc(options.promiscuous)
            .snaplen(options.snaplen)
            .timeout(READ_TIMEOUT_MS)
            .open()?;
        capture.filter(&options.filter(), true)?;

        let linktype = capture.get_datalink();
        let link = u32::try_from(linktype.0)
            .ok()
            .and_then(LinkType::from_code)
            .ok_or_else(|| CaptureError::UnsupportedLinkType(format!("{linktype:?}")))?;

        info!(
            interface = %options.interface,
            filter = %options.filter(),
            link = ?link,
            "live capture started"
        );
        Ok(Self {
            capture,
            link,
            stop,
            stats: SourceStats::default(),
        })
    }
}

impl PacketSource for LiveSource {
    fn next_segment(&mut self) -> Result<Option<Segment>, CaptureError> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Ok(None);
            }
            let packet = match self.capture.next_packet() {
                Ok(packet) => packet,
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            self.stats.frames += 1;
            let ts = packet.header.ts;
            let timestamp = Duration::new(ts.tv_sec.max(0) as u64, (ts.tv_usec.max(0) as u32) * 1000);
            match parse_segment(self.link, packet.data, timestamp) {
                Some(segment) => return Ok(Some(segment)),
                None => self.stats.skipped += 1,
            }
        }
    }

    fn stats(&self) -> SourceStats {
        self.stats
    }
}
