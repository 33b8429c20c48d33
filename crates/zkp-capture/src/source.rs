// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Packet sources feeding the observer pipeline

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use pcap_file::pcap::PcapReader;
use pcap_file::DataLink;
use thiserror::Error;
use tracing::debug;

use crate::demux::{parse_segment, LinkType};
use crate::segment::Segment;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open capture file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed pcap data: {0}")]
    Pcap(#[from] pcap_file::PcapError),

    #[error("unsupported link type {0}")]
    UnsupportedLinkType(String),

    #[cfg(feature = "live")]
    #[error("live capture failed: {0}")]
    Live(#[from] pcap::Error),
}

/// Frame counters kept by every source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Frames read from the capture
    pub frames: u64,
    /// Frames that carried no TCP payload
    pub skipped: u64,
}

/// A stream of TCP segments in capture order
pub trait PacketSource {
    /// Next segment, or `None` once the source is exhausted or stopped
    fn next_segment(&mut self) -> Result<Option<Segment>, CaptureError>;

    fn stats(&self) -> SourceStats;
}

/// Offline source reading a classic pcap file
pub struct PcapFileSource<R: Read> {
    reader: PcapReader<R>,
    link: LinkType,
    stats: SourceStats,
}

impl PcapFileSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, CaptureError> {
        let file = File::open(path).map_err(|source| CaptureError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> PcapFileSource<R> {
    pub fn new(reader: R) -> Result<Self, CaptureError> {
        let reader = PcapReader::new(reader)?;
        let datalink = reader.header().datalink;
        let link = match datalink {
            DataLink::ETHERNET => LinkType::Ethernet,
            DataLink::RAW | DataLink::IPV4 | DataLink::IPV6 => LinkType::RawIp,
            DataLink::LINUX_SLL => LinkType::LinuxSll,
            other => return Err(CaptureError::UnsupportedLinkType(format!("{other:?}"))),
        };
        debug!(link = ?link, "opened pcap stream");
        Ok(Self {
            reader,
            link,
            stats: SourceStats::default(),
        })
    }
}

impl<R: Read> PacketSource for PcapFileSource<R> {
    fn next_segment(&mut self) -> Result<Option<Segment>, CaptureError> {
        while let Some(packet) = self.reader.next_packet() {
            let packet = packet?;
            self.stats.frames += 1;
            match parse_segment(self.link, &packet.data, packet.timestamp) {
                Some(segment) => return Ok(Some(segment)),
                None => self.stats.skipped += 1,
            }
        }
        Ok(None)
    }

    fn stats(&self) -> SourceStats {
        self.stats
    }
}
