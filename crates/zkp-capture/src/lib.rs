// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Capture front-end for the ZooKeeper observer
//!
//! Reads link-layer frames from a pcap file or, with the `live` feature, from
//! a network interface, and yields the TCP payloads as [`Segment`]s. Each
//! segment payload is treated as exactly one protocol frame.

pub mod demux;
#[cfg(feature = "live")]
pub mod live;
pub mod segment;
pub mod source;

pub use demux::{parse_segment, LinkType};
#[cfg(feature = "live")]
pub use live::{LiveOptions, LiveSource};
pub use segment::{frame_body, Segment, FRAME_PREFIX_LEN};
pub use source::{CaptureError, PacketSource, PcapFileSource, SourceStats};
