// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Link-layer demultiplexing down to TCP payloads

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use tracing::trace;

use crate::segment::Segment;

/// Link-layer framing of captured packets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    Ethernet,
    /// Packets start directly with an IPv4 or IPv6 header
    RawIp,
    /// Linux "any" device cooked capture
    LinuxSll,
}

impl LinkType {
    /// Map a libpcap link-type number
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(LinkType::Ethernet),
            12 | 14 | 101 | 228 | 229 => Some(LinkType::RawIp),
            113 => Some(LinkType::LinuxSll),
            _ => None,
        }
    }
}

/// Extract the TCP payload of one captured frame
///
/// Non-IP, non-TCP, malformed and payload-free frames yield `None`.
pub fn parse_segment(link: LinkType, data: &[u8], timestamp: Duration) -> Option<Segment> {
    let sliced = match link {
        LinkType::Ethernet => SlicedPacket::from_ethernet(data).ok(),
        LinkType::RawIp => SlicedPacket::from_ip(data).ok(),
        LinkType::LinuxSll => SlicedPacket::from_linux_sll(data).ok(),
    };
    let Some(sliced) = sliced else {
        trace!(len = data.len(), "skipping malformed frame");
        return None;
    };

    let (source_ip, destination_ip) = match sliced.net? {
        NetSlice::Ipv4(ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
        #[allow(unreachable_patterns)]
        _ => return None,
    };

    let Some(TransportSlice::Tcp(tcp)) = sliced.transport else {
        return None;
    };
    let payload = tcp.payload();
    if payload.is_empty() {
        return None;
    }

    Some(Segment {
        source: SocketAddr::new(source_ip, tcp.source_port()),
        destination: SocketAddr::new(destination_ip, tcp.destination_port()),
        payload: payload.to_vec(),
        timestamp,
    })
}
