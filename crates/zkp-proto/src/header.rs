// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fixed-size framing headers

use serde::Serialize;

use crate::codec::WireReader;
use crate::error::DecodeError;
use crate::error_code::ErrorCode;

/// Encoded size of [`RequestHeader`]
pub const REQUEST_HEADER_LEN: usize = 8;

/// Encoded size of [`ResponseHeader`]
pub const RESPONSE_HEADER_LEN: usize = 16;

/// Reserved xid of the session handshake, which travels without a header
pub const HANDSHAKE_XID: i32 = 0;

/// Reserved xid of server-pushed watch notifications
pub const NOTIFICATION_XID: i32 = -1;

/// Reserved xid of ping responses
pub const PING_XID: i32 = -2;

/// Header in front of every client request except the handshake
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RequestHeader {
    pub xid: i32,
    pub opcode: i32,
}

impl RequestHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < REQUEST_HEADER_LEN {
            return Err(DecodeError::short(REQUEST_HEADER_LEN, buf.len()));
        }
        let mut reader = WireReader::new(buf);
        Ok(Self {
            xid: reader.i32()?,
            opcode: reader.i32()?,
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.xid.to_be_bytes());
        out.extend_from_slice(&self.opcode.to_be_bytes());
    }
}

/// Header in front of every service reply except the handshake response
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseHeader {
    pub xid: i32,
    pub zxid: i64,
    pub err: ErrorCode,
}

impl ResponseHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < RESPONSE_HEADER_LEN {
            return Err(DecodeError::short(RESPONSE_HEADER_LEN, buf.len()));
        }
        let mut reader = WireReader::new(buf);
        Ok(Self {
            xid: reader.i32()?,
            zxid: reader.i64()?,
            err: ErrorCode(reader.i32()?),
        })
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.xid.to_be_bytes());
        out.extend_from_slice(&self.zxid.to_be_bytes());
        out.extend_from_slice(&self.err.0.to_be_bytes());
    }
}
