// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Multi-operation chains
//!
//! A chain is a run of `{opcode, done, err}` headers, each followed by the
//! payload of its sub-operation, terminated by a header with `done` set.
//! Responses report a per-entry error code; the first failing entry's
//! message becomes the chain's error but decoding always runs to the end.

use serde::Serialize;
use thiserror::Error;

use crate::codec::WireReader;
use crate::encode::write_value;
use crate::error::{DecodeError, EncodeError};
use crate::error_code::ErrorCode;
use crate::ops::{self, Category, OpCode};
use crate::records::{CREATE2_RESPONSE, STAT};
use crate::shape::{CustomShape, Shape};
use crate::value::Value;

/// Encoded size of a [`ChainHeader`]
pub const CHAIN_HEADER_LEN: usize = 9;

/// Per-entry header inside a chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChainHeader {
    pub opcode: i32,
    pub done: bool,
    pub err: ErrorCode,
}

impl ChainHeader {
    /// Header that ends a chain; requests and responses both use err -1
    pub const TERMINATOR: ChainHeader = ChainHeader {
        opcode: -1,
        done: true,
        err: ErrorCode(-1),
    };

    fn read(reader: &mut WireReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            opcode: reader.i32()?,
            done: reader.bool()?,
            err: ErrorCode(reader.i32()?),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.opcode.to_be_bytes());
        out.push(u8::from(self.done));
        out.extend_from_slice(&self.err.0.to_be_bytes());
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainEntry {
    pub header: ChainHeader,
    pub payload: Option<Value>,
}

/// First failing entry of a response chain
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ChainEntryError {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl From<ErrorCode> for ChainEntryError {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainResult {
    /// Entries in wire order, excluding the terminating header
    pub entries: Vec<ChainEntry>,
    pub terminator: ChainHeader,
    pub error: Option<ChainEntryError>,
}

/// Which side of the conversation a chain came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainMode {
    /// Payloads follow the sub-operation's request shape
    Request,
    /// Payloads follow the multi-response layout
    Response,
}

/// Decode a chain from the start of `buf`
pub fn decode_chain(buf: &[u8], mode: ChainMode) -> Result<(ChainResult, usize), DecodeError> {
    let mut reader = WireReader::new(buf);
    let mut entries = Vec::new();
    let mut error = None;

    let terminator = loop {
        let header = ChainHeader::read(&mut reader)?;
        if header.done {
            break header;
        }
        let payload = match mode {
            ChainMode::Request => {
                let entry = ops::lookup(header.opcode)?;
                // Chains do not nest
                if entry.category == Category::Chain {
                    return Err(DecodeError::UnknownOperation(header.opcode));
                }
                Some(reader.value(&entry.request)?)
            }
            ChainMode::Response => {
                if error.is_none() && !header.err.is_ok() {
                    error = Some(ChainEntryError::from(header.err));
                }
                response_payload(&mut reader, header.opcode)?
            }
        };
        entries.push(ChainEntry { header, payload });
    };

    let result = ChainResult {
        entries,
        terminator,
        error,
    };
    Ok((result, reader.position()))
}

fn response_payload(
    reader: &mut WireReader<'_>,
    opcode: i32,
) -> Result<Option<Value>, DecodeError> {
    let payload = match OpCode::from_code(opcode) {
        Some(OpCode::Create | OpCode::CreateContainer) => Some(reader.value(&Shape::Text)?),
        Some(OpCode::Create2 | OpCode::CreateTtl) => {
            Some(reader.value(&Shape::Record(&CREATE2_RESPONSE))?)
        }
        Some(OpCode::SetData) => Some(reader.value(&Shape::Record(&STAT))?),
        Some(OpCode::Check | OpCode::Delete | OpCode::Error) => None,
        _ => return Err(DecodeError::UnknownOperation(opcode)),
    };
    Ok(payload)
}

/// Encode a chain, entries then its terminator
pub fn encode_chain(chain: &ChainResult, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    for entry in &chain.entries {
        entry.header.write(out);
        if let Some(payload) = &entry.payload {
            write_value(payload, out)?;
        }
    }
    chain.terminator.write(out);
    Ok(())
}

/// Request body of a multi operation
pub static CHAIN_REQUEST: CustomShape = CustomShape {
    name: "MultiRequest",
    min_len: CHAIN_HEADER_LEN,
    decode: decode_request_chain,
    encode: encode_chain_value,
};

/// Response body of a multi operation
pub static CHAIN_RESPONSE: CustomShape = CustomShape {
    name: "MultiResponse",
    min_len: CHAIN_HEADER_LEN,
    decode: decode_response_chain,
    encode: encode_chain_value,
};

fn decode_request_chain(buf: &[u8]) -> Result<(Value, usize), DecodeError> {
    let (chain, consumed) = decode_chain(buf, ChainMode::Request)?;
    Ok((Value::from(chain), consumed))
}

fn decode_response_chain(buf: &[u8]) -> Result<(Value, usize), DecodeError> {
    let (chain, consumed) = decode_chain(buf, ChainMode::Response)?;
    Ok((Value::from(chain), consumed))
}

fn encode_chain_value(value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value {
        Value::Chain(chain) => encode_chain(chain, out),
        other => Err(EncodeError::ShapeMismatch {
            expected: "chain",
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MULTI_HEADER;
    use pretty_assertions::assert_eq;

    fn header(opcode: i32, err: i32) -> ChainHeader {
        ChainHeader {
            opcode,
            done: false,
            err: ErrorCode(err),
        }
    }

    #[test]
    fn header_length_matches_record_layout() {
        assert_eq!(CHAIN_HEADER_LEN, MULTI_HEADER.min_len());
    }

    #[test]
    fn terminator_only() {
        let mut buf = Vec::new();
        ChainHeader::TERMINATOR.write(&mut buf);
        let (chain, consumed) = decode_chain(&buf, ChainMode::Response).unwrap();
        assert!(chain.entries.is_empty());
        assert_eq!(chain.error, None);
        assert_eq!(consumed, CHAIN_HEADER_LEN);
    }

    #[test]
    fn create_and_check_responses() {
        let mut buf = Vec::new();
        header(1, 0).write(&mut buf);
        buf.extend_from_slice(&[0, 0, 0, 2, b'/', b'a']);
        header(13, 0).write(&mut buf);
        ChainHeader::TERMINATOR.write(&mut buf);

        let (chain, consumed) = decode_chain(&buf, ChainMode::Response).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(chain.entries.len(), 2);
        assert_eq!(chain.entries[0].payload, Some(Value::from("/a")));
        assert_eq!(chain.entries[1].payload, None);
        assert_eq!(chain.error, None);
    }

    #[test]
    fn first_failure_wins_and_decoding_continues() {
        let mut buf = Vec::new();
        header(-1, -101).write(&mut buf);
        header(-1, -110).write(&mut buf);
        ChainHeader::TERMINATOR.write(&mut buf);

        let (chain, _) = decode_chain(&buf, ChainMode::Response).unwrap();
        assert_eq!(chain.entries.len(), 2);
        let error = chain.error.unwrap();
        assert_eq!(error.code, ErrorCode::NO_NODE);
        assert_eq!(error.to_string(), "node does not exist");
    }

    #[test]
    fn unsupported_response_opcode() {
        let mut buf = Vec::new();
        header(4, 0).write(&mut buf);
        assert_eq!(
            decode_chain(&buf, ChainMode::Response).unwrap_err(),
            DecodeError::UnknownOperation(4)
        );
    }

    #[test]
    fn missing_terminator_is_short() {
        let mut buf = Vec::new();
        header(2, 0).write(&mut buf);
        assert!(matches!(
            decode_chain(&buf, ChainMode::Response).unwrap_err(),
            DecodeError::BufferTooShort { .. }
        ));
    }

    #[test]
    fn request_mode_uses_catalog_request_shapes() {
        let mut buf = Vec::new();
        // Requests carry err -1 on every header
        header(2, -1).write(&mut buf);
        buf.extend_from_slice(&[0, 0, 0, 2, b'/', b'x']);
        buf.extend_from_slice(&3_i32.to_be_bytes());
        ChainHeader::TERMINATOR.write(&mut buf);

        let (chain, consumed) = decode_chain(&buf, ChainMode::Request).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(chain.error, None);
        let delete = chain.entries[0].payload.as_ref().and_then(Value::as_record).unwrap();
        assert_eq!(delete.name, "DeleteRequest");
        assert_eq!(delete.get_text("path"), Some("/x"));
        assert_eq!(delete.get_int("version"), Some(3));
    }

    #[test]
    fn nested_chain_request_is_rejected() {
        let mut buf = Vec::new();
        for _ in 0..10_000 {
            header(14, -1).write(&mut buf);
        }
        assert_eq!(
            decode_chain(&buf, ChainMode::Request).unwrap_err(),
            DecodeError::UnknownOperation(14)
        );
    }

    #[test]
    fn encode_chain_reproduces_wire_bytes() {
        let mut buf = Vec::new();
        header(5, 0).write(&mut buf);
        buf.extend_from_slice(&[0_u8; 68]);
        ChainHeader::TERMINATOR.write(&mut buf);

        let (chain, _) = decode_chain(&buf, ChainMode::Response).unwrap();
        let mut encoded = Vec::new();
        encode_chain(&chain, &mut encoded).unwrap();
        assert_eq!(encoded, buf);
    }
}
