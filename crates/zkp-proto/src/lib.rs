// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! ZooKeeper wire protocol: shapes, codec and operation catalog
//!
//! This crate turns raw protocol payloads into typed values. Record layouts
//! are declared as static [`RecordShape`]s, decoded by the shape-driven
//! [`codec`], and looked up per operation through the [`ops`] catalog.
//! Multi-operation bodies go through the [`chain`] decoder.

pub mod chain;
pub mod codec;
pub mod encode;
pub mod error;
pub mod error_code;
pub mod event;
pub mod header;
pub mod ops;
pub mod records;
pub mod shape;
pub mod value;

// Re-export key types
pub use chain::{
    decode_chain, encode_chain, ChainEntry, ChainEntryError, ChainHeader, ChainMode, ChainResult,
    CHAIN_HEADER_LEN,
};
pub use codec::{decode, decode_record, WireReader};
pub use encode::{encode, encode_record, to_bytes};
pub use error::{DecodeError, EncodeError};
pub use error_code::ErrorCode;
pub use event::{EventType, KeeperState, WatcherEvent};
pub use header::{
    RequestHeader, ResponseHeader, HANDSHAKE_XID, NOTIFICATION_XID, PING_XID, REQUEST_HEADER_LEN,
    RESPONSE_HEADER_LEN,
};
pub use ops::{lookup, CatalogEntry, Category, OpCode};
pub use shape::{CustomShape, Field, RecordShape, Shape};
pub use value::{Record, Value};
