// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the wire codec

use thiserror::Error;

/// Failure to decode a buffer against a shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes were available than a fixed-size field or declared length requires
    #[error("buffer too short: needed {needed} bytes, {available} available")]
    BufferTooShort { needed: usize, available: usize },

    /// The operation code is not part of the catalog
    #[error("unknown operation code {0}")]
    UnknownOperation(i32),
}

impl DecodeError {
    /// Short label used for log fields and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::BufferTooShort { .. } => "buffer_too_short",
            DecodeError::UnknownOperation(_) => "unknown_operation",
        }
    }

    pub(crate) fn short(needed: usize, available: usize) -> Self {
        DecodeError::BufferTooShort { needed, available }
    }
}

/// Failure to encode a value against a shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("value does not match shape: expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("record {record} is missing field {field}")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("length {0} does not fit a 32-bit length prefix")]
    TooLong(usize),
}
