// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Static descriptions of how wire values are laid out
//!
//! Every record the observer understands is declared once as a `static`
//! [`RecordShape`]. The codec walks these declarations with a plain `match`,
//! so decoding never depends on runtime type information.

use std::fmt;

use crate::error::{DecodeError, EncodeError};
use crate::value::Value;

/// Layout of a single wire value
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// One byte, zero is false
    Bool,
    /// Big-endian signed 32-bit integer
    Int,
    /// Big-endian signed 64-bit integer
    Long,
    /// Signed 32-bit length followed by UTF-8 bytes
    Text,
    /// Signed 32-bit length followed by raw bytes; a negative length means absent
    Bytes,
    /// Unsigned 32-bit count followed by that many elements
    Seq(&'static Shape),
    /// Named fields decoded in declaration order
    Record(&'static RecordShape),
    /// Composite with its own decode routine
    Custom(&'static CustomShape),
}

impl Shape {
    /// Minimum number of bytes any encoding of this shape occupies
    pub fn min_len(&self) -> usize {
        match self {
            Shape::Bool => 1,
            Shape::Int => 4,
            Shape::Long => 8,
            Shape::Text | Shape::Bytes | Shape::Seq(_) => 4,
            Shape::Record(record) => record.min_len(),
            Shape::Custom(custom) => custom.min_len,
        }
    }

    /// Short name of the shape kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Long => "long",
            Shape::Text => "text",
            Shape::Bytes => "bytes",
            Shape::Seq(_) => "seq",
            Shape::Record(record) => record.name,
            Shape::Custom(custom) => custom.name,
        }
    }
}

/// A named composite of sub-shapes
#[derive(Debug)]
pub struct RecordShape {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl RecordShape {
    pub fn min_len(&self) -> usize {
        self.fields.iter().map(|field| field.shape.min_len()).sum()
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// One named field of a [`RecordShape`]
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
}

/// Decode routine of a custom composite: value plus bytes consumed
pub type CustomDecodeFn = fn(&[u8]) -> Result<(Value, usize), DecodeError>;

/// Encode routine of a custom composite
pub type CustomEncodeFn = fn(&Value, &mut Vec<u8>) -> Result<(), EncodeError>;

/// A composite that overrides the default field walk
pub struct CustomShape {
    pub name: &'static str,
    /// Smallest valid encoding, used to bound sequence counts before allocating
    pub min_len: usize,
    pub decode: CustomDecodeFn,
    pub encode: CustomEncodeFn,
}

impl fmt::Debug for CustomShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomShape")
            .field("name", &self.name)
            .field("min_len", &self.min_len)
            .finish_non_exhaustive()
    }
}
