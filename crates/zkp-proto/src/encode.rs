// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Inverse of the codec, used to build fixtures and replay captured values

use crate::error::EncodeError;
use crate::shape::{RecordShape, Shape};
use crate::value::{Record, Value};

/// Encode `value` as `shape`, appending to `out`
pub fn encode(value: &Value, shape: &Shape, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (shape, value) {
        (Shape::Bool, Value::Bool(v)) => out.push(u8::from(*v)),
        (Shape::Int, Value::Int(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (Shape::Long, Value::Long(v)) => out.extend_from_slice(&v.to_be_bytes()),
        (Shape::Text, Value::Text(v)) => write_len_prefixed(v.as_bytes(), out)?,
        (Shape::Bytes, Value::Bytes(v)) => write_len_prefixed(v, out)?,
        (Shape::Seq(element), Value::Seq(items)) => {
            write_count(items.len(), out)?;
            for item in items {
                encode(item, element, out)?;
            }
        }
        (Shape::Record(record_shape), Value::Record(record)) => {
            encode_record(record, record_shape, out)?
        }
        (Shape::Custom(custom), value) => (custom.encode)(value, out)?,
        (shape, value) => {
            return Err(EncodeError::ShapeMismatch {
                expected: shape.kind(),
                found: value.kind(),
            })
        }
    }
    Ok(())
}

/// Encode the fields `shape` declares, looked up by name in `record`
pub fn encode_record(
    record: &Record,
    shape: &RecordShape,
    out: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    for field in shape.fields {
        let value = record.get(field.name).ok_or(EncodeError::MissingField {
            record: shape.name,
            field: field.name,
        })?;
        encode(value, &field.shape, out)?;
    }
    Ok(())
}

/// Convenience wrapper returning a fresh buffer
pub fn to_bytes(value: &Value, shape: &Shape) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode(value, shape, &mut out)?;
    Ok(out)
}

/// Encode a value by its own structure, without a shape to check against
///
/// Records are written in field order. Used for payloads whose shape was
/// chosen at decode time, such as multi-operation entries.
pub fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value {
        Value::Bool(v) => out.push(u8::from(*v)),
        Value::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Text(v) => write_len_prefixed(v.as_bytes(), out)?,
        Value::Bytes(v) => write_len_prefixed(v, out)?,
        Value::Seq(items) => {
            write_count(items.len(), out)?;
            for item in items {
                write_value(item, out)?;
            }
        }
        Value::Record(record) => {
            for (_, field) in &record.fields {
                write_value(field, out)?;
            }
        }
        Value::Chain(chain) => crate::chain::encode_chain(chain, out)?,
    }
    Ok(())
}

fn write_len_prefixed(bytes: &[u8], out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let len = i32::try_from(bytes.len()).map_err(|_| EncodeError::TooLong(bytes.len()))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_count(count: usize, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let count32 = u32::try_from(count).map_err(|_| EncodeError::TooLong(count))?;
    out.extend_from_slice(&count32.to_be_bytes());
    Ok(())
}
