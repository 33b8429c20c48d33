// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shape-driven decoding of big-endian wire buffers
//!
//! [`decode`] always starts at offset 0 of the slice it is handed and reports
//! how many bytes it consumed; callers advance their own cursor. Every read is
//! bounds checked and fails with [`DecodeError::BufferTooShort`] instead of
//! indexing past the end.

use byteorder::{BigEndian, ByteOrder};

use crate::error::DecodeError;
use crate::shape::{RecordShape, Shape};
use crate::value::{Record, Value};

/// Decode one value of `shape` from the start of `buf`
pub fn decode(buf: &[u8], shape: &Shape) -> Result<(Value, usize), DecodeError> {
    let mut reader = WireReader::new(buf);
    let value = reader.value(shape)?;
    Ok((value, reader.position()))
}

/// Decode a record from the start of `buf`
pub fn decode_record(buf: &[u8], shape: &RecordShape) -> Result<(Record, usize), DecodeError> {
    let mut reader = WireReader::new(buf);
    let record = reader.record(shape)?;
    Ok((record, reader.position()))
}

/// Bounds-checked cursor over a wire buffer
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// The unread tail of the buffer
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.available();
        if len > available {
            return Err(DecodeError::short(len, available));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

    pub fn bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Length-prefixed bytes; a negative length is the null sentinel
    pub fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.i32()?;
        if len < 0 {
            return Ok(&[]);
        }
        self.take(len as usize)
    }

    /// Length-prefixed text, decoded lossily
    pub fn text(&mut self) -> Result<String, DecodeError> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Decode the fields of `shape` in declaration order
    pub fn record(&mut self, shape: &RecordShape) -> Result<Record, DecodeError> {
        let mut fields = Vec::with_capacity(shape.fields.len());
        for field in shape.fields {
            fields.push((field.name, self.value(&field.shape)?));
        }
        Ok(Record {
            name: shape.name,
            fields,
        })
    }

    /// Decode one value of `shape` at the cursor
    pub fn value(&mut self, shape: &Shape) -> Result<Value, DecodeError> {
        let value = match shape {
            Shape::Bool => Value::Bool(self.bool()?),
            Shape::Int => Value::Int(self.i32()?),
            Shape::Long => Value::Long(self.i64()?),
            Shape::Text => Value::Text(self.text()?),
            Shape::Bytes => Value::Bytes(self.bytes()?.to_vec()),
            Shape::Seq(element) => {
                let count = self.u32()? as usize;
                // Reject impossible counts before allocating for them
                let needed = count.saturating_mul(element.min_len());
                let available = self.available();
                if needed > available {
                    return Err(DecodeError::short(needed, available));
                }
                let mut items = Vec::with_capacity(count.min(available));
                for _ in 0..count {
                    items.push(self.value(element)?);
                }
                Value::Seq(items)
            }
            Shape::Record(record) => Value::Record(self.record(record)?),
            Shape::Custom(custom) => {
                let (value, consumed) = (custom.decode)(self.remaining())?;
                self.skip(consumed)?;
                value
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ACL_ELEMENT, STAT};

    #[test]
    fn reads_big_endian_primitives() {
        let buf = [0x00, 0x00, 0x01, 0x02, 0xff, 0xff, 0xff, 0xfe];
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.i32().unwrap(), 0x0102);
        assert_eq!(reader.i32().unwrap(), -2);
        assert_eq!(reader.available(), 0);
    }

    #[test]
    fn bool_is_any_nonzero_byte() {
        assert_eq!(decode(&[0x00], &Shape::Bool).unwrap(), (Value::Bool(false), 1));
        assert_eq!(decode(&[0x01], &Shape::Bool).unwrap(), (Value::Bool(true), 1));
        assert_eq!(decode(&[0x7f], &Shape::Bool).unwrap(), (Value::Bool(true), 1));
    }

    #[test]
    fn negative_length_text_is_empty() {
        let buf = (-1_i32).to_be_bytes();
        assert_eq!(decode(&buf, &Shape::Text).unwrap(), (Value::Text(String::new()), 4));
    }

    #[test]
    fn text_length_past_end_is_short() {
        let mut buf = 10_i32.to_be_bytes().to_vec();
        buf.extend_from_slice(b"abc");
        assert_eq!(
            decode(&buf, &Shape::Text).unwrap_err(),
            DecodeError::BufferTooShort {
                needed: 10,
                available: 3
            }
        );
    }

    #[test]
    fn huge_sequence_count_is_rejected_without_allocating() {
        let buf = u32::MAX.to_be_bytes();
        let err = decode(&buf, &Shape::Seq(&ACL_ELEMENT)).unwrap_err();
        assert!(matches!(err, DecodeError::BufferTooShort { available: 0, .. }));
    }

    #[test]
    fn truncated_stat_is_short() {
        let buf = vec![0_u8; STAT.min_len() - 1];
        assert!(matches!(
            decode(&buf, &Shape::Record(&STAT)).unwrap_err(),
            DecodeError::BufferTooShort { .. }
        ));
    }

    #[test]
    fn decode_starts_at_slice_offset_zero() {
        let mut buf = 7_i32.to_be_bytes().to_vec();
        buf.extend_from_slice(&9_i32.to_be_bytes());
        let (first, used) = decode(&buf, &Shape::Int).unwrap();
        let (second, _) = decode(&buf[used..], &Shape::Int).unwrap();
        assert_eq!(first, Value::Int(7));
        assert_eq!(second, Value::Int(9));
    }
}
