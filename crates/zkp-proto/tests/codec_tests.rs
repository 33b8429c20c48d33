// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use pretty_assertions::assert_eq;
use zkp_proto::records::{ACL, CREATE_REQUEST, GET_DATA_RESPONSE, STAT};
use zkp_proto::*;

fn stat(version: i32) -> Record {
    Record::new("Stat")
        .with("czxid", 1_i64)
        .with("mzxid", 2_i64)
        .with("ctime", 1_700_000_000_000_i64)
        .with("mtime", 1_700_000_000_500_i64)
        .with("version", version)
        .with("cversion", 0)
        .with("aversion", 0)
        .with("ephemeralOwner", 0_i64)
        .with("dataLength", 5)
        .with("numChildren", 0)
        .with("pzxid", 2_i64)
}

fn create_request() -> Value {
    let acl = Record::new(ACL.name)
        .with("perms", 31)
        .with("scheme", "world")
        .with("id", "anyone");
    Value::Record(
        Record::new(CREATE_REQUEST.name)
            .with("path", "/app/lock-")
            .with("data", b"owner".to_vec())
            .with("acl", vec![Value::Record(acl)])
            .with("flags", 3),
    )
}

#[test]
fn test_create_request_round_trip() {
    let shape = Shape::Record(&CREATE_REQUEST);
    let value = create_request();
    let bytes = to_bytes(&value, &shape).unwrap();
    let (decoded, consumed) = decode(&bytes, &shape).unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(decoded, value);
}

#[test]
fn test_get_data_response_round_trip() {
    let shape = Shape::Record(&GET_DATA_RESPONSE);
    let value = Value::Record(
        Record::new(GET_DATA_RESPONSE.name)
            .with("data", b"hello".to_vec())
            .with("stat", stat(4)),
    );
    let bytes = to_bytes(&value, &shape).unwrap();
    assert_eq!(bytes.len(), 4 + 5 + STAT.min_len());
    assert_eq!(decode(&bytes, &shape).unwrap(), (value, bytes.len()));
}

#[test]
fn test_negative_length_bytes_decode_empty() {
    for length in [-1_i32, -1000, i32::MIN] {
        let mut buf = length.to_be_bytes().to_vec();
        // trailing bytes must not be consumed
        buf.extend_from_slice(&[0xaa; 8]);
        let (value, consumed) = decode(&buf, &Shape::Bytes).unwrap();
        assert_eq!(value, Value::Bytes(Vec::new()), "length {length}");
        assert_eq!(consumed, 4, "length {length}");
    }
}

#[test]
fn test_null_data_inside_record() {
    let shape = Shape::Record(&GET_DATA_RESPONSE);
    let mut buf = (-1_i32).to_be_bytes().to_vec();
    buf.extend_from_slice(&[0_u8; 68]);
    let (value, consumed) = decode(&buf, &shape).unwrap();
    assert_eq!(consumed, buf.len());
    let record = value.as_record().unwrap();
    assert_eq!(record.get("data").and_then(Value::as_bytes), Some(&[][..]));
}

#[test]
fn test_every_truncation_of_a_request_is_short() {
    let shape = Shape::Record(&CREATE_REQUEST);
    let bytes = to_bytes(&create_request(), &shape).unwrap();
    for len in 0..bytes.len() {
        let err = decode(&bytes[..len], &shape).unwrap_err();
        assert!(
            matches!(err, DecodeError::BufferTooShort { .. }),
            "truncated to {len}: {err}"
        );
    }
}

#[test]
fn test_every_catalog_request_rejects_short_input() {
    for entry in zkp_proto::ops::entries() {
        let min = entry.request.min_len();
        if min == 0 {
            continue;
        }
        let buf = vec![0_u8; min - 1];
        assert!(
            matches!(
                decode(&buf, &entry.request),
                Err(DecodeError::BufferTooShort { .. })
            ),
            "{}",
            entry.op
        );
    }
}

#[test]
fn test_header_lengths() {
    assert_eq!(REQUEST_HEADER_LEN, 8);
    assert_eq!(RESPONSE_HEADER_LEN, 16);
    assert_eq!(
        RequestHeader::decode(&[0; 4]).unwrap_err(),
        DecodeError::BufferTooShort {
            needed: 8,
            available: 4
        }
    );
}

fn chain_header(opcode: i32, done: bool, err: i32, out: &mut Vec<u8>) {
    out.extend_from_slice(&opcode.to_be_bytes());
    out.push(u8::from(done));
    out.extend_from_slice(&err.to_be_bytes());
}

#[test]
fn test_two_entry_chain_without_errors() {
    let mut buf = Vec::new();
    chain_header(OpCode::Create.code(), false, 0, &mut buf);
    buf.extend_from_slice(&[0, 0, 0, 2, b'/', b'a']);
    chain_header(OpCode::SetData.code(), false, 0, &mut buf);
    buf.extend_from_slice(&to_bytes(&Value::Record(stat(3)), &Shape::Record(&STAT)).unwrap());
    chain_header(-1, true, -1, &mut buf);

    let (chain, consumed) = decode_chain(&buf, ChainMode::Response).unwrap();
    assert_eq!(consumed, buf.len());
    assert_eq!(chain.entries.len(), 2);
    assert_eq!(chain.entries[0].header.opcode, OpCode::Create.code());
    assert_eq!(chain.entries[0].payload, Some(Value::from("/a")));
    assert_eq!(chain.entries[1].header.opcode, OpCode::SetData.code());
    let stat = chain.entries[1].payload.as_ref().and_then(Value::as_record).unwrap();
    assert_eq!(stat.get_int("version"), Some(3));
    assert_eq!(stat.get_int("dataLength"), Some(5));
    assert_eq!(chain.error, None);
    assert_eq!(chain.terminator, ChainHeader::TERMINATOR);
}

#[test]
fn test_chain_error_is_first_failure() {
    let mut buf = Vec::new();
    chain_header(-1, false, -101, &mut buf);
    chain_header(-1, false, -2, &mut buf);
    chain_header(-1, true, -1, &mut buf);

    let (chain, _) = decode_chain(&buf, ChainMode::Response).unwrap();
    assert_eq!(chain.entries.len(), 2);
    assert_eq!(
        chain.error.map(|e| e.message),
        Some("node does not exist")
    );
}

#[test]
fn test_multi_through_catalog_shape() {
    let multi = lookup(OpCode::Multi.code()).unwrap();
    let mut buf = Vec::new();
    chain_header(5, false, 0, &mut buf);
    buf.extend_from_slice(&to_bytes(&Value::Record(stat(9)), &Shape::Record(&STAT)).unwrap());
    chain_header(-1, true, -1, &mut buf);

    let (value, consumed) = decode(&buf, &multi.response).unwrap();
    assert_eq!(consumed, buf.len());
    let chain = value.as_chain().unwrap();
    let stat = chain.entries[0].payload.as_ref().and_then(Value::as_record).unwrap();
    assert_eq!(stat.get_int("version"), Some(9));

    // The custom shape encodes back to the same bytes
    assert_eq!(to_bytes(&value, &multi.response).unwrap(), buf);
}
