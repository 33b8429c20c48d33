// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::fs::File;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use etherparse::PacketBuilder;
use pcap_file::pcap::{PcapPacket, PcapWriter};
use pretty_assertions::assert_eq;
use zkp_cli::{open_source, CaptureConfig, Pipeline, PipelineStats};
use zkp_metrics::{Metrics, PrometheusObserver};
use zkp_proto::records::{ACL, CREATE_REQUEST, CREATE_RESPONSE};
use zkp_proto::{
    encode_record, ErrorCode, OpCode, Record, RequestHeader, ResponseHeader, Value,
};

const CLIENT: [u8; 4] = [10, 1, 0, 5];
const SERVER: [u8; 4] = [10, 1, 0, 9];
const CLIENT_PORT: u16 = 41000;
const SERVICE_PORT: u16 = 2181;

fn framed(body: Vec<u8>) -> Vec<u8> {
    let mut payload = (body.len() as u32).to_be_bytes().to_vec();
    payload.extend(body);
    payload
}

fn create_request(xid: i32) -> Vec<u8> {
    let mut body = Vec::new();
    RequestHeader {
        xid,
        opcode: OpCode::Create.code(),
    }
    .encode(&mut body);
    let acl = Record::new(ACL.name)
        .with("perms", 31)
        .with("scheme", "world")
        .with("id", "anyone");
    let request = Record::new(CREATE_REQUEST.name)
        .with("path", "/locks/a")
        .with("data", Vec::<u8>::new())
        .with("acl", vec![Value::Record(acl)])
        .with("flags", 0);
    encode_record(&request, &CREATE_REQUEST, &mut body).unwrap();
    framed(body)
}

fn create_response(xid: i32, err: ErrorCode) -> Vec<u8> {
    let mut body = Vec::new();
    ResponseHeader { xid, zxid: 77, err }.encode(&mut body);
    if err == ErrorCode::OK {
        let response = Record::new(CREATE_RESPONSE.name).with("path", "/locks/a");
        encode_record(&response, &CREATE_RESPONSE, &mut body).unwrap();
    }
    framed(body)
}

fn frame(to_service: bool, payload: &[u8]) -> Vec<u8> {
    let (src, dst, src_port, dst_port) = if to_service {
        (CLIENT, SERVER, CLIENT_PORT, SERVICE_PORT)
    } else {
        (SERVER, CLIENT, SERVICE_PORT, CLIENT_PORT)
    };
    let builder = PacketBuilder::ethernet2([2, 0, 0, 0, 0, 1], [2, 0, 0, 0, 0, 2])
        .ipv4(src, dst, 64)
        .tcp(src_port, dst_port, 1, 8192);
    let mut data = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut data, payload).unwrap();
    data
}

fn write_capture(frames: &[(u64, Vec<u8>)]) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new()
        .prefix("zk-packet-")
        .suffix(".pcap")
        .tempfile()
        .unwrap();
    let mut writer = PcapWriter::new(File::create(file.path()).unwrap()).unwrap();
    for (millis, data) in frames {
        writer
            .write_packet(&PcapPacket::new(
                Duration::from_millis(*millis),
                data.len() as u32,
                data,
            ))
            .unwrap();
    }
    file
}

fn run_capture(capture: &tempfile::NamedTempFile) -> (PipelineStats, Arc<Metrics>) {
    let config = CaptureConfig {
        pcap_file: Some(capture.path().to_path_buf()),
        ..Default::default()
    };
    let stop = Arc::new(AtomicBool::new(false));
    let mut source = open_source(&config, stop.clone()).unwrap();

    let metrics = Arc::new(Metrics::new().unwrap());
    let mut pipeline = Pipeline::new(config.service_port, PrometheusObserver::new(metrics.clone()));
    pipeline.run(source.as_mut(), &stop).unwrap();
    assert!(pipeline.engine().pending().is_empty());
    (pipeline.stats(), metrics)
}

#[test]
fn test_create_round_trip_is_timed() {
    let capture = write_capture(&[
        (10_000, frame(true, &create_request(5))),
        (10_002, frame(false, &create_response(5, ErrorCode::OK))),
    ]);

    let (stats, metrics) = run_capture(&capture);
    assert_eq!(
        stats,
        PipelineStats {
            segments: 2,
            decoded: 2,
            decode_errors: 0,
            ignored: 0,
        }
    );

    let output = metrics.render();
    assert!(output.contains(
        r#"zk_operations_total{direction="incoming",operation="Create",watch="false"} 1"#
    ));
    assert!(output.contains(r#"zk_operation_duration_seconds_count{operation="Create"} 1"#));
    assert!(output.contains(r#"zk_operation_duration_seconds_bucket{operation="Create",le="0.0032"} 1"#));
    assert!(output.contains("zk_pending_requests 0"));
}

#[test]
fn test_error_response_counts_server_error() {
    let capture = write_capture(&[
        (1_000, frame(true, &create_request(9))),
        (1_001, frame(false, &create_response(9, ErrorCode::NODE_EXISTS))),
        // response with no request
        (1_002, frame(false, &create_response(42, ErrorCode::OK))),
    ]);

    let (stats, metrics) = run_capture(&capture);
    assert_eq!(stats.decoded, 3);
    assert_eq!(
        metrics.server_errors_total.with_label_values(&["-110"]).get(),
        1
    );
    assert_eq!(metrics.untracked_responses_total.get(), 1);
}

#[test]
fn test_unknown_opcode_is_a_decode_error() {
    let mut body = Vec::new();
    RequestHeader { xid: 3, opcode: 999 }.encode(&mut body);
    let capture = write_capture(&[(1_000, frame(true, &framed(body)))]);

    let (stats, metrics) = run_capture(&capture);
    assert_eq!(stats.decode_errors, 1);
    assert_eq!(
        metrics
            .decode_errors_total
            .with_label_values(&["unknown_operation"])
            .get(),
        1
    );
}
