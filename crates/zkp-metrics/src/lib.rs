// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Prometheus metrics for observed ZooKeeper traffic
//!
//! [`Metrics`] owns its own registry so several captures (or tests) can run
//! side by side. [`PrometheusObserver`] plugs it into the correlation engine.

use std::sync::Arc;
use std::time::Duration;

use prometheus::{
    exponential_buckets, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::trace;
use zkp_correlate::{Direction, Observer, TrackedOp};
use zkp_proto::{DecodeError, ErrorCode, OpCode, WatcherEvent};

/// Operation label used for server-pushed watch events
pub const WATCH_NOTIFICATION: &str = "watch_notification";

/// Metric collection backing the `/metrics` endpoint
pub struct Metrics {
    registry: Registry,

    // Operation metrics
    /// Operations seen, by operation, direction and watch flag
    pub operations_total: IntCounterVec,
    /// Request to response latency by operation
    pub operation_duration_seconds: HistogramVec,

    // Session metrics
    pub handshakes_total: IntCounterVec,
    pub pings_total: IntCounterVec,
    /// Requests still waiting for a response
    pub pending_requests: IntGauge,

    // Error metrics
    pub decode_errors_total: IntCounterVec,
    pub server_errors_total: IntCounterVec,
    pub untracked_responses_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new("zk_operations_total", "Total number of observed operations"),
            &["operation", "direction", "watch"],
        )?;

        // 100us doubling up to ~3.3s
        let operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "zk_operation_duration_seconds",
                "Time between a request and its response in seconds",
            )
            .buckets(exponential_buckets(0.0001, 2.0, 16)?),
            &["operation"],
        )?;

        let handshakes_total = IntCounterVec::new(
            Opts::new("zk_handshakes_total", "Session handshake packets"),
            &["direction"],
        )?;

        let pings_total = IntCounterVec::new(
            Opts::new("zk_pings_total", "Ping packets"),
            &["direction"],
        )?;

        let pending_requests = IntGauge::new(
            "zk_pending_requests",
            "Requests waiting for a response",
        )?;

        let decode_errors_total = IntCounterVec::new(
            Opts::new("zk_decode_errors_total", "Packets that failed to decode"),
            &["kind"],
        )?;

        let server_errors_total = IntCounterVec::new(
            Opts::new("zk_server_errors_total", "Responses carrying an error code"),
            &["error"],
        )?;

        let untracked_responses_total = IntCounter::new(
            "zk_untracked_responses_total",
            "Responses with no matching observed request",
        )?;

        registry.register(Box::new(operations_total.clone()))?;
        registry.register(Box::new(operation_duration_seconds.clone()))?;
        registry.register(Box::new(handshakes_total.clone()))?;
        registry.register(Box::new(pings_total.clone()))?;
        registry.register(Box::new(pending_requests.clone()))?;
        registry.register(Box::new(decode_errors_total.clone()))?;
        registry.register(Box::new(server_errors_total.clone()))?;
        registry.register(Box::new(untracked_responses_total.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration_seconds,
            handshakes_total,
            pings_total,
            pending_requests,
            decode_errors_total,
            server_errors_total,
            untracked_responses_total,
        })
    }

    /// Renders metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_else(|e| format!("# Error encoding metrics: {e}\n"))
    }

    pub fn record_operation(&self, operation: &str, direction: Direction, watch: bool) {
        self.operations_total
            .with_label_values(&[operation, direction.as_str(), if watch { "true" } else { "false" }])
            .inc();
    }

    pub fn record_latency(&self, op: OpCode, elapsed: Duration) {
        self.operation_duration_seconds
            .with_label_values(&[op.name()])
            .observe(elapsed.as_secs_f64());
    }
}

/// Engine observer feeding a shared [`Metrics`]
#[derive(Clone)]
pub struct PrometheusObserver {
    metrics: Arc<Metrics>,
}

impl PrometheusObserver {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

impl Observer for PrometheusObserver {
    fn operation(&mut self, op: TrackedOp, direction: Direction) {
        self.metrics.record_operation(op.op.name(), direction, op.watch);
    }

    fn latency(&mut self, op: OpCode, elapsed: Duration) {
        self.metrics.record_latency(op, elapsed);
    }

    fn handshake(&mut self, direction: Direction) {
        self.metrics
            .handshakes_total
            .with_label_values(&[direction.as_str()])
            .inc();
    }

    fn ping(&mut self, direction: Direction) {
        self.metrics
            .pings_total
            .with_label_values(&[direction.as_str()])
            .inc();
    }

    fn watch_notification(&mut self, _event: Option<&WatcherEvent>) {
        self.metrics
            .record_operation(WATCH_NOTIFICATION, Direction::Outgoing, false);
    }

    fn server_error(&mut self, code: ErrorCode) {
        self.metrics
            .server_errors_total
            .with_label_values(&[code.0.to_string().as_str()])
            .inc();
    }

    fn untracked_response(&mut self) {
        self.metrics.untracked_responses_total.inc();
    }

    fn decode_error(&mut self, error: &DecodeError) {
        trace!(kind = error.kind(), "counting decode error");
        self.metrics
            .decode_errors_total
            .with_label_values(&[error.kind()])
            .inc();
    }

    fn pending(&mut self, count: usize) {
        self.metrics
            .pending_requests
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> PrometheusObserver {
        PrometheusObserver::new(Arc::new(Metrics::new().unwrap()))
    }

    #[test]
    fn test_operation_labels() {
        let mut observer = observer();
        observer.operation(TrackedOp::new(OpCode::GetData, true), Direction::Incoming);
        let output = observer.metrics().render();
        assert!(output.contains(
            r#"zk_operations_total{direction="incoming",operation="GetData",watch="true"} 1"#
        ));
    }

    #[test]
    fn test_latency_histogram_buckets() {
        let mut observer = observer();
        observer.latency(OpCode::Create, Duration::from_millis(2));
        let output = observer.metrics().render();
        assert!(output.contains(r#"zk_operation_duration_seconds_bucket{operation="Create",le="0.0001"} 0"#));
        assert!(output.contains(r#"zk_operation_duration_seconds_bucket{operation="Create",le="0.0032"} 1"#));
        assert!(output.contains(r#"zk_operation_duration_seconds_count{operation="Create"} 1"#));
    }

    #[test]
    fn test_watch_notification_counts_as_outgoing_operation() {
        let mut observer = observer();
        observer.watch_notification(None);
        let output = observer.metrics().render();
        assert!(output.contains(
            r#"zk_operations_total{direction="outgoing",operation="watch_notification",watch="false"} 1"#
        ));
    }

    #[test]
    fn test_error_and_pending_metrics() {
        let mut observer = observer();
        observer.server_error(ErrorCode::NO_NODE);
        observer.decode_error(&DecodeError::UnknownOperation(77));
        observer.untracked_response();
        observer.pending(3);

        let metrics = observer.metrics();
        assert_eq!(metrics.server_errors_total.with_label_values(&["-101"]).get(), 1);
        assert_eq!(
            metrics
                .decode_errors_total
                .with_label_values(&["unknown_operation"])
                .get(),
            1
        );
        assert_eq!(metrics.untracked_responses_total.get(), 1);
        assert_eq!(metrics.pending_requests.get(), 3);
    }

    #[test]
    fn test_instances_are_independent() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.untracked_responses_total.inc();
        assert_eq!(second.untracked_responses_total.get(), 0);
    }
}
