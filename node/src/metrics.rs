//! # Prometheus Metrics
//!
//! Exposes operational metrics for the gateway. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::core::Collector;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the node.
///
/// Clone-friendly (prometheus handles are reference-counted) so it can be
/// shared across request handlers.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Operations that ran in a transaction and committed.
    pub operations_submitted_total: IntCounter,
    /// Read-only operations served.
    pub operations_evaluated_total: IntCounter,
    /// Operations rejected by the engine or by the store.
    pub operations_failed_total: IntCounter,
    /// Commits rejected because a key in the read set changed.
    pub commit_conflicts_total: IntCounter,
    /// Entries in the world state after the latest commit.
    pub stored_entries: IntGauge,
    /// Histogram of operation latency in seconds.
    pub operation_latency_seconds: Histogram,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("credledger".into()), None)?;

        let operations_submitted_total = register(
            &registry,
            IntCounter::new(
                "operations_submitted_total",
                "Total number of committed ledger operations",
            )?,
        )?;

        let operations_evaluated_total = register(
            &registry,
            IntCounter::new(
                "operations_evaluated_total",
                "Total number of read-only ledger operations",
            )?,
        )?;

        let operations_failed_total = register(
            &registry,
            IntCounter::new(
                "operations_failed_total",
                "Total number of ledger operations that returned an error",
            )?,
        )?;

        let commit_conflicts_total = register(
            &registry,
            IntCounter::new(
                "commit_conflicts_total",
                "Total number of commits rejected by a read-set conflict",
            )?,
        )?;

        let stored_entries = register(
            &registry,
            IntGauge::new("stored_entries", "Number of entries in the world state")?,
        )?;

        let operation_latency_seconds = register(
            &registry,
            Histogram::with_opts(
                HistogramOpts::new(
                    "operation_latency_seconds",
                    "Ledger operation latency in seconds, commit included",
                )
                .buckets(vec![
                    0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
                ]),
            )?,
        )?;

        Ok(Self {
            registry,
            operations_submitted_total,
            operations_evaluated_total,
            operations_failed_total,
            commit_conflicts_total,
            stored_entries,
            operation_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, prometheus::Error>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

/// Shared metrics state passed to axum handlers.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
