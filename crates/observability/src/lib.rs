use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    rejected_total: AtomicU64,
    atoms_extracted_total: AtomicU64,
    upstream_failures_total: AtomicU64,
    parse_failures_total: AtomicU64,
    internal_failures_total: AtomicU64,
    audit_warnings_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub rejected_total: u64,
    pub atoms_extracted_total: u64,
    pub upstream_failures_total: u64,
    pub parse_failures_total: u64,
    pub internal_failures_total: u64,
    pub audit_warnings_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_atoms(&self, atoms: usize) {
        self.atoms_extracted_total
            .fetch_add(atoms as u64, Ordering::Relaxed);
    }

    pub fn inc_upstream_failure(&self) {
        self.upstream_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_parse_failure(&self) {
        self.parse_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_internal_failure(&self) {
        self.internal_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_audit_warnings(&self, warnings: usize) {
        self.audit_warnings_total
            .fetch_add(warnings as u64, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            atoms_extracted_total: self.atoms_extracted_total.load(Ordering::Relaxed),
            upstream_failures_total: self.upstream_failures_total.load(Ordering::Relaxed),
            parse_failures_total: self.parse_failures_total.load(Ordering::Relaxed),
            internal_failures_total: self.internal_failures_total.load(Ordering::Relaxed),
            audit_warnings_total: self.audit_warnings_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(default_filter(service_name))
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

/// Same JSON format, written to stderr so stdout stays clean for command output.
pub fn init_cli_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(default_filter(service_name))
            .with_writer(std::io::stderr)
            .init();
    });
}

fn default_filter(service_name: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,policy_api=info,policy_extractor=info,tower_http=info",
            service_name
        ))
    })
}
