//! Metrics for the locator pipeline.
//!
//! Two phases report here: the per-district facility fetch (HTTP plus
//! decode) and the filter/marker sync pass. Names follow the convention
//! `petmap_{phase}_{name}` with a `_total` suffix for counters.

use once_cell::sync::Lazy;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

macro_rules! pipeline_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("petmap_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("petmap_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("petmap_", $phase, "_", $name)
    };
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

/// Every metric the pipeline emits, used for early registration and for
/// keeping names conflict-free.
static CATALOG: Lazy<Vec<MetricDoc>> = Lazy::new(|| {
    vec![
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "requests"),
            metric_type: MetricType::Counter,
            help: "District facility fetches issued",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "failures"),
            metric_type: MetricType::Counter,
            help: "District facility fetches that failed and degraded to empty",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "records_received"),
            metric_type: MetricType::Counter,
            help: "Facility records decoded from fetch responses",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "records_dropped"),
            metric_type: MetricType::Counter,
            help: "Malformed facility records dropped at decode time",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "records_unclassified"),
            metric_type: MetricType::Counter,
            help: "Facility records that matched no canonical category",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "fetch", "stale_discarded"),
            metric_type: MetricType::Counter,
            help: "Fetch results discarded because a newer fetch superseded them",
        },
        MetricDoc {
            name: pipeline_metric!(histogram, "fetch", "duration_seconds"),
            metric_type: MetricType::Histogram,
            help: "Duration of district facility fetches in seconds",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "sync", "markers_created"),
            metric_type: MetricType::Counter,
            help: "Markers created during reconciliation passes",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "sync", "markers_destroyed"),
            metric_type: MetricType::Counter,
            help: "Markers destroyed during reconciliation passes",
        },
        MetricDoc {
            name: pipeline_metric!(counter, "sync", "popups_opened"),
            metric_type: MetricType::Counter,
            help: "Detail popups opened",
        },
        MetricDoc {
            name: pipeline_metric!(gauge, "sync", "visible_facilities"),
            metric_type: MetricType::Gauge,
            help: "Facilities currently visible after filtering",
        },
    ]
});

/// Initialize the global metrics infrastructure.
///
/// Idempotent. Installs a Prometheus recorder, optionally with an HTTP
/// exporter when PETMAP_METRICS_ADDR is set, and pre-registers the catalog
/// so scrapes see every series from the start.
pub fn init_metrics() {
    INIT.call_once(|| {
        let mut builder = metrics_exporter_prometheus::PrometheusBuilder::new();

        if let Ok(addr_str) = std::env::var("PETMAP_METRICS_ADDR") {
            match addr_str.parse::<std::net::SocketAddr>() {
                Ok(addr) => {
                    builder = builder.with_http_listener(addr);
                    info!("Prometheus HTTP exporter started at http://{}/metrics", addr);
                }
                Err(_) => {
                    warn!("Invalid metrics addr '{}', exporter disabled", addr_str);
                }
            }
        }

        match builder.install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Metrics handle was already set");
                }
                register_all_metrics();
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

fn register_all_metrics() {
    for doc in CATALOG.iter() {
        match doc.metric_type {
            MetricType::Counter => {
                let _ = ::metrics::counter!(doc.name);
            }
            MetricType::Histogram => {
                let _ = ::metrics::histogram!(doc.name);
            }
            MetricType::Gauge => {
                let _ = ::metrics::gauge!(doc.name);
            }
        }
    }
    info!("Registered {} pipeline metrics", CATALOG.len());
}

/// Renders the current metric values in Prometheus text format, if the
/// recorder was installed.
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Metrics for the per-district facility fetch phase.
pub struct FetchMetrics;

impl FetchMetrics {
    pub fn record_success(records: usize, duration_secs: f64) {
        ::metrics::counter!(pipeline_metric!(counter, "fetch", "requests")).increment(1);
        ::metrics::counter!(pipeline_metric!(counter, "fetch", "records_received"))
            .increment(records as u64);
        ::metrics::histogram!(pipeline_metric!(histogram, "fetch", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_failure() {
        ::metrics::counter!(pipeline_metric!(counter, "fetch", "requests")).increment(1);
        ::metrics::counter!(pipeline_metric!(counter, "fetch", "failures")).increment(1);
    }

    pub fn record_dropped_records(count: usize) {
        if count > 0 {
            ::metrics::counter!(pipeline_metric!(counter, "fetch", "records_dropped"))
                .increment(count as u64);
        }
    }

    pub fn record_unclassified(count: usize) {
        if count > 0 {
            ::metrics::counter!(pipeline_metric!(counter, "fetch", "records_unclassified"))
                .increment(count as u64);
        }
    }

    pub fn record_stale_discarded() {
        ::metrics::counter!(pipeline_metric!(counter, "fetch", "stale_discarded")).increment(1);
    }
}

/// Metrics for the filter/marker reconciliation phase.
pub struct SyncMetrics;

impl SyncMetrics {
    pub fn record_reconciliation(created: usize, destroyed: usize, visible: usize) {
        ::metrics::counter!(pipeline_metric!(counter, "sync", "markers_created"))
            .increment(created as u64);
        ::metrics::counter!(pipeline_metric!(counter, "sync", "markers_destroyed"))
            .increment(destroyed as u64);
        ::metrics::gauge!(pipeline_metric!(gauge, "sync", "visible_facilities"))
            .set(visible as f64);
    }

    pub fn record_popup_opened() {
        ::metrics::counter!(pipeline_metric!(counter, "sync", "popups_opened")).increment(1);
    }
}
