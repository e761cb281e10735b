use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    events: AtomicU64,
    anomalies: AtomicU64,
    alerts_upserted: AtomicU64,
    retractions: AtomicU64,
    skipped_events: AtomicU64,
    assessment_fallbacks: AtomicU64,
    source_faults: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub events: u64,
    pub anomalies: u64,
    pub alerts_upserted: u64,
    pub retractions: u64,
    pub skipped_events: u64,
    pub assessment_fallbacks: u64,
    pub source_faults: u64,
}

impl Metrics {
    pub fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomaly(&self) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upsert(&self) {
        self.alerts_upserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retraction(&self) {
        self.retractions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_assessment_fallback(&self) {
        self.assessment_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_source_fault(&self) {
        self.source_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events: self.events.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            alerts_upserted: self.alerts_upserted.load(Ordering::Relaxed),
            retractions: self.retractions.load(Ordering::Relaxed),
            skipped_events: self.skipped_events.load(Ordering::Relaxed),
            assessment_fallbacks: self.assessment_fallbacks.load(Ordering::Relaxed),
            source_faults: self.source_faults.load(Ordering::Relaxed),
        }
    }

    pub fn render_prometheus(&self) -> String {
        let snapshot = self.snapshot();

        format!(
            "# TYPE sentinel_events_total counter\n\
sentinel_events_total {}\n\
# TYPE sentinel_anomalies_total counter\n\
sentinel_anomalies_total {}\n\
# TYPE sentinel_alerts_upserted_total counter\n\
sentinel_alerts_upserted_total {}\n\
# TYPE sentinel_retractions_total counter\n\
sentinel_retractions_total {}\n\
# TYPE sentinel_skipped_events_total counter\n\
sentinel_skipped_events_total {}\n\
# TYPE sentinel_assessment_fallbacks_total counter\n\
sentinel_assessment_fallbacks_total {}\n\
# TYPE sentinel_source_faults_total counter\n\
sentinel_source_faults_total {}\n",
            snapshot.events,
            snapshot.anomalies,
            snapshot.alerts_upserted,
            snapshot.retractions,
            snapshot.skipped_events,
            snapshot.assessment_fallbacks,
            snapshot.source_faults
        )
    }
}
