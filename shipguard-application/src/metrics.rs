use std::sync::atomic::{AtomicU64, Ordering};

use shipguard_domain::AnalysisOutcome;

#[derive(Debug, Default)]
pub struct Metrics {
    shipments_analyzed: AtomicU64,
    anomalies: AtomicU64,
    high_severity_shipments: AtomicU64,
    analyze_errors: AtomicU64,
}

impl Metrics {
    pub fn record_analysis(&self, outcome: &AnalysisOutcome) {
        self.shipments_analyzed.fetch_add(1, Ordering::Relaxed);
        self.anomalies
            .fetch_add(outcome.anomaly_count as u64, Ordering::Relaxed);
        if outcome.has_high_severity_anomalies {
            self.high_severity_shipments.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_analyze_error(&self) {
        self.analyze_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn shipments_analyzed(&self) -> u64 {
        self.shipments_analyzed.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let shipments = self.shipments_analyzed.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);
        let high = self.high_severity_shipments.load(Ordering::Relaxed);
        let errors = self.analyze_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE shipguard_shipments_analyzed_total counter\n\
shipguard_shipments_analyzed_total {}\n\
# TYPE shipguard_anomalies_total counter\n\
shipguard_anomalies_total {}\n\
# TYPE shipguard_high_severity_shipments_total counter\n\
shipguard_high_severity_shipments_total {}\n\
# TYPE shipguard_analyze_errors_total counter\n\
shipguard_analyze_errors_total {}\n",
            shipments, anomalies, high, errors
        )
    }
}
