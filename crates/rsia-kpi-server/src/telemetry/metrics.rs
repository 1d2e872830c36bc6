// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::fmt::Write;
use std::time::Duration;
use tokio::sync::Mutex;

const METRIC_PREFIX: &str = "rsia_kpi";
const LATENCY_SAMPLES_PER_ROUTE: usize = 4096;
const LATENCY_BOUNDS_SECONDS: [f64; 9] = [0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
const KNOWN_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Label for a request method; extension methods share `other`.
fn method_label(method: &str) -> &str {
    if KNOWN_METHODS.contains(&method) {
        method
    } else {
        "other"
    }
}

#[derive(Default)]
pub struct RequestMetrics {
    counts: Mutex<HashMap<(String, String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, VecDeque<u64>>>,
    upstream_calls: Mutex<HashMap<(String, String), u64>>,
}

impl RequestMetrics {
    pub async fn observe_request(
        &self,
        route: &str,
        method: &str,
        status: StatusCode,
        latency: Duration,
    ) {
        *self
            .counts
            .lock()
            .await
            .entry((
                route.to_string(),
                method_label(method).to_string(),
                status.as_u16(),
            ))
            .or_insert(0) += 1;
        let mut latency_ns = self.latency_ns.lock().await;
        let samples = latency_ns.entry(route.to_string()).or_default();
        if samples.len() >= LATENCY_SAMPLES_PER_ROUTE {
            samples.pop_front();
        }
        samples.push_back(u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX));
    }

    pub async fn observe_upstream(&self, action: &str, outcome: &str) {
        *self
            .upstream_calls
            .lock()
            .await
            .entry((action.to_string(), outcome.to_string()))
            .or_insert(0) += 1;
    }

    /// Prometheus text exposition.
    pub async fn render(&self) -> String {
        let mut body = String::new();

        let mut counts: Vec<_> = self.counts.lock().await.clone().into_iter().collect();
        counts.sort();
        for ((route, method, status), count) in counts {
            let _ = writeln!(
                body,
                "{METRIC_PREFIX}_http_requests_total{{route=\"{route}\",method=\"{method}\",status=\"{status}\"}} {count}"
            );
        }

        let mut latencies: Vec<(String, Vec<u64>)> = self
            .latency_ns
            .lock()
            .await
            .iter()
            .map(|(route, samples)| (route.clone(), samples.iter().copied().collect()))
            .collect();
        latencies.sort_by(|a, b| a.0.cmp(&b.0));
        for (route, samples) in latencies {
            let _ = writeln!(
                body,
                "{METRIC_PREFIX}_http_request_latency_p95_seconds{{route=\"{route}\"}} {:.6}",
                percentile_ns(&samples, 0.95) as f64 / 1_000_000_000.0
            );
            push_histogram_from_samples(
                &mut body,
                &format!("{METRIC_PREFIX}_http_request_duration_seconds"),
                &format!("route=\"{route}\""),
                &samples,
                &LATENCY_BOUNDS_SECONDS,
            );
        }

        let mut upstream: Vec<_> = self
            .upstream_calls
            .lock()
            .await
            .clone()
            .into_iter()
            .collect();
        upstream.sort();
        for ((action, outcome), count) in upstream {
            let _ = writeln!(
                body,
                "{METRIC_PREFIX}_upstream_calls_total{{action=\"{action}\",outcome=\"{outcome}\"}} {count}"
            );
        }
        body
    }
}

fn percentile_ns(values: &[u64], pct: f64) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let mut v = values.to_vec();
    v.sort_unstable();
    let idx = ((v.len() as f64 - 1.0) * pct).round() as usize;
    v[idx.min(v.len() - 1)]
}

fn push_histogram_from_samples(
    body: &mut String,
    metric_name: &str,
    base_labels: &str,
    samples_ns: &[u64],
    bounds_seconds: &[f64],
) {
    let mut count_le = vec![0_u64; bounds_seconds.len()];
    let mut sum_seconds = 0.0_f64;
    for sample in samples_ns {
        let seconds = *sample as f64 / 1_000_000_000.0;
        sum_seconds += seconds;
        for (i, bound) in bounds_seconds.iter().enumerate() {
            if seconds <= *bound {
                count_le[i] += 1;
            }
        }
    }
    for (i, bound) in bounds_seconds.iter().enumerate() {
        let _ = writeln!(
            body,
            "{metric_name}_bucket{{{base_labels},le=\"{bound}\"}} {}",
            count_le[i]
        );
    }
    let _ = writeln!(
        body,
        "{metric_name}_bucket{{{base_labels},le=\"+Inf\"}} {}",
        samples_ns.len()
    );
    let _ = writeln!(body, "{metric_name}_sum{{{base_labels}}} {sum_seconds:.9}");
    let _ = writeln!(body, "{metric_name}_count{{{base_labels}}} {}", samples_ns.len());
}
