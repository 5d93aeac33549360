use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Fetch metrics
    pub fetch_requests: IntCounterVec,
    pub fetch_responses: IntCounterVec,
    pub fetch_duration: Histogram,
    pub rate_limited: IntCounter,
    pub reauthentications: IntCounter,

    // Token metrics
    pub token_refreshes: IntCounter,
    pub token_refresh_failures: IntCounter,

    // Paging metrics
    pub pages_emitted: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("publicapis".into()), None)
            .expect("valid registry namespace");

        let metrics = Arc::new(Self {
            fetch_requests: IntCounterVec::new(Opts::new("fetch_requests_total", "HTTP requests sent by path"), &["path"]).expect("metric definition"),
            fetch_responses: IntCounterVec::new(Opts::new("fetch_responses_total", "HTTP responses by status"), &["status"]).expect("metric definition"),
            fetch_duration: Histogram::with_opts(HistogramOpts::new("fetch_duration_seconds", "Logical fetch duration including backoff").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0, 60.0])).expect("metric definition"),
            rate_limited: IntCounter::new("rate_limited_total", "429 responses received").expect("metric definition"),
            reauthentications: IntCounter::new("reauthentications_total", "Reauthentication cycles triggered by rejected requests").expect("metric definition"),

            token_refreshes: IntCounter::new("token_refreshes_total", "Physical token fetches").expect("metric definition"),
            token_refresh_failures: IntCounter::new("token_refresh_failures_total", "Failed token fetches").expect("metric definition"),

            pages_emitted: IntCounterVec::new(Opts::new("pages_emitted_total", "Pages pushed onto page streams"), &["path"]).expect("metric definition"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.fetch_requests.clone()),
            Box::new(metrics.fetch_responses.clone()),
            Box::new(metrics.fetch_duration.clone()),
            Box::new(metrics.rate_limited.clone()),
            Box::new(metrics.reauthentications.clone()),
            Box::new(metrics.token_refreshes.clone()),
            Box::new(metrics.token_refresh_failures.clone()),
            Box::new(metrics.pages_emitted.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric registered once");
        }

        metrics
    }

    /// Text exposition of everything gathered so far
    pub fn render(&self) -> anyhow::Result<String> {
        use prometheus::{Encoder, TextEncoder};

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
