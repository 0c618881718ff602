// Inner modules
mod errors;
mod publisher;

// Exports
pub use errors::{MetricsError, MetricsResult};
pub use publisher::MetricPublisher;
#[cfg(test)]
pub(crate) use publisher::test as test_helpers;

use prometheus::Registry;

pub const PREFIX: &str = "kafka";

pub const LABEL_TOPIC: &str = "topic";
pub const LABEL_PARTITION: &str = "partition";
pub const LABEL_PARTITIONS: &str = "partitions";
pub const LABEL_BROKER: &str = "broker";
pub const LABEL_BROKERS: &str = "brokers";

/// Create the [`Registry`] that all metrics are registered to, and scrapes read from.
pub fn init() -> Registry {
    let registry = Registry::new();

    debug!("Prometheus Metrics registry created");
    registry
}
