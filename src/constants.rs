/// Host address the HTTP scrape endpoint listens on, by default.
pub(crate) const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Port the HTTP scrape endpoint listens on, by default.
pub(crate) const DEFAULT_HTTP_PORT: &str = "7979";

/// Seconds the poller sleeps between two cycles, by default.
pub(crate) const DEFAULT_REFRESH_INTERVAL_SECS: &str = "300";

/// Amount of cycles after which all topology-derived series are cleared, by default.
pub(crate) const DEFAULT_RESET_THRESHOLD: &str = "100";

/// Topics whose name starts with this prefix are Kafka internals (ex. `__consumer_offsets`),
/// and are never published.
pub(crate) const DEFAULT_INTERNAL_TOPIC_PREFIX: &str = "__";

/// Environment variable that, if set, overrides the logging level derived from the CLI.
pub(crate) const LOG_ENV_VAR: &str = "KAFKA_PARTITIONS_EXPORTER_LOG";
