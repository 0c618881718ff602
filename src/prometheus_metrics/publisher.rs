use const_format::formatcp;
use prometheus::{
    register_int_gauge_vec_with_registry, register_int_gauge_with_registry, IntGauge, IntGaugeVec,
    Registry,
};

use super::{
    MetricsError, MetricsResult, LABEL_BROKER, LABEL_BROKERS, LABEL_PARTITION, LABEL_PARTITIONS,
    LABEL_TOPIC, PREFIX,
};
use crate::broker_probe::BrokerHealth;
use crate::topology::TopologySnapshot;

const MET_LEADER_NAME: &str = formatcp!("{PREFIX}_broker_leader_partition_topic");
const MET_LEADER_HELP: &str = "Kafka broker leader of partition topics.";
const MET_TOPIC_PARTITIONS_NAME: &str = formatcp!("{PREFIX}_topic_partitions");
const MET_TOPIC_PARTITIONS_HELP: &str = "Kafka topic partitions on cluster.";
const MET_TOPICS_COUNT_NAME: &str = formatcp!("{PREFIX}_topics_count");
const MET_TOPICS_COUNT_HELP: &str = "Count topics on cluster.";
const MET_BROKERS_REACHABLE_NAME: &str = formatcp!("{PREFIX}_partition_exporter_brokers_reachable");
const MET_BROKERS_REACHABLE_HELP: &str = "Brokers found reachable during the latest poll.";
const MET_BROKERS_UNREACHABLE_NAME: &str =
    formatcp!("{PREFIX}_partition_exporter_brokers_unreachable");
const MET_BROKERS_UNREACHABLE_HELP: &str = "Brokers found unreachable during the latest poll.";

/// Publishes the content of a [`TopologySnapshot`] as Prometheus Metrics.
///
/// All the topology metrics are gauges, labelled after the entities they describe:
/// the amount of series grows with the amount of topics, partitions and brokers seen.
/// A series not published again stays at its last value until [`Self::reset`].
pub struct MetricPublisher {
    /// Value of the `brokers` label: the configured bootstrap brokers list.
    brokers_label: String,

    // Prometheus Metrics
    metric_leader: IntGaugeVec,
    metric_topic_partitions: IntGaugeVec,
    metric_topics_count: IntGaugeVec,
    metric_brokers_reachable: IntGauge,
    metric_brokers_unreachable: IntGauge,
}

impl MetricPublisher {
    /// Create a new [`MetricPublisher`], registering its metrics to the given [`Registry`].
    ///
    /// # Arguments
    ///
    /// * `brokers_label` - Identifies the cluster in the `brokers` label
    /// * `metrics` - Registry to register the metrics to
    pub fn new(brokers_label: String, metrics: &Registry) -> MetricsResult<Self> {
        Ok(Self {
            brokers_label,
            metric_leader: register_int_gauge_vec_with_registry!(
                MET_LEADER_NAME,
                MET_LEADER_HELP,
                &[LABEL_TOPIC, LABEL_BROKER, LABEL_PARTITION],
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_LEADER_NAME, e))?,
            metric_topic_partitions: register_int_gauge_vec_with_registry!(
                MET_TOPIC_PARTITIONS_NAME,
                MET_TOPIC_PARTITIONS_HELP,
                &[LABEL_TOPIC, LABEL_BROKERS, LABEL_PARTITIONS],
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_TOPIC_PARTITIONS_NAME, e))?,
            metric_topics_count: register_int_gauge_vec_with_registry!(
                MET_TOPICS_COUNT_NAME,
                MET_TOPICS_COUNT_HELP,
                &[LABEL_BROKERS],
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_TOPICS_COUNT_NAME, e))?,
            metric_brokers_reachable: register_int_gauge_with_registry!(
                MET_BROKERS_REACHABLE_NAME,
                MET_BROKERS_REACHABLE_HELP,
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_BROKERS_REACHABLE_NAME, e))?,
            metric_brokers_unreachable: register_int_gauge_with_registry!(
                MET_BROKERS_UNREACHABLE_NAME,
                MET_BROKERS_UNREACHABLE_HELP,
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_BROKERS_UNREACHABLE_NAME, e))?,
        })
    }

    /// Set the topology gauges to reflect the given [`TopologySnapshot`].
    ///
    /// Partitions which leader is unknown get no leader series.
    pub fn publish(&self, snapshot: &TopologySnapshot) {
        for (topic, partition, leader) in snapshot.leaders() {
            self.metric_leader
                .with_label_values(&[topic, leader, &partition.to_string()])
                .set(partition as i64);
        }

        for (topic, partitions) in snapshot.topics() {
            let partitions_label =
                partitions.iter().map(u32::to_string).collect::<Vec<String>>().join(",");
            self.metric_topic_partitions
                .with_label_values(&[topic, &self.brokers_label, &partitions_label])
                .set(1);
        }

        self.metric_topics_count
            .with_label_values(&[&self.brokers_label])
            .set(snapshot.topics_count() as i64);
    }

    /// Set the broker reachability gauges, as verified during the latest poll.
    pub fn publish_broker_health(&self, health: &BrokerHealth) {
        self.metric_brokers_reachable.set(health.reachable_count() as i64);
        self.metric_brokers_unreachable.set(health.unreachable_count() as i64);
    }

    /// Remove all the series of the topology gauges.
    ///
    /// The three gauges are cleared together, so that they always describe the same topology.
    pub fn reset(&self) {
        self.metric_leader.reset();
        self.metric_topic_partitions.reset();
        self.metric_topics_count.reset();
    }
}
