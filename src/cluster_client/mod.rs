// Inner modules
mod errors;
mod kafka;
#[cfg(test)]
pub(crate) mod mock;

// Exports
pub use errors::{ClusterClientError, ClusterClientResult};
pub use kafka::KafkaClusterClient;

use async_trait::async_trait;

use crate::kafka_types::Broker;

/// Read access to the topology of a Kafka cluster.
///
/// Enumeration and lookup operations answer from the metadata obtained by
/// the latest successful [`ClusterClient::refresh_metadata`]: the caller decides
/// when the view of the cluster moves forward.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Refresh the internal view of the cluster metadata.
    async fn refresh_metadata(&self) -> ClusterClientResult<()>;

    /// Names of all the Topics in the cluster, internal ones included.
    async fn list_topics(&self) -> ClusterClientResult<Vec<String>>;

    /// Partition identifiers of the given Topic.
    async fn list_partitions(&self, topic: &str) -> ClusterClientResult<Vec<u32>>;

    /// Address (`host:port`) of the Broker leading the given Topic Partition.
    async fn leader_of(&self, topic: &str, partition: u32) -> ClusterClientResult<String>;

    /// Brokers currently known to be part of the cluster.
    async fn known_brokers(&self) -> Vec<Broker>;

    /// Connects to the given [`Broker`], if not already connected, and reports if it is reachable.
    async fn broker_connectivity(&self, broker: &Broker) -> ClusterClientResult<bool>;
}
