use thiserror::Error;

/// Possible errors from a [`super::ClusterClient`].
///
/// Apart from [`ClusterClientError::Metadata`] and [`ClusterClientError::TopicEnumeration`],
/// that concern the whole cluster, each error is scoped to a single entity:
/// callers are expected to contain it to that entity.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ClusterClientError {
    /// Cluster metadata could not be fetched (or has never been fetched).
    #[error("Failed to fetch cluster metadata: {0}")]
    Metadata(String),

    /// The list of Topics could not be determined.
    #[error("Failed to enumerate topics: {0}")]
    TopicEnumeration(String),

    /// The Partitions of the given Topic could not be determined.
    #[error("Failed to enumerate partitions of topic '{topic}': {reason}")]
    PartitionEnumeration {
        topic: String,
        reason: String,
    },

    /// The leader Broker of the given Topic Partition could not be determined.
    #[error("Failed to resolve leader of '{topic}:{partition}': {reason}")]
    LeaderLookup {
        topic: String,
        partition: u32,
        reason: String,
    },

    /// Connectivity to the given Broker could not be verified.
    #[error("Failed to verify connectivity of broker '{broker}': {reason}")]
    Connectivity {
        broker: String,
        reason: String,
    },
}

pub type ClusterClientResult<T> = Result<T, ClusterClientError>;
