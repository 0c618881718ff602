use rdkafka::metadata::MetadataPartition;

/// Leader identifier reported by Kafka when a Partition has no leader.
pub const NO_LEADER: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Partition {
    pub id: u32,
    /// Identifier of the leader [`super::Broker`], or [`NO_LEADER`].
    pub leader: i32,
    /// Error reported by the cluster for this Partition, if any.
    pub error: Option<String>,
}

impl From<&MetadataPartition> for Partition {
    fn from(p: &MetadataPartition) -> Self {
        Partition {
            id: p.id() as u32,
            leader: p.leader(),
            error: p.error().map(|e| format!("{e:?}")),
        }
    }
}
