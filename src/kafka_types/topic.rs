use rdkafka::metadata::MetadataTopic;

use super::Partition;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Topic {
    pub name: String,
    pub partitions: Vec<Partition>,
    /// Error reported by the cluster for this Topic, if any.
    pub error: Option<String>,
}

impl From<&MetadataTopic> for Topic {
    fn from(t: &MetadataTopic) -> Self {
        Topic {
            name: t.name().to_owned(),
            partitions: t.partitions().iter().map(Partition::from).collect(),
            error: t.error().map(|e| format!("{e:?}")),
        }
    }
}
