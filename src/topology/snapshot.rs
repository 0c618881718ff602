use std::collections::HashMap;

use crate::cluster_client::{ClusterClient, ClusterClientResult};

/// Point-in-time view of the cluster topology: Topics, their Partitions, and Partition leaders.
///
/// A new [`TopologySnapshot`] is built for every poll, and never modified once built.
///
/// A Topic Partition with no entry in the leaders map has a leader that is _unknown_:
/// resolving it failed while building the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologySnapshot {
    partitions_by_topic: HashMap<String, Vec<u32>>,
    leader_by_topic_partition: HashMap<String, HashMap<u32, String>>,
}

impl TopologySnapshot {
    /// Build a [`TopologySnapshot`] by querying the given [`ClusterClient`].
    ///
    /// Topics which name starts with `internal_topic_prefix` are skipped;
    /// an empty prefix skips nothing.
    /// Failing to enumerate the Partitions of a Topic omits that Topic;
    /// failing to resolve the leader of a Partition leaves that leader unknown.
    /// Only failing to enumerate the Topics fails the whole build.
    ///
    /// # Arguments
    ///
    /// * `client` - Source of the cluster topology, already refreshed
    /// * `internal_topic_prefix` - Name prefix of the Topics to exclude
    pub async fn build(
        client: &dyn ClusterClient,
        internal_topic_prefix: &str,
    ) -> ClusterClientResult<Self> {
        let mut snapshot = Self::default();

        for topic in client.list_topics().await? {
            let internal =
                !internal_topic_prefix.is_empty() && topic.starts_with(internal_topic_prefix);
            if topic.is_empty() || internal {
                trace!("Skipping internal topic '{topic}'");
                continue;
            }

            let mut partitions = match client.list_partitions(&topic).await {
                Ok(partitions) => partitions,
                Err(e) => {
                    warn!("Omitting topic '{topic}' from this poll: {e}");
                    continue;
                },
            };
            partitions.sort_unstable();
            partitions.dedup();
            debug!("Found topic '{}' with {} partitions", topic, partitions.len());

            let mut leaders = HashMap::with_capacity(partitions.len());
            for p in partitions.iter() {
                match client.leader_of(&topic, *p).await {
                    Ok(leader) => {
                        leaders.insert(*p, leader);
                    },
                    Err(e) => {
                        warn!("Leader of '{topic}:{p}' unknown for this poll: {e}");
                    },
                }
            }

            snapshot.leader_by_topic_partition.insert(topic.clone(), leaders);
            snapshot.partitions_by_topic.insert(topic, partitions);
        }

        Ok(snapshot)
    }

    /// Amount of Topics in the snapshot.
    pub fn topics_count(&self) -> usize {
        self.partitions_by_topic.len()
    }

    /// Amount of Topic Partitions which leader is known.
    pub fn known_leaders_count(&self) -> usize {
        self.leader_by_topic_partition.values().map(HashMap::len).sum()
    }

    /// Partitions of the given Topic, in ascending order.
    pub fn partitions(&self, topic: &str) -> Option<&[u32]> {
        self.partitions_by_topic.get(topic).map(Vec::as_slice)
    }

    /// Address of the leader of the given Topic Partition, if known.
    pub fn leader(&self, topic: &str, partition: u32) -> Option<&str> {
        self.leader_by_topic_partition.get(topic)?.get(&partition).map(String::as_str)
    }

    /// Iterate over Topics and their Partitions.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.partitions_by_topic.iter().map(|(t, ps)| (t.as_str(), ps.as_slice()))
    }

    /// Iterate over Topic Partitions which leader is known, paired with the leader address.
    pub fn leaders(&self) -> impl Iterator<Item = (&str, u32, &str)> {
        self.leader_by_topic_partition
            .iter()
            .flat_map(|(t, by_p)| by_p.iter().map(move |(p, l)| (t.as_str(), *p, l.as_str())))
    }
}
