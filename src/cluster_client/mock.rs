use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ClusterClient, ClusterClientError, ClusterClientResult};
use crate::kafka_types::Broker;

/// Topology and failures served by a [`MockClusterClient`].
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTopology {
    /// When `true`, `refresh_metadata` fails.
    pub refresh_fails: bool,
    /// When `true`, `list_topics` fails.
    pub topics_fail: bool,
    /// Partitions by topic: `None` makes partition enumeration for that topic fail.
    pub partitions: BTreeMap<String, Option<Vec<u32>>>,
    /// Leader address by topic partition: a missing entry makes leader lookup fail.
    pub leaders: HashMap<(String, u32), String>,
    /// Brokers, with connectivity outcome: `None` makes the connectivity check fail.
    pub brokers: Vec<(Broker, Option<bool>)>,
}

impl MockTopology {
    pub fn broker(id: i32, host: &str) -> Broker {
        Broker {
            id,
            host: host.to_string(),
            port: 9092,
        }
    }

    /// Two topics, `orders` and `events`, led by two reachable brokers `b1` and `b2`.
    pub fn steady_state() -> Self {
        let mut t = Self::default();
        t.partitions.insert("orders".to_string(), Some(vec![0, 1]));
        t.partitions.insert("events".to_string(), Some(vec![0]));
        t.leaders.insert(("orders".to_string(), 0), "b1:9092".to_string());
        t.leaders.insert(("orders".to_string(), 1), "b2:9092".to_string());
        t.leaders.insert(("events".to_string(), 0), "b1:9092".to_string());
        t.brokers.push((Self::broker(1, "b1"), Some(true)));
        t.brokers.push((Self::broker(2, "b2"), Some(true)));
        t
    }
}

/// Test double for [`ClusterClient`], serving a mutable [`MockTopology`].
#[derive(Debug, Default)]
pub(crate) struct MockClusterClient {
    topology: Mutex<MockTopology>,
    refreshes: Mutex<usize>,
}

impl MockClusterClient {
    pub fn new(topology: MockTopology) -> Self {
        Self {
            topology: Mutex::new(topology),
            refreshes: Mutex::new(0),
        }
    }

    /// Change the served topology.
    pub fn update<F: FnOnce(&mut MockTopology)>(&self, f: F) {
        f(&mut self.topology.lock().unwrap());
    }

    pub fn refreshes(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }

    fn snapshot(&self) -> MockTopology {
        self.topology.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    async fn refresh_metadata(&self) -> ClusterClientResult<()> {
        *self.refreshes.lock().unwrap() += 1;
        if self.snapshot().refresh_fails {
            return Err(ClusterClientError::Metadata("cluster unreachable".to_string()));
        }
        Ok(())
    }

    async fn list_topics(&self) -> ClusterClientResult<Vec<String>> {
        let t = self.snapshot();
        if t.topics_fail {
            return Err(ClusterClientError::TopicEnumeration("listing failed".to_string()));
        }
        Ok(t.partitions.keys().cloned().collect())
    }

    async fn list_partitions(&self, topic: &str) -> ClusterClientResult<Vec<u32>> {
        match self.snapshot().partitions.get(topic) {
            Some(Some(partitions)) => Ok(partitions.clone()),
            _ => Err(ClusterClientError::PartitionEnumeration {
                topic: topic.to_string(),
                reason: "enumeration failed".to_string(),
            }),
        }
    }

    async fn leader_of(&self, topic: &str, partition: u32) -> ClusterClientResult<String> {
        self.snapshot().leaders.get(&(topic.to_string(), partition)).cloned().ok_or_else(|| {
            ClusterClientError::LeaderLookup {
                topic: topic.to_string(),
                partition,
                reason: "leader not available".to_string(),
            }
        })
    }

    async fn known_brokers(&self) -> Vec<Broker> {
        self.snapshot().brokers.into_iter().map(|(b, _)| b).collect()
    }

    async fn broker_connectivity(&self, broker: &Broker) -> ClusterClientResult<bool> {
        let outcome = self
            .snapshot()
            .brokers
            .into_iter()
            .find(|(b, _)| b == broker)
            .and_then(|(_, connected)| connected);

        outcome.ok_or_else(|| ClusterClientError::Connectivity {
            broker: broker.address(),
            reason: "connection refused".to_string(),
        })
    }
}
