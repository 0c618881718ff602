use async_trait::async_trait;
use rdkafka::{
    admin::AdminClient, client::DefaultClientContext, error::KafkaResult, metadata::Metadata,
    ClientConfig,
};
use tokio::{
    net::TcpStream,
    sync::RwLock,
    time::{timeout, Duration},
};

use super::{ClusterClient, ClusterClientError, ClusterClientResult};
use crate::kafka_types::{Broker, Topic, NO_LEADER};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Owned copy of the cluster metadata, as of the latest refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ClusterMetadata {
    topics: Vec<Topic>,
    brokers: Vec<Broker>,
}

impl From<&Metadata> for ClusterMetadata {
    fn from(m: &Metadata) -> Self {
        Self {
            topics: m.topics().iter().map(Topic::from).collect(),
            brokers: m.brokers().iter().map(Broker::from).collect(),
        }
    }
}

impl ClusterMetadata {
    fn topic(&self, topic: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == topic)
    }

    fn leader_of(&self, topic: &str, partition: u32) -> Result<String, String> {
        let t = self.topic(topic).ok_or_else(|| "topic not found".to_string())?;
        let p = t
            .partitions
            .iter()
            .find(|p| p.id == partition)
            .ok_or_else(|| "partition not found".to_string())?;

        if let Some(e) = &p.error {
            return Err(e.clone());
        }
        if p.leader == NO_LEADER {
            return Err("leader not available".to_string());
        }

        self.brokers
            .iter()
            .find(|b| b.id == p.leader)
            .map(Broker::address)
            .ok_or_else(|| format!("leader broker {} not among known brokers", p.leader))
    }
}

/// [`ClusterClient`] backed by an `rdkafka` Admin Client.
///
/// Every call to [`ClusterClient::refresh_metadata`] fetches the full cluster metadata,
/// and replaces the internal copy that all the other operations read from.
pub struct KafkaClusterClient {
    admin_client: AdminClient<DefaultClientContext>,
    latest: RwLock<Option<ClusterMetadata>>,
}

impl KafkaClusterClient {
    /// Create a new [`KafkaClusterClient`].
    ///
    /// # Arguments
    ///
    /// * `client_config` - Kafka admin client configuration, used to fetch the cluster metadata
    pub fn new(client_config: &ClientConfig) -> KafkaResult<Self> {
        Ok(Self {
            admin_client: client_config.create()?,
            latest: RwLock::new(None),
        })
    }

    fn not_refreshed() -> ClusterClientError {
        ClusterClientError::Metadata("metadata not fetched yet".to_string())
    }
}

#[async_trait]
impl ClusterClient for KafkaClusterClient {
    async fn refresh_metadata(&self) -> ClusterClientResult<()> {
        let metadata = self
            .admin_client
            .inner()
            .fetch_metadata(None, FETCH_TIMEOUT)
            .map(|m| ClusterMetadata::from(&m))
            .map_err(|e| ClusterClientError::Metadata(e.to_string()))?;

        trace!("Fetched:\n{:#?}", metadata);
        *(self.latest.write().await) = Some(metadata);

        Ok(())
    }

    async fn list_topics(&self) -> ClusterClientResult<Vec<String>> {
        match &*(self.latest.read().await) {
            None => Err(ClusterClientError::TopicEnumeration(Self::not_refreshed().to_string())),
            Some(cm) => Ok(cm.topics.iter().map(|t| t.name.clone()).collect()),
        }
    }

    async fn list_partitions(&self, topic: &str) -> ClusterClientResult<Vec<u32>> {
        let guard = self.latest.read().await;
        let cm = guard.as_ref().ok_or_else(Self::not_refreshed)?;

        let enumeration_err = |reason: String| ClusterClientError::PartitionEnumeration {
            topic: topic.to_string(),
            reason,
        };

        let t = cm.topic(topic).ok_or_else(|| enumeration_err("topic not found".to_string()))?;
        if let Some(e) = &t.error {
            return Err(enumeration_err(e.clone()));
        }

        Ok(t.partitions.iter().map(|p| p.id).collect())
    }

    async fn leader_of(&self, topic: &str, partition: u32) -> ClusterClientResult<String> {
        let guard = self.latest.read().await;
        let cm = guard.as_ref().ok_or_else(Self::not_refreshed)?;

        cm.leader_of(topic, partition).map_err(|reason| ClusterClientError::LeaderLookup {
            topic: topic.to_string(),
            partition,
            reason,
        })
    }

    async fn known_brokers(&self) -> Vec<Broker> {
        match &*(self.latest.read().await) {
            None => Vec::new(),
            Some(cm) => cm.brokers.clone(),
        }
    }

    async fn broker_connectivity(&self, broker: &Broker) -> ClusterClientResult<bool> {
        let address = broker.address();
        let connectivity_err = |reason: String| ClusterClientError::Connectivity {
            broker: address.clone(),
            reason,
        };

        match timeout(CONNECT_TIMEOUT, TcpStream::connect(address.as_str())).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => Err(connectivity_err(e.to_string())),
            Err(_) => Err(connectivity_err(format!("timed out after {CONNECT_TIMEOUT:?}"))),
        }
    }
}
