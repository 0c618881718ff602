use rdkafka::metadata::MetadataBroker;

/// A Kafka Broker, as advertised in the cluster metadata.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Broker {
    pub id: i32,
    pub host: String,
    pub port: u16,
}

impl Broker {
    /// Address of the Broker, in the `host:port` format.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&MetadataBroker> for Broker {
    fn from(b: &MetadataBroker) -> Self {
        Broker {
            id: b.id(),
            host: b.host().to_owned(),
            port: b.port() as u16,
        }
    }
}
