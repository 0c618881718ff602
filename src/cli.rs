use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::{builder::NonEmptyStringValueParser, ArgGroup, Parser, ValueEnum};
use rdkafka::ClientConfig;

use crate::constants::{
    DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_INTERNAL_TOPIC_PREFIX,
    DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_RESET_THRESHOLD,
};

/// Command Line Interface, defined via the declarative,
/// `derive` based functionality of the `clap` crate.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("logging_flags")
        .required(false)
        .multiple(false)
        .args(["verbose", "quiet"]),
))]
pub struct Cli {
    // ------------------------------------------------------------------ Admin Client configuration
    /// Initial Kafka Brokers to connect to (format: 'HOST:PORT,...').
    ///
    /// Equivalent to '--kafka-conf=bootstrap.servers:host:port,...'.
    /// The value is also used, verbatim, as the 'brokers' label of the published metrics.
    #[arg(short, long = "brokers", value_name = "BOOTSTRAP_BROKERS", verbatim_doc_comment)]
    pub bootstrap_brokers: String,

    /// Client identifier used by the internal Kafka (Admin) Client.
    ///
    /// Equivalent to '--kafka-conf=client.id:my-client-id'.
    #[arg(long = "client-id", value_name = "CLIENT_ID", default_value = env!("CARGO_PKG_NAME"))]
    pub client_id: String,

    /// Additional configuration used by the internal Kafka (Admin) Client (format: 'CONF_KEY:CONF_VAL').
    ///
    /// To set multiple configurations keys, use this argument multiple times.
    /// Applied last: overrides any other Kafka configuration derived from arguments.
    /// See: https://github.com/edenhill/librdkafka/blob/master/CONFIGURATION.md.
    #[arg(
        long = "kafka-conf",
        value_name = "CONF_KEY:CONF_VAL",
        value_parser = kv_clap_value_parser,
        verbatim_doc_comment
    )]
    pub kafka_config: Vec<KVPair>,

    /// SASL username: when set, the Kafka client authenticates via SASL.
    #[arg(long = "sasl-user", value_name = "USERNAME")]
    pub sasl_user: Option<String>,

    /// SASL password.
    #[arg(long = "sasl-pass", value_name = "PASSWORD", env = "SASL_PASS", hide_env_values = true)]
    pub sasl_pass: Option<String>,

    /// SASL SCRAM algorithm.
    ///
    /// If not set, and '--sasl-user' is, SASL mechanism 'PLAIN' is used.
    #[arg(long = "sasl-algorithm", value_name = "ALGORITHM", requires = "sasl_user", verbatim_doc_comment)]
    pub sasl_algorithm: Option<SaslAlgorithm>,

    // ------------------------------------------------------------------------- Poller configuration
    /// Seconds to wait between two consecutive polls of the Kafka cluster topology.
    #[arg(
        long = "refresh-interval",
        value_name = "SECONDS",
        default_value = DEFAULT_REFRESH_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub refresh_interval_secs: u64,

    /// Amount of polls after which all the topology metrics series are cleared, and republished.
    ///
    /// Topics, partitions and brokers come and go during the life of a cluster:
    /// without clearing, metrics of a deleted topic would be exposed forever.
    /// Series of removed entities are visible for, at most, this many polls.
    #[arg(
        long = "reset-threshold",
        value_name = "POLLS",
        default_value = DEFAULT_RESET_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(1..),
        verbatim_doc_comment
    )]
    pub reset_threshold: u32,

    /// Topics with this name prefix are considered Kafka internals, and ignored.
    #[arg(
        long = "internal-topic-prefix",
        value_name = "PREFIX",
        default_value = DEFAULT_INTERNAL_TOPIC_PREFIX,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub internal_topic_prefix: String,

    // ------------------------------------------------------------------------ HTTP configuration
    /// Host address to listen on for HTTP requests.
    ///
    /// Supports both IPv4 and IPv6 addresses.
    #[arg(long, default_value = DEFAULT_HTTP_HOST, verbatim_doc_comment)]
    pub host: IpAddr,

    /// Port to listen on for HTTP requests.
    #[arg(long, default_value = DEFAULT_HTTP_PORT, verbatim_doc_comment)]
    pub port: u16,

    /// Verbose logging.
    ///
    /// * none    = 'WARN'
    /// * '-v'    = 'INFO'
    /// * '-vv'   = 'DEBUG'
    /// * '-vvv'  = 'TRACE'
    ///
    /// Alternatively, set environment variable 'KAFKA_PARTITIONS_EXPORTER_LOG=(ERROR|WARN|INFO|DEBUG|TRACE|OFF)'.
    #[arg(short, long, action = clap::ArgAction::Count, verbatim_doc_comment)]
    pub verbose: u8,

    /// Quiet logging.
    ///
    /// * none    = 'WARN'
    /// * '-q'    = 'ERROR'
    /// * '-qq'   = 'OFF'
    ///
    /// Alternatively, set environment variable 'KAFKA_PARTITIONS_EXPORTER_LOG=(ERROR|WARN|INFO|DEBUG|TRACE|OFF)'.
    #[arg(short, long, action = clap::ArgAction::Count, verbatim_doc_comment)]
    pub quiet: u8,
}

/// SASL SCRAM algorithms supported for authentication.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaslAlgorithm {
    Sha256,
    Sha512,
}

impl SaslAlgorithm {
    fn mechanism(&self) -> &'static str {
        match self {
            SaslAlgorithm::Sha256 => "SCRAM-SHA-256",
            SaslAlgorithm::Sha512 => "SCRAM-SHA-512",
        }
    }
}

impl Cli {
    pub fn parse_and_validate() -> Self {
        Self::parse()
    }

    pub fn verbosity_level(&self) -> i8 {
        self.verbose as i8 - self.quiet as i8
    }

    pub fn listen_on(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn build_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.bootstrap_brokers.clone())
            .set("client.id", self.client_id.clone());

        if let Some(user) = &self.sasl_user {
            let mechanism = self.sasl_algorithm.map(|a| a.mechanism()).unwrap_or("PLAIN");
            config
                .set("security.protocol", "SASL_PLAINTEXT")
                .set("sasl.mechanism", mechanism)
                .set("sasl.username", user.clone())
                .set("sasl.password", self.sasl_pass.clone().unwrap_or_default());
        }

        for cfg in &self.kafka_config {
            config.set(cfg.0.clone(), cfg.1.clone());
        }

        trace!("Created:\n{:#?}", config);
        config
    }
}

/// A simple (key,value) pair of `String`s, useful to be parsed from arguments via [`kv_clap_value_parser`].
pub type KVPair = (String, String);

/// To be used as [`clap::value_parser`] function to create [`KVPair`] values.
fn kv_clap_value_parser(kv: &str) -> Result<KVPair, String> {
    let (k, v) = match kv.split_once(':') {
        None => {
            return Err("Should have 'K:V' format".to_string());
        },
        Some((k, v)) => (k, v),
    };

    Ok((k.to_string(), v.to_string()))
}
