use std::sync::Arc;

use prometheus::{register_histogram_with_registry, Histogram, HistogramOpts, Registry};
use tokio::{
    task::JoinHandle,
    time::{sleep, Duration, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::broker_probe::{probe_brokers, BrokerHealth};
use crate::cardinality::CardinalityResetPolicy;
use crate::cluster_client::{ClusterClient, ClusterClientResult};
use crate::prometheus_metrics::{MetricPublisher, MetricsError, MetricsResult};
use crate::topology::TopologySnapshot;

const MET_CYCLE_NAME: &str = "kafka_partition_exporter_lookup_duration_seconds";
const MET_CYCLE_HELP: &str = "Histogram for the runtime of the partitions exporter.";
const MET_CYCLE_BUCKETS: [f64; 11] = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0];

/// Outcome of a poll that got to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub topics: usize,
    pub known_leaders: usize,
    pub broker_health: BrokerHealth,
    /// `true` if all topology series were cleared before publishing.
    pub series_cleared: bool,
}

/// Regularly polls the cluster topology, and publishes it as metrics.
///
/// Every poll: refresh metadata, build a [`TopologySnapshot`], probe the brokers,
/// apply the [`CardinalityResetPolicy`], publish. Polls never overlap: the next one
/// starts `interval` after the previous one has concluded.
pub struct Poller {
    client: Arc<dyn ClusterClient>,
    publisher: MetricPublisher,
    reset_policy: CardinalityResetPolicy,
    interval: Duration,
    internal_topic_prefix: String,

    // Prometheus Metrics
    metric_cycle: Histogram,
}

impl Poller {
    /// Create a new [`Poller`].
    ///
    /// # Arguments
    ///
    /// * `client` - Source of the cluster topology
    /// * `publisher` - Destination of the topology metrics
    /// * `reset_policy` - When to clear the topology metrics
    /// * `interval` - How long to sleep before each poll
    /// * `internal_topic_prefix` - Name prefix of the Topics to ignore
    /// * `metrics` - Registry to register the poll duration histogram to
    pub fn new(
        client: Arc<dyn ClusterClient>,
        publisher: MetricPublisher,
        reset_policy: CardinalityResetPolicy,
        interval: Duration,
        internal_topic_prefix: String,
        metrics: &Registry,
    ) -> MetricsResult<Self> {
        Ok(Self {
            client,
            publisher,
            reset_policy,
            interval,
            internal_topic_prefix,
            metric_cycle: register_histogram_with_registry!(
                HistogramOpts::new(MET_CYCLE_NAME, MET_CYCLE_HELP)
                    .buckets(MET_CYCLE_BUCKETS.to_vec()),
                metrics
            )
            .map_err(|e| MetricsError::Registration(MET_CYCLE_NAME, e))?,
        })
    }

    /// Spawn a new async task running the polling loop.
    ///
    /// The returned [`JoinHandle`] concludes once the loop terminates.
    ///
    /// # Arguments
    ///
    /// * `shutdown_token`: A [`CancellationToken`] that, when cancelled, will make the internal loop terminate.
    pub fn spawn(mut self, shutdown_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sleep(self.interval) => {
                        // No-op
                    },
                    _ = shutdown_token.cancelled() => {
                        info!("Shutting down");
                        break;
                    },
                }

                match self.poll().await {
                    Ok(report) => {
                        info!(
                            "Published {} topics, {} partition leaders ({} brokers reachable, {} unreachable){}",
                            report.topics,
                            report.known_leaders,
                            report.broker_health.reachable_count(),
                            report.broker_health.unreachable_count(),
                            if report.series_cleared { ", after clearing all series" } else { "" }
                        );
                    },
                    Err(e) => {
                        error!("Skipping poll until next interval: {e}");
                    },
                }
            }
        })
    }

    /// Execute a single poll.
    ///
    /// Fails, without publishing anything nor advancing the [`CardinalityResetPolicy`],
    /// only if the cluster metadata can't be refreshed, or its topics listed.
    pub async fn poll(&mut self) -> ClusterClientResult<CycleReport> {
        let start = Instant::now();

        self.client.refresh_metadata().await?;

        let snapshot = TopologySnapshot::build(self.client.as_ref(), &self.internal_topic_prefix).await?;
        trace!("Built:\n{:#?}", snapshot);

        let broker_health = probe_brokers(self.client.clone()).await;

        let series_cleared = self.reset_policy.advance();
        if series_cleared {
            info!("Clearing all topology series before publishing");
            self.publisher.reset();
        }

        self.publisher.publish(&snapshot);
        self.publisher.publish_broker_health(&broker_health);
        debug!("Polls published since latest clear: {}", self.reset_policy.cycle_index());

        self.metric_cycle.observe(start.elapsed().as_secs_f64());

        Ok(CycleReport {
            topics: snapshot.topics_count(),
            known_leaders: snapshot.known_leaders_count(),
            broker_health,
            series_cleared,
        })
    }
}

#[cfg(test)]
mod test {
    use std::{future::Future, sync::Arc};

    use prometheus::Registry;
    use tokio::time::{sleep, Duration, Instant};
    use tokio_util::sync::CancellationToken;

    use super::{Poller, MET_CYCLE_NAME};
    use crate::cardinality::CardinalityResetPolicy;
    use crate::cluster_client::mock::{MockClusterClient, MockTopology};
    use crate::prometheus_metrics::test_helpers::{gauge_value, series_count, BROKERS};
    use crate::prometheus_metrics::MetricPublisher;

    const LEADER: &str = "kafka_broker_leader_partition_topic";
    const TOPIC_PARTITIONS: &str = "kafka_topic_partitions";
    const TOPICS_COUNT: &str = "kafka_topics_count";

    fn make_poller(
        client: Arc<MockClusterClient>,
        threshold: u32,
        interval: Duration,
        registry: &Registry,
    ) -> Poller {
        Poller::new(
            client,
            MetricPublisher::new(BROKERS.to_string(), registry).unwrap(),
            CardinalityResetPolicy::new(threshold),
            interval,
            "__".to_string(),
            registry,
        )
        .unwrap()
    }

    fn cycles_observed(registry: &Registry) -> u64 {
        registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == MET_CYCLE_NAME)
            .flat_map(|mf| mf.get_metric().iter())
            .map(|m| m.get_histogram().get_sample_count())
            .sum()
    }

    const BLOCK_ON_CONDITION_CHECK_FREQ: Duration = Duration::from_millis(10);

    async fn block_on<F, Fut>(f: F, timeout: Duration)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = bool>,
    {
        let start = Instant::now();
        loop {
            if f().await {
                break;
            }

            assert!(
                Instant::now().duration_since(start) < timeout,
                "Timed out waiting on desired condition"
            );
            sleep(BLOCK_ON_CONDITION_CHECK_FREQ).await;
        }
    }

    #[tokio::test]
    async fn should_publish_steady_state() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        let registry = Registry::new();
        let mut poller = make_poller(client, 100, Duration::from_secs(1), &registry);

        let report = poller.poll().await.unwrap();

        assert_eq!(report.topics, 2);
        assert_eq!(report.known_leaders, 3);
        assert_eq!(report.broker_health.reachable_count(), 2);
        assert!(!report.series_cleared);
        assert_eq!(series_count(&registry, LEADER), 3);
        assert_eq!(gauge_value(&registry, TOPICS_COUNT, &[("brokers", BROKERS)]), Some(2.0));
        assert_eq!(cycles_observed(&registry), 1);
    }

    #[tokio::test]
    async fn should_skip_poll_when_refresh_fails() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        client.update(|t| t.refresh_fails = true);
        let registry = Registry::new();
        let mut poller = make_poller(client.clone(), 100, Duration::from_secs(1), &registry);

        assert!(poller.poll().await.is_err());
        assert_eq!(poller.reset_policy.cycle_index(), 0);
        assert_eq!(series_count(&registry, LEADER), 0);
        assert_eq!(series_count(&registry, TOPICS_COUNT), 0);
        assert_eq!(cycles_observed(&registry), 0);

        // Next poll recovers
        client.update(|t| t.refresh_fails = false);
        assert!(poller.poll().await.is_ok());
        assert_eq!(poller.reset_policy.cycle_index(), 1);
        assert_eq!(series_count(&registry, LEADER), 3);
    }

    #[tokio::test]
    async fn should_skip_poll_when_topics_cannot_be_listed() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        client.update(|t| t.topics_fail = true);
        let registry = Registry::new();
        let mut poller = make_poller(client, 100, Duration::from_secs(1), &registry);

        assert!(poller.poll().await.is_err());
        assert_eq!(poller.reset_policy.cycle_index(), 0);
        assert_eq!(series_count(&registry, TOPIC_PARTITIONS), 0);
    }

    #[tokio::test]
    async fn should_publish_despite_unreachable_broker() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        client.update(|t| t.brokers[1].1 = None);
        let registry = Registry::new();
        let mut poller = make_poller(client, 100, Duration::from_secs(1), &registry);

        let report = poller.poll().await.unwrap();

        assert_eq!(report.broker_health.unreachable(), vec!["b2:9092"]);
        // Leadership comes from the snapshot: `b2` is still reported as leader
        assert_eq!(
            gauge_value(&registry, LEADER, &[("topic", "orders"), ("broker", "b2:9092"), ("partition", "1")]),
            Some(1.0)
        );
        assert_eq!(series_count(&registry, LEADER), 3);
        assert_eq!(series_count(&registry, TOPIC_PARTITIONS), 2);
        assert_eq!(
            gauge_value(&registry, "kafka_partition_exporter_brokers_unreachable", &[]),
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn should_clear_ghost_series_at_reset_boundary() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        let registry = Registry::new();
        let mut poller = make_poller(client.clone(), 3, Duration::from_secs(1), &registry);

        assert!(!poller.poll().await.unwrap().series_cleared);

        // Topic `events` gets deleted: its series linger...
        client.update(|t| {
            t.partitions.remove("events");
            t.leaders.remove(&("events".to_string(), 0));
        });
        assert!(!poller.poll().await.unwrap().series_cleared);
        assert!(!poller.poll().await.unwrap().series_cleared);
        assert_eq!(series_count(&registry, TOPIC_PARTITIONS), 2);
        assert_eq!(series_count(&registry, LEADER), 3);

        // ... until the 4th poll clears them, before publishing
        assert!(poller.poll().await.unwrap().series_cleared);
        assert_eq!(series_count(&registry, TOPIC_PARTITIONS), 1);
        assert_eq!(series_count(&registry, LEADER), 2);
        assert_eq!(gauge_value(&registry, TOPICS_COUNT, &[("brokers", BROKERS)]), Some(1.0));

        // Cycle duration histogram is never cleared
        assert_eq!(cycles_observed(&registry), 4);
    }

    #[tokio::test]
    async fn should_clear_at_reset_boundary_even_if_topology_unchanged() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        let registry = Registry::new();
        let mut poller = make_poller(client, 3, Duration::from_secs(1), &registry);

        let cleared: Vec<bool> = {
            let mut res = Vec::new();
            for _ in 0..7 {
                res.push(poller.poll().await.unwrap().series_cleared);
            }
            res
        };

        assert_eq!(cleared, vec![false, false, false, true, false, false, true]);
        assert_eq!(series_count(&registry, LEADER), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn should_poll_until_shutdown() {
        let client = Arc::new(MockClusterClient::new(MockTopology::steady_state()));
        let registry = Arc::new(Registry::new());
        let poller = make_poller(client.clone(), 100, Duration::from_millis(20), &registry);

        let shutdown_token = CancellationToken::new();
        let join_handle = poller.spawn(shutdown_token.clone());

        block_on(|| async { cycles_observed(&registry) >= 3 }, Duration::from_secs(5)).await;
        assert_eq!(series_count(&registry, LEADER), 3);

        shutdown_token.cancel();
        join_handle.await.unwrap();

        let refreshes = client.refreshes();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(client.refreshes(), refreshes);
    }
}
