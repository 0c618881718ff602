use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::cluster_client::{ClusterClient, ClusterClientResult};

/// Reachability of each Broker, as verified during a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrokerHealth {
    reachable_by_address: HashMap<String, bool>,
}

impl BrokerHealth {
    /// `Some(true)` if the Broker at `address` was reachable, `None` if it was not probed.
    #[cfg(test)]
    pub fn is_reachable(&self, address: &str) -> Option<bool> {
        self.reachable_by_address.get(address).copied()
    }

    pub fn reachable_count(&self) -> usize {
        self.reachable_by_address.values().filter(|r| **r).count()
    }

    pub fn unreachable_count(&self) -> usize {
        self.reachable_by_address.len() - self.reachable_count()
    }

    /// Addresses of the Brokers that could not be reached.
    #[cfg(test)]
    pub fn unreachable(&self) -> Vec<&str> {
        let mut addresses: Vec<&str> = self
            .reachable_by_address
            .iter()
            .filter(|(_, r)| !**r)
            .map(|(a, _)| a.as_str())
            .collect();
        addresses.sort_unstable();
        addresses
    }
}

/// Verify reachability of every Broker known to the given [`ClusterClient`].
///
/// One task is spawned per Broker, and all of them are awaited before returning:
/// a slow Broker delays the result by no more than the connectivity check of the client allows.
/// A Broker that can't be reached is logged and reported as such: it never fails the probe.
pub async fn probe_brokers(client: Arc<dyn ClusterClient>) -> BrokerHealth {
    let brokers = client.known_brokers().await;
    trace!("Probing {} brokers", brokers.len());

    let probes: Vec<(String, JoinHandle<ClusterClientResult<bool>>)> = brokers
        .into_iter()
        .map(|b| {
            let c = client.clone();
            (b.address(), tokio::spawn(async move { c.broker_connectivity(&b).await }))
        })
        .collect();

    let mut health = BrokerHealth {
        reachable_by_address: HashMap::with_capacity(probes.len()),
    };
    for (address, probe) in probes {
        let reachable = match probe.await {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => {
                warn!("Broker '{address}' is not connected");
                false
            },
            Ok(Err(e)) => {
                warn!("Could not speak to broker '{address}' (are 'advertised.listeners' correct?): {e}");
                false
            },
            Err(e) => {
                error!("Probe of broker '{address}' did not complete: {e}");
                false
            },
        };
        health.reachable_by_address.insert(address, reachable);
    }

    health
}
