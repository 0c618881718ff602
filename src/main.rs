#[macro_use]
extern crate log;

mod broker_probe;
mod cardinality;
mod cli;
mod cluster_client;
mod constants;
mod http;
mod kafka_types;
mod logging;
mod poller;
mod prometheus_metrics;
mod topology;

use std::error::Error;
use std::fmt::Display;
use std::process;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use cardinality::CardinalityResetPolicy;
use cli::Cli;
use cluster_client::KafkaClusterClient;
use poller::Poller;
use prometheus_metrics::MetricPublisher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = parse_cli_and_init_logging();

    let shutdown_token = build_shutdown_token();

    // Prometheus Metrics Registry, shared by the poller and the HTTP endpoint
    let metrics = Arc::new(prometheus_metrics::init());

    let client = KafkaClusterClient::new(&cli.build_client_config())
        .unwrap_or_else(|e| exit_on_fatal("Failed to allocate Kafka client", e, exit_code::CONFIG_ERROR));

    let publisher = MetricPublisher::new(cli.bootstrap_brokers.clone(), &metrics)
        .unwrap_or_else(|e| exit_on_fatal("Failed to set up metrics", e, exit_code::SOFTWARE_ERROR));

    let poller = Poller::new(
        Arc::new(client),
        publisher,
        CardinalityResetPolicy::new(cli.reset_threshold),
        cli.refresh_interval(),
        cli.internal_topic_prefix.clone(),
        &metrics,
    )
    .unwrap_or_else(|e| exit_on_fatal("Failed to set up metrics", e, exit_code::SOFTWARE_ERROR));

    info!(
        "Polling cluster '{}' every {:?}, clearing series every {} polls",
        cli.bootstrap_brokers,
        cli.refresh_interval(),
        cli.reset_threshold
    );
    let poller_handle = poller.spawn(shutdown_token.clone());

    if let Err(e) = http::init(cli.listen_on(), metrics, shutdown_token.clone()).await {
        shutdown_token.cancel();
        poller_handle.await?;
        exit_on_fatal(&format!("Failed to listen on '{}'", cli.listen_on()), e, exit_code::IO_ERROR);
    }

    poller_handle.await?;

    Ok(())
}

fn parse_cli_and_init_logging() -> Cli {
    // Parse command line input and initialize logging
    let cli = Cli::parse_and_validate();
    logging::init(cli.verbosity_level());

    trace!("Created:\n{:#?}", cli);

    cli
}

fn build_shutdown_token() -> CancellationToken {
    let shutdown_token = CancellationToken::new();

    // Setup shutdown signal handler:
    // when it's time to shutdown, cancels the token for all parts of the system.
    //
    // NOTE: This handler will be listening on its own dedicated thread.
    let handler_token = shutdown_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Shutting down...");
        handler_token.cancel();
    }) {
        error!("Failed to register signal handler: {e}");
    }

    // Return a token so we can notify other parts of the system.
    shutdown_token
}

fn exit_on_fatal<E: Display>(context: &str, e: E, code: i32) -> ! {
    error!("{context}: {e}");
    process::exit(code)
}
