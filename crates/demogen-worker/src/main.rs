//! Demo processing worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use demogen_clients::{ClipsClient, MailerClient, RecorderClient};
use demogen_storage::MediaStorage;
use demogen_store::{DemoStore, RowStoreClient, TaskQueueStore};
use demogen_worker::{ClipRelay, DemoPipeline, TaskWorker, WorkerConfig};

fn init_or_exit<T, E: std::fmt::Display>(result: Result<T, E>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to create {}: {}", what, e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("demogen=info".parse().unwrap())
        .add_directive("aws_config=warn".parse().unwrap())
        .add_directive("aws_sdk_s3=warn".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting demogen-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let row_store = init_or_exit(RowStoreClient::from_env(), "row store client");
    let queue = TaskQueueStore::new(row_store.clone());
    let demos = DemoStore::new(row_store);

    let recorder = init_or_exit(RecorderClient::from_env(), "recorder client");
    let clips = init_or_exit(ClipsClient::from_env(), "clips client");
    let mailer = init_or_exit(MailerClient::from_env(), "mailer client");
    let storage = init_or_exit(MediaStorage::from_env(), "media storage");
    let relay = init_or_exit(ClipRelay::new(storage), "clip relay");

    let pipeline = DemoPipeline::new(
        Arc::new(demos),
        Arc::new(recorder),
        Arc::new(clips),
        Arc::new(mailer),
        Arc::new(relay),
        config.clone(),
    );

    let worker = Arc::new(TaskWorker::new(
        Arc::new(queue),
        Arc::new(pipeline),
        config,
    ));

    // Stop the polling loop on Ctrl-C; the in-flight item finishes first.
    tokio::spawn({
        let worker = worker.clone();
        async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
            worker.stop();
        }
    });

    worker.start().await;

    info!("Worker shutdown complete");
}
