use statuspage_mirror::{
    config::AppConfig, feed::StatusPageFeed, liveness, notifier::WebhookNotifier,
    reconciler::Reconciler, store::IncidentStore,
};
use std::sync::Arc;
use tokio::time;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(error) = run().await {
        error!(error = %error, "statuspage-mirror startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|error| error.to_string())?;

    let store = IncidentStore::open(&config.sqlite_path).map_err(|error| error.to_string())?;
    let store = Arc::new(store);

    let feed = Arc::new(StatusPageFeed::new(config.feed_base_url.clone()));
    let notifier = Arc::new(WebhookNotifier::new(
        config.webhook_url.clone(),
        config.mention.clone(),
    ));

    let reconciler = Reconciler::new(feed, store, notifier);

    let listener = tokio::net::TcpListener::bind(config.liveness_addr)
        .await
        .map_err(|error| error.to_string())?;
    info!(addr = %config.liveness_addr, "liveness endpoint listening");
    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, liveness::router()).await {
            error!(error = %error, "liveness endpoint stopped");
        }
    });

    info!(
        poll_seconds = config.poll_interval.as_secs(),
        "statuspage-mirror started"
    );

    let mut ticker = time::interval(config.poll_interval);

    loop {
        ticker.tick().await;

        // Ticks are not serialized: a slow reconciliation may overlap the
        // next one. The store's last-write-wins upsert settles any race.
        let reconciler = reconciler.clone();
        tokio::spawn(async move {
            reconciler.reconcile().await;
        });
    }
}
