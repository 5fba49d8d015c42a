use shared_bus::Subscription;
use tokio::sync::watch;
use tracing::debug;

/// Log every store event at `debug` until shutdown or the bus closes.
pub async fn log_store_events(mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                debug!(
                    target: "gossip_store::events",
                    topic = ?event.topic(),
                    kind = %event.kind(),
                    item = %event.item_id().short(),
                    "Store event"
                );
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
