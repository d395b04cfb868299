use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tracing::debug;

use crate::sync::ChannelSync;

/// Spawn the recurring poll for a channel. The first poll fires immediately.
///
/// Each tick starts its own refresh without waiting for the previous one, so
/// a slow response can overlap a newer poll; the channel drops whichever
/// resolves out of order.
pub fn spawn_poller(sync: Arc<ChannelSync>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if sync.is_closed() {
                debug!(notebook = sync.notebook(), "poller stopping");
                break;
            }
            let sync = sync.clone();
            tokio::spawn(async move {
                // failures are logged and published by refresh itself
                let _ = sync.refresh().await;
            });
        }
    })
}
