//! Alert dispatch background task

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    services::{AlertDispatcher, Notifier, SoundPlayer},
    state::CompletionEvent,
};

/// Deliver every completion event until the sending side is dropped
pub async fn alert_dispatch_task<S, N>(
    mut completion_rx: mpsc::UnboundedReceiver<CompletionEvent>,
    dispatcher: AlertDispatcher<S, N>,
) where
    S: SoundPlayer,
    N: Notifier,
{
    info!("Starting alert dispatch task");

    while let Some(event) = completion_rx.recv().await {
        debug!("Dispatching alert for timer {} ({})", event.timer_id, event.label);
        dispatcher.dispatch(&event).await;
    }

    info!("Alert dispatch task stopped");
}
