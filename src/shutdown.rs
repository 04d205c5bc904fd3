use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Requested stop severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Stop scheduling and let virtual users finish their current iteration.
    Graceful,
    /// Abort every virtual user immediately.
    Hard,
}

pub type ShutdownSender = broadcast::Sender<StopKind>;
pub type ShutdownReceiver = broadcast::Receiver<StopKind>;

/// Room for a graceful request followed by a hard one.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 4;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<StopKind>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Waits for the next stop request. Never resolves once every sender is gone.
pub async fn recv_stop(shutdown_rx: &mut ShutdownReceiver) -> StopKind {
    loop {
        match shutdown_rx.recv().await {
            Ok(kind) => return kind,
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

/// Waits specifically for a hard stop, skipping graceful requests.
pub async fn recv_hard_stop(shutdown_rx: &mut ShutdownReceiver) {
    while recv_stop(shutdown_rx).await != StopKind::Hard {}
}
