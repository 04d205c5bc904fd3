use tracing::warn;

use crate::shutdown::{ShutdownSender, StopKind, recv_hard_stop};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Translates Ctrl-C / SIGTERM into stop requests: the first signal asks for a
/// graceful stop, the second forces a hard stop. The task exits once a hard
/// stop has been broadcast from anywhere.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        let mut signals_seen = 0u8;
        loop {
            #[cfg(unix)]
            let received = tokio::select! {
                () = recv_hard_stop(&mut shutdown_rx) => false,
                result = tokio::signal::ctrl_c() => result.is_ok(),
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => true,
            };

            #[cfg(not(unix))]
            let received = tokio::select! {
                () = recv_hard_stop(&mut shutdown_rx) => false,
                result = tokio::signal::ctrl_c() => result.is_ok(),
            };

            if !received {
                break;
            }
            signals_seen = signals_seen.saturating_add(1);
            if signals_seen == 1 {
                warn!("Stop requested; finishing in-flight iterations (signal again to abort).");
                drop(shutdown_tx.send(StopKind::Graceful));
            } else {
                warn!("Second stop request; aborting virtual users.");
                drop(shutdown_tx.send(StopKind::Hard));
                break;
            }
        }
    })
}
