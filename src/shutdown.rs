use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcasts a single "stop now" signal to the controller loop and anyone else
/// holding a receiver.
///
/// ```no_run
/// use order_uploader::shutdown::ShutdownCoordinator;
///
/// # async fn example() {
/// let coordinator = ShutdownCoordinator::new();
/// let mut shutdown_rx = coordinator.subscribe();
/// coordinator.listen_for_ctrl_c();
///
/// tokio::select! {
///     _ = shutdown_rx.recv() => { /* stop polling, exit */ }
///     _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => {}
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);
        Self {
            shutdown_tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    /// True once `shutdown` has been called, for receivers created afterwards
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Trigger shutdown on the first Ctrl-C
    pub fn listen_for_ctrl_c(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                coordinator.shutdown();
            }
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
