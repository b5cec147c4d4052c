use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

/// 优雅关闭管理器
///
/// Hands out broadcast receivers; `shutdown` fires them once and closes the
/// channel. Receivers created after shutdown fire immediately.
#[derive(Clone)]
pub struct ShutdownManager {
    sender: Arc<RwLock<Option<broadcast::Sender<()>>>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(4);
        Self {
            sender: Arc::new(RwLock::new(Some(sender))),
        }
    }

    /// 订阅关闭信号
    pub async fn subscribe(&self) -> broadcast::Receiver<()> {
        match self.sender.read().await.as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(1);
                let _ = sender.send(());
                receiver
            }
        }
    }

    /// 触发关闭
    pub async fn shutdown(&self) {
        let Some(sender) = self.sender.write().await.take() else {
            debug!("Shutdown already triggered");
            return;
        };

        debug!("Notifying {} subscribers", sender.receiver_count());
        let _ = sender.send(());
        info!("Shutdown signal sent");
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
