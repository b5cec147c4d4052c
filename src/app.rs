use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use compute_scheduler_core::{SchedulerConfig, SchedulerError, TaskSource};
use compute_scheduler_dispatcher::{LoadAdvisor, MonitorLoop, Predictor, PriorityScorer, TaskMonitor};
use compute_scheduler_infrastructure::{FileStatusProvider, Snapshot, SnapshotStores};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::shutdown::ShutdownManager;

/// 命令行子命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Predict { service_id: String },
    Resources { service_id: String },
    Priority { task_id: String },
    Strategy,
    Compare { service_id: String },
    Stats,
    Trigger { task_id: String },
    Monitor { once: bool },
}

impl Command {
    /// Commands that change task state and must be written back.
    fn mutates(&self) -> bool {
        matches!(self, Command::Trigger { .. } | Command::Monitor { .. })
    }
}

/// 主应用程序
pub struct Application {
    stores: SnapshotStores,
    snapshot_path: Option<PathBuf>,
    predictor: Arc<Predictor>,
    scorer: PriorityScorer,
    advisor: LoadAdvisor,
    monitor: Arc<TaskMonitor>,
}

impl Application {
    pub async fn new(
        config: SchedulerConfig,
        snapshot_path: Option<PathBuf>,
        status_file: PathBuf,
    ) -> Result<Self> {
        let snapshot = match &snapshot_path {
            Some(path) if path.exists() => Snapshot::load(path)
                .await
                .with_context(|| format!("加载快照失败: {}", path.display()))?,
            Some(path) => {
                warn!("Snapshot {} does not exist, starting empty", path.display());
                Snapshot::default()
            }
            None => Snapshot::default(),
        };
        let stores = snapshot.into_stores();

        let tasks = Arc::new(stores.tasks.clone());
        let history = Arc::new(stores.history.clone());
        let reputations = Arc::new(stores.reputations.clone());

        let predictor = Arc::new(Predictor::new(history.clone(), config.predictor.clone()));
        let scorer = PriorityScorer::new(reputations.clone(), history.clone());
        let advisor = LoadAdvisor::new(history.clone(), predictor.clone());
        let monitor = Arc::new(TaskMonitor::new(
            tasks,
            history,
            reputations,
            Arc::new(FileStatusProvider::new(status_file)),
            config.monitor.clone(),
        ));

        Ok(Self {
            stores,
            snapshot_path,
            predictor,
            scorer,
            advisor,
            monitor,
        })
    }

    /// Run `command` and return its result as JSON.
    pub async fn execute(&self, command: Command, shutdown: &ShutdownManager) -> Result<Value> {
        let output = match &command {
            Command::Predict { service_id } => {
                serde_json::to_value(self.predictor.predict_completion_time(service_id).await)?
            }
            Command::Resources { service_id } => serde_json::to_value(
                self.predictor.predict_resource_requirement(service_id).await,
            )?,
            Command::Priority { task_id } => {
                let task = self
                    .stores
                    .tasks
                    .get_by_id(task_id)
                    .await?
                    .ok_or_else(|| SchedulerError::TaskNotFound {
                        id: task_id.clone(),
                    })?;
                serde_json::to_value(self.scorer.calculate_priority(&task).await)?
            }
            Command::Strategy => {
                serde_json::to_value(self.advisor.get_adaptive_scheduling_strategy().await)?
            }
            Command::Compare { service_id } => {
                serde_json::to_value(self.advisor.compare_with_baseline(service_id).await)?
            }
            Command::Stats => serde_json::to_value(self.monitor.get_monitoring_stats().await)?,
            Command::Trigger { task_id } => {
                serde_json::to_value(self.monitor.trigger_manual_monitoring(task_id).await)?
            }
            Command::Monitor { once: true } => {
                serde_json::to_value(self.monitor.monitor_running_tasks().await)?
            }
            Command::Monitor { once: false } => {
                let sweeps = self.run_monitor_loop(shutdown).await;
                json!({ "sweeps": sweeps })
            }
        };

        if command.mutates() {
            self.persist().await?;
        }
        Ok(output)
    }

    async fn run_monitor_loop(&self, shutdown: &ShutdownManager) -> u64 {
        self.run_monitor_loop_until(shutdown, wait_for_shutdown_signal())
            .await
    }

    /// Run the monitor loop until `stop` resolves, writing the snapshot
    /// after every sweep that settled a task.
    async fn run_monitor_loop_until(
        &self,
        shutdown: &ShutdownManager,
        stop: impl std::future::Future<Output = ()>,
    ) -> u64 {
        let (report_tx, mut report_rx) = mpsc::unbounded_channel();
        let monitor_loop =
            MonitorLoop::new(Arc::clone(&self.monitor)).with_report_sender(report_tx);
        let shutdown_rx = shutdown.subscribe().await;
        let handle = tokio::spawn(async move { monitor_loop.run(shutdown_rx).await });

        tokio::pin!(stop);
        loop {
            tokio::select! {
                _ = &mut stop => break,
                Some(report) = report_rx.recv() => {
                    if report.transitioned() > 0 {
                        if let Err(e) = self.persist().await {
                            error!("Failed to persist after sweep: {e:#}");
                        }
                    }
                }
            }
        }

        info!("收到关闭信号，开始优雅关闭...");
        shutdown.shutdown().await;

        match tokio::time::timeout(Duration::from_secs(30), handle).await {
            Ok(Ok(sweeps)) => sweeps,
            Ok(Err(e)) => {
                error!("Monitor loop failed: {e}");
                0
            }
            Err(_) => {
                warn!("Monitor loop did not stop within 30s");
                0
            }
        }
    }

    /// Write the current store contents back to the snapshot file.
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        Snapshot::capture(&self.stores)
            .await
            .save(path)
            .await
            .with_context(|| format!("保存快照失败: {}", path.display()))?;
        info!("Snapshot written to {}", path.display());
        Ok(())
    }
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到Ctrl+C信号"),
        _ = terminate => info!("收到SIGTERM信号"),
    }
}
