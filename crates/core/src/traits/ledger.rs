use async_trait::async_trait;

use crate::models::ChainOutcome;
use crate::SchedulerResult;

/// Settlement hook called once a terminal task has been persisted locally.
///
/// Ledger write-back (completion and refund calls) is not implemented here;
/// hosts that have it plug in their own hook.
#[async_trait]
pub trait LedgerHook: Send + Sync {
    async fn finalize_on_chain(&self, task_id: &str, outcome: &ChainOutcome) -> SchedulerResult<()>;
}

/// Default hook: does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLedgerHook;

#[async_trait]
impl LedgerHook for NoopLedgerHook {
    async fn finalize_on_chain(&self, task_id: &str, outcome: &ChainOutcome) -> SchedulerResult<()> {
        tracing::trace!(task.id = task_id, ?outcome, "ledger hook not configured, skipping");
        Ok(())
    }
}
