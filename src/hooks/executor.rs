//! Per-request driver running stages one after another
//!
//! The executor owns what outlives a single stage: module contexts, recorded
//! outcomes and the reject that ended the request, if any.

use std::sync::Arc;
use tracing::info;

use super::context::ExecutionContext;
use super::handler::SharedHandler;
use super::outcome::{Status, StageOutcome};
use super::plan::{DefaultStages, Group, StageCapabilities};
use super::stage::execute_stage;
use super::types::ModuleContexts;
use crate::core::config::ExecutorConfig;
use crate::core::errors::RejectError;

/// Hook executor for one request
pub struct HookExecutor {
    config: ExecutorConfig,
    capabilities: Arc<dyn StageCapabilities>,
    module_contexts: ModuleContexts,
    outcomes: Vec<StageOutcome>,
    rejection: Option<RejectError>,
}

impl HookExecutor {
    /// Create an executor using the capabilities of the well-known stages
    pub fn new(config: ExecutorConfig) -> Self {
        Self::with_capabilities(config, Arc::new(DefaultStages))
    }

    pub fn with_capabilities(
        config: ExecutorConfig,
        capabilities: Arc<dyn StageCapabilities>,
    ) -> Self {
        Self {
            config,
            capabilities,
            module_contexts: ModuleContexts::new(),
            outcomes: Vec::new(),
            rejection: None,
        }
    }

    /// Run the hooks of `stage` against `payload`.
    ///
    /// Returns the updated payload together with the reject that ended the
    /// request, if any. On a reject the payload is the one the rejecting group
    /// started from, with the edits of earlier groups applied. Once a stage
    /// was rejected every later call hands `payload` back untouched with that
    /// same reject. With hooks disabled the payload is returned untouched.
    pub async fn execute_stage<H, P>(
        &mut self,
        stage: &str,
        plan: &[Group<H>],
        payload: P,
        handler: SharedHandler<H, P>,
    ) -> (P, Option<RejectError>)
    where
        H: Clone + Send + Sync + 'static,
        P: Clone + Send + 'static,
    {
        if let Some(reject) = &self.rejection {
            return (payload, Some(reject.clone()));
        }
        if !self.config.enabled {
            return (payload, None);
        }

        let ctx = ExecutionContext::new(self.config.endpoint.clone(), stage)
            .with_account_config(self.config.modules.clone())
            .with_module_contexts(std::mem::take(&mut self.module_contexts));

        let result = execute_stage(&ctx, plan, payload, &handler, self.capabilities.as_ref()).await;

        if self.config.log_outcomes {
            log_stage_outcome(&result.outcome);
        }
        self.module_contexts = result.module_contexts;
        self.outcomes.push(result.outcome);

        if let Some(reject) = &result.reject {
            self.rejection = Some(reject.clone());
        }
        (result.payload, result.reject)
    }

    /// Outcomes of the stages run so far, in execution order
    pub fn outcomes(&self) -> &[StageOutcome] {
        &self.outcomes
    }

    pub fn module_contexts(&self) -> &ModuleContexts {
        &self.module_contexts
    }

    /// The reject that ended the request, if any
    pub fn rejection(&self) -> Option<&RejectError> {
        self.rejection.as_ref()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

fn log_stage_outcome(outcome: &StageOutcome) {
    let (mut hooks, mut failed) = (0usize, 0usize);
    for hook in outcome.hook_outcomes() {
        hooks += 1;
        if hook.status != Status::Success {
            failed += 1;
        }
    }
    info!(
        stage = %outcome.stage,
        groups = outcome.groups.len(),
        hooks,
        failed,
        execution_time_ms = outcome.execution_time.as_millis() as u64,
        "Stage hooks executed"
    );
}
