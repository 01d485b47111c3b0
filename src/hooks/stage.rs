//! Sequential execution of the groups of one stage

use tracing::debug;

use super::context::ExecutionContext;
use super::group::execute_group;
use super::handler::SharedHandler;
use super::outcome::StageOutcome;
use super::plan::{Group, StageCapabilities};
use super::types::ModuleContexts;
use crate::core::errors::RejectError;

/// Everything a stage hands back to the pipeline driver
#[derive(Debug)]
pub struct StageResult<P> {
    pub outcome: StageOutcome,
    pub payload: P,
    /// Module contexts accumulated over all groups run, on top of the ones
    /// the stage started with
    pub module_contexts: ModuleContexts,
    pub reject: Option<RejectError>,
}

/// Run the groups of `plan` in order, threading the payload from one group to
/// the next.
///
/// Module contexts produced by a group are visible to the groups after it.
/// Stage time is the sum of group times.
///
/// When a group rejects, no further group runs and the returned payload is the
/// one the rejecting group started from: edits made earlier in that same group
/// are discarded as a whole, edits of previous groups are kept.
pub async fn execute_stage<H, P>(
    ctx: &ExecutionContext,
    plan: &[Group<H>],
    mut payload: P,
    handler: &SharedHandler<H, P>,
    capabilities: &dyn StageCapabilities,
) -> StageResult<P>
where
    H: Clone + Send + Sync + 'static,
    P: Clone + Send + 'static,
{
    let mut working = ctx.clone();
    let mut outcome = StageOutcome::new(ctx.stage.clone());
    outcome.groups.reserve(plan.len());

    for (index, group) in plan.iter().enumerate() {
        let result = execute_group(&working, group, payload.clone(), handler, capabilities).await;

        outcome.execution_time += result.outcome.execution_time;
        outcome.groups.push(result.outcome);
        working.merge_module_contexts(result.module_contexts);

        if let Some(reject) = result.reject {
            debug!(stage = %ctx.stage, group = index, "Stage rejected, skipping remaining groups");
            return StageResult {
                outcome,
                payload,
                module_contexts: working.module_contexts,
                reject: Some(reject),
            };
        }

        payload = result.payload;
    }

    StageResult {
        outcome,
        payload,
        module_contexts: working.module_contexts,
        reject: None,
    }
}
