//! Single-threaded fold of a group's hook responses
//!
//! This is the only place where the payload and module contexts are written.

use tracing::{info, warn};

use super::context::ExecutionContext;
use super::invoker::HookResponse;
use super::mutation::apply_mutations;
use super::outcome::{Action, GroupOutcome, HookOutcome, Status};
use super::types::ModuleContexts;
use crate::core::errors::{HookError, RejectError};

/// Everything a group hands back to its stage
#[derive(Debug)]
pub struct GroupResult<P> {
    pub outcome: GroupOutcome,
    pub payload: P,
    /// Contexts produced by the group's modules
    pub module_contexts: ModuleContexts,
    pub reject: Option<RejectError>,
}

/// Fold responses, in the order they were collected, into a group result.
///
/// Folding stops at the first honored reject. Whether a reject is honored was
/// decided by the collector; the stage capability is not consulted again.
pub(crate) fn reduce_responses<P: Clone>(
    ctx: &ExecutionContext,
    responses: Vec<HookResponse<P>>,
    mut payload: P,
) -> GroupResult<P> {
    let mut outcome = GroupOutcome {
        execution_time: Default::default(),
        invocation_results: Vec::with_capacity(responses.len()),
    };
    let mut module_contexts = ModuleContexts::with_capacity(responses.len());

    for mut response in responses {
        module_contexts.insert(
            response.hook_id.module_code.clone(),
            response.result.module_context.take().unwrap_or_default(),
        );
        outcome.execution_time = outcome.execution_time.max(response.execution_time);

        let (updated, hook_outcome, reject) =
            handle_response(ctx, payload, response);
        payload = updated;
        outcome.invocation_results.push(hook_outcome);

        if reject.is_some() {
            return GroupResult {
                outcome,
                payload,
                module_contexts,
                reject,
            };
        }
    }

    GroupResult {
        outcome,
        payload,
        module_contexts,
        reject: None,
    }
}

/// Classify one response and apply its effect: errors first, then rejects,
/// then mutations.
fn handle_response<P: Clone>(
    ctx: &ExecutionContext,
    payload: P,
    response: HookResponse<P>,
) -> (P, HookOutcome, Option<RejectError>) {
    let HookResponse {
        hook_id,
        result,
        error,
        execution_time,
        reject_honored,
    } = response;

    let mut outcome = HookOutcome {
        hook_id,
        status: Status::Success,
        action: Action::None,
        message: result.message,
        errors: result.errors,
        warnings: result.warnings,
        debug_messages: result.debug_messages,
        analytics_tags: result.analytics_tags,
        execution_time,
    };

    if let Some(error) = error {
        handle_error(error, &mut outcome);
        return (payload, outcome, None);
    }

    if result.reject {
        let reject = handle_reject(ctx, reject_honored, result.nbr_code, &mut outcome);
        return (payload, outcome, reject);
    }

    let payload = apply_mutations(payload, result.change_set.as_ref(), &mut outcome);
    (payload, outcome, None)
}

fn handle_error(error: HookError, outcome: &mut HookOutcome) {
    outcome.errors.push(error.to_string());
    outcome.status = match error {
        HookError::Timeout => Status::Timeout,
        HookError::Failure(_) => Status::Failure,
        HookError::Panicked(_) | HookError::Other(_) => Status::ExecutionFailure,
    };
}

fn handle_reject(
    ctx: &ExecutionContext,
    honored: bool,
    nbr_code: i32,
    outcome: &mut HookOutcome,
) -> Option<RejectError> {
    if !honored {
        warn!(hook = %outcome.hook_id, stage = %ctx.stage, "Hook tried to reject on a non-rejectable stage");
        outcome.status = Status::ExecutionFailure;
        outcome.errors.push(format!(
            "Module (name: {}, hook code: {}) tried to reject request on the {} stage that does not support rejection",
            outcome.hook_id.module_code, outcome.hook_id.hook_impl_code, ctx.stage
        ));
        return None;
    }

    let reject = RejectError {
        nbr_code,
        hook_id: outcome.hook_id.clone(),
        stage: ctx.stage.clone(),
    };
    info!(hook = %outcome.hook_id, stage = %ctx.stage, nbr_code, "Hook rejected request");
    outcome.action = Action::Reject;
    outcome.errors.push(reject.to_string());
    Some(reject)
}
