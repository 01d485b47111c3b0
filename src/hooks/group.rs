//! Parallel execution of the hooks of one group

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::collector::collect_responses;
use super::context::ExecutionContext;
use super::handler::SharedHandler;
use super::invoker::{invoke_hook, HookInvocation};
use super::plan::{Group, StageCapabilities};
use super::reducer::{reduce_responses, GroupResult};

/// Run every hook of `group` concurrently against `payload` and fold their
/// responses.
///
/// Each hook gets its own task and its own deadline of `group.timeout`. A
/// supervising task joins the hook tasks and closes the response channel once
/// all of them are done. The first honored reject aborts the group: responses
/// arriving after it are dropped and the hooks still running are abandoned.
///
/// Responses are folded in completion order, so with several mutating hooks
/// the order of their edits depends on which hook finished first.
pub async fn execute_group<H, P>(
    ctx: &ExecutionContext,
    group: &Group<H>,
    payload: P,
    handler: &SharedHandler<H, P>,
    capabilities: &dyn StageCapabilities,
) -> GroupResult<P>
where
    H: Clone + Send + Sync + 'static,
    P: Clone + Send + 'static,
{
    let abort = CancellationToken::new();
    // one slot per hook: a finished hook never waits on the collector
    let (tx, rx) = mpsc::channel(group.hooks.len().max(1));

    debug!(stage = %ctx.stage, hooks = group.hooks.len(), "Executing hook group");

    let mut tasks = Vec::with_capacity(group.hooks.len());
    for wrapper in &group.hooks {
        let invocation = HookInvocation {
            wrapper: wrapper.clone(),
            module_ctx: ctx.module_invocation_context(&wrapper.module),
            payload: payload.clone(),
            timeout: group.timeout,
        };
        tasks.push(tokio::spawn(invoke_hook(
            invocation,
            handler.clone(),
            tx.clone(),
            abort.clone(),
        )));
    }

    // the supervisor holds the last sender: dropping it after every hook task
    // has finished tells the collector there is nothing more to read
    tokio::spawn(async move {
        for joined in futures::future::join_all(tasks).await {
            if let Err(e) = joined {
                debug!(error = %e, "Hook task ended abnormally");
            }
        }
        drop(tx);
    });

    let responses = collect_responses(rx, &abort, &ctx.stage, capabilities).await;
    reduce_responses(ctx, responses, payload)
}
