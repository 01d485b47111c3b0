//! Runs a single hook under its own deadline, racing the group's abort signal

use std::any::Any;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::context::{deadline_after, HookCallContext};
use super::handler::SharedHandler;
use super::plan::HookWrapper;
use super::types::{HookId, HookResult, ModuleInvocationContext};
use crate::core::errors::HookError;

/// What a hook task reports back to the collector
#[derive(Debug)]
pub(crate) struct HookResponse<P> {
    pub hook_id: HookId,
    pub result: HookResult<P>,
    pub error: Option<HookError>,
    pub execution_time: Duration,
    /// Set by the collector when the stage honors this response's reject
    pub reject_honored: bool,
}

impl<P> HookResponse<P> {
    fn failed(hook_id: HookId, error: HookError, execution_time: Duration) -> Self {
        Self {
            hook_id,
            result: HookResult::default(),
            error: Some(error),
            execution_time,
            reject_honored: false,
        }
    }
}

/// Everything one hook task needs
pub(crate) struct HookInvocation<H, P> {
    pub wrapper: HookWrapper<H>,
    pub module_ctx: ModuleInvocationContext,
    pub payload: P,
    pub timeout: Duration,
}

/// Invoke one hook and report its response, unless the group aborts first.
///
/// The handler runs in its own task so that abandoning it never depends on the
/// hook cooperating. Delivery of the response races the abort signal as well:
/// once the collector stopped reading, this returns instead of waiting on the
/// channel.
pub(crate) async fn invoke_hook<H, P>(
    invocation: HookInvocation<H, P>,
    handler: SharedHandler<H, P>,
    responses: mpsc::Sender<HookResponse<P>>,
    abort: CancellationToken,
) where
    H: Send + 'static,
    P: Send + 'static,
{
    let HookInvocation {
        wrapper,
        module_ctx,
        payload,
        timeout,
    } = invocation;
    let hook_id = HookId::new(wrapper.module, wrapper.code);
    let started = Instant::now();
    let call_ctx = HookCallContext::new(deadline_after(started, timeout), abort.child_token());

    debug!(hook = %hook_id, timeout_ms = timeout.as_millis() as u64, "Invoking hook");

    let mut task = {
        let call_ctx = call_ctx.clone();
        let hook = wrapper.hook;
        tokio::spawn(async move { handler.call(call_ctx, module_ctx, hook, payload).await })
    };

    let finished = tokio::select! {
        biased;
        _ = abort.cancelled() => None,
        joined = tokio::time::timeout(timeout, &mut task) => Some(joined),
    };

    let response = match finished {
        None => {
            debug!(hook = %hook_id, "Group aborted, abandoning hook");
            return;
        }
        Some(Ok(joined)) => {
            let execution_time = started.elapsed();
            match joined {
                Ok(Ok(result)) => HookResponse {
                    hook_id,
                    result,
                    error: None,
                    execution_time,
                    reject_honored: false,
                },
                Ok(Err(e)) => HookResponse::failed(hook_id, e, execution_time),
                Err(e) => HookResponse::failed(hook_id, panic_error(e), execution_time),
            }
        }
        Some(Err(_)) => {
            call_ctx.cancel();
            debug!(hook = %hook_id, "Hook timed out");
            HookResponse::failed(hook_id, HookError::Timeout, timeout)
        }
    };

    tokio::select! {
        biased;
        _ = abort.cancelled() => {
            debug!("Group aborted, discarding finished hook response");
        }
        sent = responses.send(response) => {
            if sent.is_err() {
                debug!("Response collector is gone, discarding hook response");
            }
        }
    }
}

fn panic_error(err: JoinError) -> HookError {
    if !err.is_panic() {
        return HookError::Panicked("hook task was cancelled".to_string());
    }
    let payload: Box<dyn Any + Send> = err.into_panic();
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    HookError::Panicked(message)
}
