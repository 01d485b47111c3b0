//! Fan-in of hook responses

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::invoker::HookResponse;
use super::plan::StageCapabilities;

/// Read responses in completion order until the channel closes or a hook
/// rejects the request.
///
/// The stage capability is queried once per reject attempt and the answer is
/// recorded on the response as `reject_honored`; the reducer relies on it.
///
/// An honored reject raises `abort` and stops reading; hooks still running
/// notice the abort on their own and are not drained here. A reject on a stage
/// that does not support rejection is collected like any other response and
/// does not abort the group: it is reported as a failure of that one hook, and
/// the other hooks of the group still complete and get their outcomes.
pub(crate) async fn collect_responses<P>(
    mut responses: mpsc::Receiver<HookResponse<P>>,
    abort: &CancellationToken,
    stage: &str,
    capabilities: &dyn StageCapabilities,
) -> Vec<HookResponse<P>> {
    let mut collected = Vec::new();
    while let Some(mut response) = responses.recv().await {
        if response.error.is_none() && response.result.reject {
            response.reject_honored = capabilities.is_rejectable(stage);
        }
        let honored = response.reject_honored;
        let hook_id = response.hook_id.clone();
        collected.push(response);
        if honored {
            debug!(hook = %hook_id, stage, "Hook rejected request, aborting group");
            abort.cancel();
            break;
        }
    }
    collected
}
