//! Execution context threaded through a stage, and the per-hook call context

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::types::{merge_module_contexts, ModuleContexts, ModuleInvocationContext};

/// Stand-in deadline for timeouts too large to be represented as an instant
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `start + timeout`, saturating to a far-future instant on overflow
pub(crate) fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

/// State shared by all groups of the stage being executed
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    pub endpoint: String,
    pub stage: String,
    /// Module configuration keyed by module code
    pub account_config: HashMap<String, Value>,
    /// Contexts modules produced in earlier groups and stages
    pub module_contexts: ModuleContexts,
}

impl ExecutionContext {
    pub fn new(endpoint: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            stage: stage.into(),
            ..Self::default()
        }
    }

    pub fn with_account_config(mut self, account_config: HashMap<String, Value>) -> Self {
        self.account_config = account_config;
        self
    }

    pub fn with_module_contexts(mut self, module_contexts: ModuleContexts) -> Self {
        self.module_contexts = module_contexts;
        self
    }

    /// Build the value handed to a hook of `module`
    pub fn module_invocation_context(&self, module: &str) -> ModuleInvocationContext {
        ModuleInvocationContext {
            endpoint: self.endpoint.clone(),
            account_config: self.account_config.get(module).cloned(),
            module_context: self.module_contexts.get(module).cloned().unwrap_or_default(),
        }
    }

    pub fn merge_module_contexts(&mut self, incoming: ModuleContexts) {
        merge_module_contexts(&mut self.module_contexts, incoming);
    }
}

/// Deadline and cancellation handed to a single hook invocation.
///
/// The token is cancelled once the deadline passes or the group is aborted.
/// Cancellation is advisory: hooks that ignore it keep running, their result
/// is simply no longer reported.
#[derive(Clone, Debug)]
pub struct HookCallContext {
    deadline: Instant,
    token: CancellationToken,
}

impl HookCallContext {
    pub fn new(deadline: Instant, token: CancellationToken) -> Self {
        Self { deadline, token }
    }

    /// Context with its own token, expiring `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(deadline_after(Instant::now(), timeout), CancellationToken::new())
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the invocation is no longer awaited
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
