//! Core data types exchanged between hooks and the engine

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use super::mutation::ChangeSet;

/// Opaque state a module carries across invocations
pub type ModuleContext = Map<String, Value>;

/// Module contexts keyed by module code
pub type ModuleContexts = HashMap<String, ModuleContext>;

/// Opaque analytics data passed through to the outcome
pub type AnalyticsTags = Value;

/// Names a hook occurrence in outcome records
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookId {
    pub module_code: String,
    pub hook_impl_code: String,
}

impl HookId {
    pub fn new(module_code: impl Into<String>, hook_impl_code: impl Into<String>) -> Self {
        Self {
            module_code: module_code.into(),
            hook_impl_code: hook_impl_code.into(),
        }
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module_code, self.hook_impl_code)
    }
}

/// Value a module receives on invocation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleInvocationContext {
    /// Endpoint of the request being processed
    pub endpoint: String,
    /// Module configuration, if the executor has any for this module
    pub account_config: Option<Value>,
    /// Context the module stored during earlier groups and stages
    pub module_context: ModuleContext,
}

/// Result produced by a hook
///
/// `nbr_code` is only meaningful when `reject` is set.
#[derive(Clone)]
pub struct HookResult<P> {
    pub reject: bool,
    pub nbr_code: i32,
    pub change_set: Option<ChangeSet<P>>,
    pub message: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub debug_messages: Vec<String>,
    pub analytics_tags: AnalyticsTags,
    pub module_context: Option<ModuleContext>,
}

impl<P> Default for HookResult<P> {
    fn default() -> Self {
        Self {
            reject: false,
            nbr_code: 0,
            change_set: None,
            message: String::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            debug_messages: Vec::new(),
            analytics_tags: Value::Null,
            module_context: None,
        }
    }
}

impl<P> fmt::Debug for HookResult<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookResult")
            .field("reject", &self.reject)
            .field("nbr_code", &self.nbr_code)
            .field(
                "mutations",
                &self.change_set.as_ref().map_or(0, |cs| cs.len()),
            )
            .field("message", &self.message)
            .field("errors", &self.errors)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl<P> HookResult<P> {
    /// Result asking to abort the request with the given reason code
    pub fn rejected(nbr_code: i32) -> Self {
        Self {
            reject: true,
            nbr_code,
            ..Self::default()
        }
    }

    /// Result carrying a set of payload mutations
    pub fn with_change_set(change_set: ChangeSet<P>) -> Self {
        Self {
            change_set: Some(change_set),
            ..Self::default()
        }
    }

    /// Attach a module context to persist for later invocations
    pub fn with_module_context(mut self, module_context: ModuleContext) -> Self {
        self.module_context = Some(module_context);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_analytics_tags(mut self, tags: AnalyticsTags) -> Self {
        self.analytics_tags = tags;
        self
    }
}

/// Merge freshly produced module contexts into stored ones.
///
/// Keys of an incoming context overwrite the stored keys of the same module;
/// stored keys absent from the incoming context are kept.
pub fn merge_module_contexts(stored: &mut ModuleContexts, incoming: ModuleContexts) {
    for (module, context) in incoming {
        stored.entry(module).or_default().extend(context);
    }
}
