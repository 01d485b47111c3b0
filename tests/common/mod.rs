//! Scripted hooks shared by the integration tests
//!
//! The hook value itself describes what the hook does, so a plan can be built
//! from plain data and run through a single handler.

#![allow(dead_code)]

use async_trait::async_trait;
use hookexec::{
    ChangeSet, HookCallContext, HookError, HookHandler, HookResult, HookWrapper,
    ModuleContext, ModuleInvocationContext, MutationType, SharedHandler,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Payload = Vec<String>;

#[derive(Clone, Debug)]
pub enum Act {
    /// Append the hook name to the payload
    Append,
    /// Reject with a code, also asking for an edit that must never land
    Reject(i32),
    /// Report a business failure
    Fail,
    /// Return an empty result
    Noop,
    /// Store a value in the module context
    Remember(&'static str, Value),
}

#[derive(Clone, Debug)]
pub struct Script {
    pub name: &'static str,
    pub delay: Duration,
    pub act: Act,
    /// Keep running after the call context is cancelled
    pub ignore_cancel: bool,
}

#[derive(Clone, Debug)]
pub struct Invocation {
    pub name: &'static str,
    pub module_ctx: ModuleInvocationContext,
}

#[derive(Default)]
pub struct ScriptRunner {
    pub invocations: Mutex<Vec<Invocation>>,
    pub cancelled: AtomicUsize,
    pub finished: AtomicUsize,
}

impl ScriptRunner {
    pub fn invoked(&self) -> Vec<&'static str> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.name)
            .collect()
    }

    pub fn invocation(&self, name: &str) -> Option<Invocation> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.name == name)
            .cloned()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HookHandler<Script, Payload> for ScriptRunner {
    async fn call(
        &self,
        ctx: HookCallContext,
        module_ctx: ModuleInvocationContext,
        hook: Script,
        _payload: Payload,
    ) -> Result<HookResult<Payload>, HookError> {
        self.invocations.lock().unwrap().push(Invocation {
            name: hook.name,
            module_ctx,
        });

        if hook.ignore_cancel {
            tokio::time::sleep(hook.delay).await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(hook.delay) => {}
                _ = ctx.cancelled() => {
                    self.cancelled.fetch_add(1, Ordering::SeqCst);
                    return Err(HookError::failure("cancelled"));
                }
            }
        }
        self.finished.fetch_add(1, Ordering::SeqCst);

        match hook.act {
            Act::Append => Ok(HookResult::with_change_set(append(hook.name))),
            Act::Reject(code) => {
                let mut result = HookResult::rejected(code);
                result.change_set = Some(append("edit-from-rejecting-hook"));
                Ok(result)
            }
            Act::Fail => Err(HookError::failure(format!("{} refused", hook.name))),
            Act::Noop => Ok(HookResult::default()),
            Act::Remember(key, value) => {
                let mut module_context = ModuleContext::new();
                module_context.insert(key.to_string(), value);
                Ok(HookResult::default().with_module_context(module_context))
            }
        }
    }
}

pub fn append(tag: &'static str) -> ChangeSet<Payload> {
    let mut change_set = ChangeSet::new();
    change_set.add_mutation(
        move |mut payload: Payload| {
            payload.push(tag.to_string());
            Ok(payload)
        },
        MutationType::Add,
        &["tags"],
    );
    change_set
}

pub fn hook(module: &str, name: &'static str, delay_ms: u64, act: Act) -> HookWrapper<Script> {
    HookWrapper::new(
        module,
        name,
        Script {
            name,
            delay: Duration::from_millis(delay_ms),
            act,
            ignore_cancel: false,
        },
    )
}

pub fn stubborn(module: &str, name: &'static str, delay_ms: u64) -> HookWrapper<Script> {
    let mut wrapper = hook(module, name, delay_ms, Act::Append);
    wrapper.hook.ignore_cancel = true;
    wrapper
}

pub fn runner() -> (Arc<ScriptRunner>, SharedHandler<Script, Payload>) {
    let runner = Arc::new(ScriptRunner::default());
    let handler: SharedHandler<Script, Payload> = runner.clone();
    (runner, handler)
}

pub fn payload(tags: &[&str]) -> Payload {
    tags.iter().map(|t| t.to_string()).collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
