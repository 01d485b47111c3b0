//! Hook handler seam
//!
//! Each stage instantiates the engine with its own hook-value type `H` and
//! payload type `P`; the handler is the only place that knows how to call a
//! hook of that stage.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::context::HookCallContext;
use super::types::{HookResult, ModuleInvocationContext};
use crate::core::errors::HookError;

/// Invokes one hook of a stage
#[async_trait]
pub trait HookHandler<H, P>: Send + Sync {
    async fn call(
        &self,
        ctx: HookCallContext,
        module_ctx: ModuleInvocationContext,
        hook: H,
        payload: P,
    ) -> Result<HookResult<P>, HookError>;
}

#[async_trait]
impl<H, P, F, Fut> HookHandler<H, P> for F
where
    H: Send + 'static,
    P: Send + 'static,
    F: Fn(HookCallContext, ModuleInvocationContext, H, P) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HookResult<P>, HookError>> + Send + 'static,
{
    async fn call(
        &self,
        ctx: HookCallContext,
        module_ctx: ModuleInvocationContext,
        hook: H,
        payload: P,
    ) -> Result<HookResult<P>, HookError> {
        self(ctx, module_ctx, hook, payload).await
    }
}

/// Handler shared by all hook tasks of a stage
pub type SharedHandler<H, P> = Arc<dyn HookHandler<H, P>>;
