//! Hook execution engine
//!
//! Hooks run at stages of a request pipeline. A stage is a plan of groups run
//! one after another; the hooks of a group run in parallel under a shared
//! timeout. Responses are folded into the payload on a single task, so hooks
//! never touch the payload or module contexts concurrently.

pub mod types;
pub mod plan;
pub mod context;
pub mod outcome;
pub mod handler;
pub mod mutation;
pub mod group;
pub mod stage;
pub mod executor;

mod invoker;
mod collector;
mod reducer;

pub use types::*;
pub use plan::*;
pub use context::*;
pub use outcome::*;
pub use handler::*;
pub use mutation::*;
pub use group::execute_group;
pub use stage::{execute_stage, StageResult};
pub use executor::HookExecutor;
pub use reducer::GroupResult;
