// Core infrastructure modules
pub mod core {
    pub mod errors;
    pub mod config;
}

// Hook execution engine
pub mod hooks;

// Re-exports for convenience
pub use crate::core::config::ExecutorConfig;
pub use crate::core::errors::{ExecError, HookError, RejectError, Result};
pub use hooks::*;
