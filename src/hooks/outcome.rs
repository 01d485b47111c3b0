//! Observability records describing what happened during hook execution

use serde::{Serialize, Serializer};
use std::time::Duration;

use super::types::{AnalyticsTags, HookId};

/// How a hook invocation ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Success,
    Timeout,
    Failure,
    ExecutionFailure,
}

/// What the engine did with a hook's result
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Action {
    #[default]
    #[serde(rename = "no_action")]
    None,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "reject")]
    Reject,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

#[derive(Clone, Debug, Serialize)]
pub struct HookOutcome {
    pub hook_id: HookId,
    pub status: Status,
    pub action: Action,
    pub message: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub debug_messages: Vec<String>,
    pub analytics_tags: AnalyticsTags,
    #[serde(rename = "execution_time_millis", serialize_with = "as_millis")]
    pub execution_time: Duration,
}

impl HookOutcome {
    pub fn new(hook_id: HookId) -> Self {
        Self {
            hook_id,
            status: Status::Success,
            action: Action::None,
            message: String::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            debug_messages: Vec::new(),
            analytics_tags: AnalyticsTags::Null,
            execution_time: Duration::ZERO,
        }
    }
}

/// Outcome of one group; hooks appear in completion order
#[derive(Clone, Debug, Default, Serialize)]
pub struct GroupOutcome {
    #[serde(rename = "execution_time_millis", serialize_with = "as_millis")]
    pub execution_time: Duration,
    pub invocation_results: Vec<HookOutcome>,
}

/// Outcome of one stage; groups appear in plan order
#[derive(Clone, Debug, Default, Serialize)]
pub struct StageOutcome {
    pub stage: String,
    #[serde(rename = "execution_time_millis", serialize_with = "as_millis")]
    pub execution_time: Duration,
    pub groups: Vec<GroupOutcome>,
}

impl StageOutcome {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    /// All hook outcomes of the stage, group by group
    pub fn hook_outcomes(&self) -> impl Iterator<Item = &HookOutcome> {
        self.groups
            .iter()
            .flat_map(|group| group.invocation_results.iter())
    }
}
