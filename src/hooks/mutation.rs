//! Payload mutations requested by hooks and the applier folding them into a payload

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::outcome::{Action, HookOutcome};

/// Kind of edit a mutation performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    Add,
    Update,
    Delete,
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationType::Add => "add",
            MutationType::Update => "update",
            MutationType::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Function turning a payload into its mutated version
pub type MutationFn<P> = Arc<dyn Fn(P) -> anyhow::Result<P> + Send + Sync>;

/// A single payload edit
pub struct Mutation<P> {
    mutation_type: MutationType,
    key: Vec<String>,
    func: MutationFn<P>,
}

impl<P> Clone for Mutation<P> {
    fn clone(&self) -> Self {
        Self {
            mutation_type: self.mutation_type,
            key: self.key.clone(),
            func: self.func.clone(),
        }
    }
}

impl<P> fmt::Debug for Mutation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("mutation_type", &self.mutation_type)
            .field("key", &self.key)
            .finish()
    }
}

impl<P> Mutation<P> {
    pub fn new<F>(mutation_type: MutationType, key: Vec<String>, func: F) -> Self
    where
        F: Fn(P) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        Self {
            mutation_type,
            key,
            func: Arc::new(func),
        }
    }

    pub fn mutation_type(&self) -> MutationType {
        self.mutation_type
    }

    /// Path of the affected key, outermost segment first
    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn apply(&self, payload: P) -> anyhow::Result<P> {
        (self.func)(payload)
    }
}

/// Ordered set of mutations returned by a hook
pub struct ChangeSet<P> {
    mutations: Vec<Mutation<P>>,
}

impl<P> Clone for ChangeSet<P> {
    fn clone(&self) -> Self {
        Self {
            mutations: self.mutations.clone(),
        }
    }
}

impl<P> Default for ChangeSet<P> {
    fn default() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }
}

impl<P> fmt::Debug for ChangeSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.mutations).finish()
    }
}

impl<P> ChangeSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mutation; mutations are applied in insertion order
    pub fn add_mutation<F>(&mut self, func: F, mutation_type: MutationType, key: &[&str]) -> &mut Self
    where
        F: Fn(P) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        let key = key.iter().map(|segment| segment.to_string()).collect();
        self.mutations.push(Mutation::new(mutation_type, key, func));
        self
    }

    pub fn push(&mut self, mutation: Mutation<P>) {
        self.mutations.push(mutation);
    }

    pub fn mutations(&self) -> &[Mutation<P>] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Apply the mutations of a change set to `payload`, in list order.
///
/// A failing mutation leaves the payload as it was and is recorded as a
/// warning; the next mutation runs against the unchanged payload. Each
/// successful mutation is recorded as a debug message. The outcome action is
/// `Update` as soon as one mutation was attempted, `None` otherwise.
pub fn apply_mutations<P: Clone>(
    mut payload: P,
    change_set: Option<&ChangeSet<P>>,
    outcome: &mut HookOutcome,
) -> P {
    let mutations = match change_set {
        Some(change_set) if !change_set.is_empty() => change_set.mutations(),
        _ => {
            outcome.action = Action::None;
            return payload;
        }
    };

    outcome.action = Action::Update;
    for mutation in mutations {
        match mutation.apply(payload.clone()) {
            Ok(updated) => {
                payload = updated;
                outcome.debug_messages.push(format!(
                    "Hook mutation successfully applied, affected key: {}, mutation type: {}",
                    mutation.key().join("."),
                    mutation.mutation_type()
                ));
            }
            Err(e) => {
                warn!(hook = %outcome.hook_id, key = %mutation.key().join("."), error = %e, "Hook mutation failed");
                outcome
                    .warnings
                    .push(format!("failed to apply hook mutation: {}", e));
            }
        }
    }

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::types::HookId;
    use pretty_assertions::assert_eq;

    fn new_outcome() -> HookOutcome {
        HookOutcome::new(HookId::new("acme", "editor"))
    }

    #[test]
    fn test_failed_mutation_is_skipped() {
        let mut change_set = ChangeSet::<Vec<String>>::new();
        change_set
            .add_mutation(
                |mut p| {
                    p.push("m1".to_string());
                    Ok(p)
                },
                MutationType::Add,
                &["user", "ext"],
            )
            .add_mutation(
                |_| Err(anyhow::anyhow!("key not found")),
                MutationType::Delete,
                &["device"],
            )
            .add_mutation(
                |mut p| {
                    p.push("m3".to_string());
                    Ok(p)
                },
                MutationType::Update,
                &["site", "page"],
            );

        let mut outcome = new_outcome();
        let payload = apply_mutations(vec!["p".to_string()], Some(&change_set), &mut outcome);

        assert_eq!(payload, vec!["p", "m1", "m3"]);
        assert_eq!(outcome.action, Action::Update);
        assert_eq!(
            outcome.warnings,
            vec!["failed to apply hook mutation: key not found".to_string()]
        );
        assert_eq!(
            outcome.debug_messages,
            vec![
                "Hook mutation successfully applied, affected key: user.ext, mutation type: add"
                    .to_string(),
                "Hook mutation successfully applied, affected key: site.page, mutation type: update"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_failed_mutation_does_not_leak_partial_edit() {
        let mut change_set = ChangeSet::<Vec<i32>>::new();
        change_set.add_mutation(
            |mut p| {
                p.push(99);
                anyhow::bail!("validation failed after edit")
            },
            MutationType::Update,
            &["imp"],
        );

        let mut outcome = new_outcome();
        let payload = apply_mutations(vec![1, 2], Some(&change_set), &mut outcome);

        assert_eq!(payload, vec![1, 2]);
        assert_eq!(outcome.action, Action::Update);
        assert!(outcome.debug_messages.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_missing_or_empty_change_set() {
        let mut outcome = new_outcome();
        assert_eq!(apply_mutations(7, None, &mut outcome), 7);
        assert_eq!(outcome.action, Action::None);

        let mut outcome = new_outcome();
        let empty = ChangeSet::<i32>::new();
        assert_eq!(apply_mutations(7, Some(&empty), &mut outcome), 7);
        assert_eq!(outcome.action, Action::None);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.debug_messages.is_empty());
    }
}
