// Bounded breadth-first search over the host object graph
//
// Two independent termination guarantees:
// - an identity map (allocation address -> node id) so no object is expanded twice
// - a hard step budget on the number of expanded nodes
//
// Only members whose declared type starts with an allowed prefix are expanded;
// every member of an expanded node is still checked against the role table.

use std::collections::{HashMap, VecDeque};

use super::graph::{object_identity, MemberValue, ObjectRef};
use super::handles::LocatedHandles;
use super::roles::{role_for, Role};

pub const DEFAULT_STEP_BUDGET: usize = 3000;

/// Locator tuning.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Maximum number of objects expanded before the search gives up.
    pub step_budget: usize,
    /// Declared-type prefixes that may be descended into.
    pub traverse_prefixes: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
            traverse_prefixes: default_traverse_prefixes(),
        }
    }
}

pub fn default_traverse_prefixes() -> Vec<String> {
    ["Engine.", "Vulkan.", "Vortice.Vulkan.", "Silk.NET.Vulkan.", "Vk"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl LocatorConfig {
    fn may_traverse(&self, declared_type: &str, runtime_type: &str) -> bool {
        self.traverse_prefixes
            .iter()
            .any(|p| declared_type.starts_with(p.as_str()) || runtime_type.starts_with(p.as_str()))
    }
}

/// Stable integer id for each object reached, keyed by identity.
#[derive(Default)]
struct IdentityMap {
    ids: HashMap<usize, usize>,
}

impl IdentityMap {
    /// Returns the new id, or `None` if the object was already seen.
    fn insert(&mut self, obj: &ObjectRef) -> Option<usize> {
        let next = self.ids.len();
        match self.ids.entry(object_identity(obj)) {
            std::collections::hash_map::Entry::Occupied(_) => None,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(next);
                Some(next)
            }
        }
    }

    fn contains(&self, obj: &ObjectRef) -> bool {
        self.ids.contains_key(&object_identity(obj))
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Walks a host object graph looking for the native Vulkan handles.
pub struct HandleLocator {
    config: LocatorConfig,
}

impl HandleLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn locate(&self, root: &ObjectRef) -> LocatedHandles {
        let budget = self.config.step_budget;
        let mut found = LocatedHandles::default();
        let mut seen = IdentityMap::default();
        // Capacity never grows past the budget: ids are handed out on enqueue
        let mut queue: VecDeque<(usize, ObjectRef)> = VecDeque::with_capacity(budget.min(4096));

        if budget == 0 {
            found.budget_exhausted = true;
            return found;
        }
        if let Some(id) = seen.insert(root) {
            queue.push_back((id, root.clone()));
        }

        while let Some((id, obj)) = queue.pop_front() {
            found.visited += 1;
            log::trace!("locator: node #{} {}", id, obj.type_name());

            for member in obj.members() {
                match &member.value {
                    MemberValue::Unreadable(reason) => {
                        log::debug!(
                            "locator: {}.{} unreadable: {}",
                            obj.type_name(),
                            member.name,
                            reason
                        );
                        continue;
                    }
                    MemberValue::Object(child) => {
                        if !self.config.may_traverse(&member.declared_type, child.type_name()) {
                            continue;
                        }
                        if seen.contains(child) {
                            continue;
                        }
                        if seen.len() >= budget {
                            found.budget_exhausted = true;
                            continue;
                        }
                        if let Some(child_id) = seen.insert(child) {
                            queue.push_back((child_id, child.clone()));
                        }
                    }
                    _ => {
                        let Some((role, raw)) = role_for(&member) else {
                            continue;
                        };
                        if found.record(role, raw) {
                            log::debug!(
                                "locator: {} <- {}.{} ({})",
                                role.as_str(),
                                obj.type_name(),
                                member.name,
                                member.declared_type
                            );
                        }
                    }
                }
            }

            if found.is_complete() {
                break;
            }
        }

        log::info!(
            "Handle locator visited {} object(s){}; found: {}",
            found.visited,
            if found.budget_exhausted { " (step budget exhausted)" } else { "" },
            describe_found(&found)
        );
        found
    }
}

fn describe_found(found: &LocatedHandles) -> String {
    let names: Vec<&str> = Role::ALL
        .iter()
        .filter(|role| found.get(**role).is_some())
        .map(|role| role.as_str())
        .collect();
    if names.is_empty() {
        "nothing".to_string()
    } else {
        names.join(", ")
    }
}
