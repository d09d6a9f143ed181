use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::number::ValueRange;

/// Process-wide registry of named number groups, keyed by group name.
static NUMBER_GROUPS: Lazy<RwLock<HashMap<String, Arc<NumberGroup>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// A named set of value ranges, referenced from condition text as `@name`.
///
/// Members can be added while conditions referencing the group are live;
/// matching always sees the current member list.
#[derive(Debug)]
pub struct NumberGroup {
    name: String,
    members: RwLock<Vec<ValueRange>>,
}

impl NumberGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if any member range overlaps `[min, max]`.
    pub fn matches(&self, min: u64, max: u64) -> bool {
        self.members
            .read()
            .unwrap()
            .iter()
            .any(|member| min <= member.max && max >= member.min)
    }

    pub fn len(&self) -> usize {
        self.members.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Look up a group by name, creating it empty on first reference. A
/// condition may therefore be installed before its group is populated; an
/// empty group matches nothing.
pub fn number_group(name: &str) -> Arc<NumberGroup> {
    if let Some(group) = NUMBER_GROUPS.read().unwrap().get(name) {
        return Arc::clone(group);
    }
    let mut registry = NUMBER_GROUPS.write().unwrap();
    Arc::clone(registry.entry(name.to_string()).or_insert_with(|| {
        Arc::new(NumberGroup {
            name: name.to_string(),
            members: RwLock::new(Vec::new()),
        })
    }))
}

/// Add member ranges to a group, creating it if needed.
pub fn register_number_group(
    name: &str,
    ranges: impl IntoIterator<Item = (u64, u64)>,
) -> Arc<NumberGroup> {
    let group = number_group(name);
    group
        .members
        .write()
        .unwrap()
        .extend(ranges.into_iter().map(|(min, max)| ValueRange::new(min, max)));
    group
}
