use std::sync::Arc;

use tracing::debug;

use crate::error::ConditionError;
use crate::keywords::{Keyword, KeywordClass};
use crate::models::{Condition, ConditionElement, Operand};
use crate::number::NumberUnion;
use crate::parser;
use crate::request::{RequestInfo, StatAttr};
use crate::store::ConditionStore;
use crate::traits::MemoryQuota;

/// The main engine handle. Cloneable and thread-safe; clones share one
/// condition store.
#[derive(Clone)]
pub struct ConditionEngine {
    store: Arc<ConditionStore>,
}

impl Default for ConditionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionEngine {
    pub fn new() -> Self {
        ConditionEngine {
            store: Arc::new(ConditionStore::new()),
        }
    }

    pub fn with_quota(quota: Arc<dyn MemoryQuota>) -> Self {
        ConditionEngine {
            store: Arc::new(ConditionStore::with_quota(quota)),
        }
    }

    /// Compile a condition line and intern it, returning the shared
    /// instance. Rules holding equal conditions end up holding the same
    /// `Arc`.
    pub fn compile(&self, text: &str) -> Result<Arc<Condition>, ConditionError> {
        debug!(event = "Condition", phase = "Compile", text);
        let candidate = parser::parse(text)?;
        self.store.commit(candidate)
    }

    /// Evaluate a rule's condition against one request. A rule without a
    /// condition is vacuously satisfied.
    pub fn evaluate(&self, condition: Option<&Condition>, request: &mut RequestInfo) -> bool {
        let Some(condition) = condition else {
            return true;
        };
        let verdict = evaluate_condition(condition, request);
        debug!(
            event = "Condition",
            phase = "Evaluate",
            clauses = condition.len(),
            verdict
        );
        verdict
    }

    /// Drop a rule's reference to a shared condition; the entry leaves the
    /// store when the last rule lets go.
    pub fn release(&self, condition: Arc<Condition>) {
        self.store.release(condition);
    }

    /// Number of distinct conditions currently interned.
    pub fn stored(&self) -> usize {
        self.store.len()
    }
}

/// Clause loop: every clause must hold, first failure wins.
pub(crate) fn evaluate_condition(condition: &Condition, request: &mut RequestInfo) -> bool {
    let mut numbers = condition.numbers.iter();
    condition
        .elements
        .iter()
        .all(|elem| check_element(elem, &mut numbers, request))
}

fn check_element(
    elem: &ConditionElement,
    numbers: &mut std::slice::Iter<'_, NumberUnion>,
    request: &mut RequestInfo,
) -> bool {
    let matches = elem.equals;
    let mut min_v = [0u64; 2];
    let mut max_v = [0u64; 2];
    let mut is_bitop = [false; 2];

    for (j, side) in [elem.left, elem.right].into_iter().enumerate() {
        let Operand::Field(keyword) = side else {
            continue;
        };
        let Some(value) = resolve_keyword(keyword, request) else {
            return false;
        };
        min_v[j] = value;
        max_v[j] = value;
        is_bitop[j] = matches!(keyword.class(), KeywordClass::BitTest(_));
    }

    if elem.left == Operand::Literal {
        // The parser only ever places plain ranges on the left.
        let Some(NumberUnion::Range(range)) = numbers.next() else {
            return false;
        };
        min_v[0] = range.min;
        max_v[0] = range.max;
    }
    if elem.right == Operand::Literal {
        let Some(number) = numbers.next() else {
            return false;
        };
        return match number {
            NumberUnion::Group(group) => group.matches(min_v[0], max_v[0]) == matches,
            NumberUnion::Range(range) => {
                (min_v[0] <= range.max && max_v[0] >= range.min) == matches
            }
        };
    }

    // A bit test is only meaningful against a permission stat field.
    match (is_bitop[0], is_bitop[1]) {
        (true, true) => false,
        (true, false) => perm_operand(elem.right) && ((max_v[0] & max_v[1] != 0) == matches),
        (false, true) => perm_operand(elem.left) && ((max_v[0] & max_v[1] != 0) == matches),
        (false, false) => (min_v[0] <= max_v[1] && max_v[0] >= min_v[1]) == matches,
    }
}

fn perm_operand(side: Operand) -> bool {
    matches!(
        side,
        Operand::Field(keyword) if matches!(keyword.class(), KeywordClass::Stat(_, StatAttr::Perm))
    )
}

fn resolve_keyword(keyword: Keyword, request: &mut RequestInfo) -> Option<u64> {
    match keyword.class() {
        KeywordClass::Cred(attr) => Some(request.creds.value(attr)),
        KeywordClass::TypeTest(bits) | KeywordClass::BitTest(bits) => Some(u64::from(bits)),
        KeywordClass::Stat(slot, attr) => {
            request.obj.revalidate();
            request.obj.stat(slot).map(|stat| stat.value(attr))
        }
    }
}
