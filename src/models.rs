use std::fmt::{Display, Formatter, Result as FmtResult};
use std::mem;

use crate::keywords::Keyword;
use crate::number::NumberUnion;

/// One side of a comparison clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Operand {
    /// A symbolic keyword, resolved at evaluation time.
    Field(Keyword),
    /// A parsed numeric range or group reference. Literal sides consume the
    /// condition's operand list left to right, left side before right.
    Literal,
}

/// One `left OP right` comparison unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ConditionElement {
    pub(crate) left: Operand,
    pub(crate) right: Operand,
    pub(crate) equals: bool,
}

/// A compiled condition: the AND of its comparison clauses. Immutable once
/// committed to the store and shared between rules through `Arc`; identity
/// is structural equality over the clause and operand sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub(crate) elements: Vec<ConditionElement>,
    pub(crate) numbers: Vec<NumberUnion>,
}

impl Condition {
    /// Number of comparison clauses.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of parsed numeric operands.
    pub fn operand_count(&self) -> usize {
        self.numbers.len()
    }

    /// Storage charged against the policy memory quota: one header plus the
    /// clause and operand arrays.
    pub fn byte_size(&self) -> usize {
        mem::size_of::<Condition>()
            + self.elements.len() * mem::size_of::<ConditionElement>()
            + self.numbers.len() * mem::size_of::<NumberUnion>()
    }
}

/// Reconstructs the condition's source text. Clause order and operand
/// consumption order are preserved by compilation, so the compiled form
/// alone is enough to print the line the administrator wrote.
impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut numbers = self.numbers.iter();
        for (i, elem) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write_side(f, elem.left, &mut numbers)?;
            write!(f, "{}", if elem.equals { "=" } else { "!=" })?;
            write_side(f, elem.right, &mut numbers)?;
        }
        Ok(())
    }
}

fn write_side(
    f: &mut Formatter<'_>,
    side: Operand,
    numbers: &mut std::slice::Iter<'_, NumberUnion>,
) -> FmtResult {
    match side {
        Operand::Field(keyword) => write!(f, "{keyword}"),
        Operand::Literal => match numbers.next() {
            Some(number) => write!(f, "{number}"),
            None => Err(std::fmt::Error),
        },
    }
}
