use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConditionError;
use crate::groups::{NumberGroup, number_group};

/// Radix a numeric literal was written in. Kept per bound so reconstructed
/// policy text prints values the way the administrator wrote them, and so
/// that spellings in different radixes compile to distinct operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Radix {
    Decimal,
    Octal,
    Hex,
}

/// An inclusive `[min, max]` value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: u64,
    pub max: u64,
    pub min_radix: Radix,
    pub max_radix: Radix,
}

impl ValueRange {
    /// Range over decimal bounds.
    pub fn new(min: u64, max: u64) -> Self {
        ValueRange {
            min,
            max,
            min_radix: Radix::Decimal,
            max_radix: Radix::Decimal,
        }
    }
}

fn write_value(f: &mut Formatter<'_>, value: u64, radix: Radix) -> FmtResult {
    match radix {
        Radix::Hex => write!(f, "0x{value:X}"),
        Radix::Octal => write!(f, "0{value:o}"),
        Radix::Decimal => write!(f, "{value}"),
    }
}

impl Display for ValueRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_value(f, self.min, self.min_radix)?;
        if self.min == self.max && self.min_radix == self.max_radix {
            return Ok(());
        }
        write!(f, "-")?;
        write_value(f, self.max, self.max_radix)
    }
}

/// A parsed numeric operand: a literal value range, or a reference to a
/// named number group. Never both.
#[derive(Debug, Clone)]
pub enum NumberUnion {
    Range(ValueRange),
    Group(Arc<NumberGroup>),
}

impl PartialEq for NumberUnion {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberUnion::Range(a), NumberUnion::Range(b)) => a == b,
            // The registry interns groups by name, so name equality is
            // instance equality.
            (NumberUnion::Group(a), NumberUnion::Group(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl Eq for NumberUnion {}

impl Hash for NumberUnion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            NumberUnion::Range(range) => {
                0u8.hash(state);
                range.hash(state);
            }
            NumberUnion::Group(group) => {
                1u8.hash(state);
                group.name().hash(state);
            }
        }
    }
}

impl Display for NumberUnion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NumberUnion::Range(range) => write!(f, "{range}"),
            NumberUnion::Group(group) => write!(f, "@{}", group.name()),
        }
    }
}

/// Parse one unsigned value, returning the radix it was spelled in.
/// `0x`/`0X` prefixes hex, a leading `0` followed by an octal digit prefixes
/// octal, everything else is decimal.
fn parse_value(text: &str) -> Option<(u64, Radix)> {
    let bytes = text.as_bytes();
    if !bytes.first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).ok().map(|v| (v, Radix::Hex));
    }
    if bytes.len() > 1 && bytes[0] == b'0' && (b'0'..=b'7').contains(&bytes[1]) {
        return u64::from_str_radix(&text[1..], 8).ok().map(|v| (v, Radix::Octal));
    }
    text.parse().ok().map(|v| (v, Radix::Decimal))
}

/// Parse one numeric operand: `value`, `min-max`, or `@group`.
pub(crate) fn parse_number_union(text: &str) -> Result<NumberUnion, ConditionError> {
    if let Some(name) = text.strip_prefix('@') {
        if name.is_empty() {
            return Err(ConditionError::Parse("empty group name".to_string()));
        }
        return Ok(NumberUnion::Group(number_group(name)));
    }
    let range = match text.split_once('-') {
        Some((lo, hi)) => match (parse_value(lo), parse_value(hi)) {
            (Some((min, min_radix)), Some((max, max_radix))) if min <= max => Some(ValueRange {
                min,
                max,
                min_radix,
                max_radix,
            }),
            _ => None,
        },
        None => parse_value(text).map(|(v, radix)| ValueRange {
            min: v,
            max: v,
            min_radix: radix,
            max_radix: radix,
        }),
    };
    range
        .map(NumberUnion::Range)
        .ok_or_else(|| ConditionError::Parse(format!("invalid number or range: {text}")))
}
