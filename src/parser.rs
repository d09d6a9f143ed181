use tracing::debug;

use crate::error::ConditionError;
use crate::keywords::Keyword;
use crate::models::{Condition, ConditionElement, Operand};
use crate::number::{NumberUnion, parse_number_union};

/// Compile one condition line.
///
/// The grammar is zero or more space separated clauses of the form
/// `left=right` or `left!=right`, where `left` is free of `=` and both sides
/// are free of spaces. A side that is no recognized keyword must parse as a
/// numeric value, range, or `@group` reference; group references are only
/// legal on the right side. An empty line compiles to the empty condition.
pub(crate) fn parse(text: &str) -> Result<Condition, ConditionError> {
    let mut elements = Vec::new();
    let mut numbers = Vec::new();
    for token in text.split(' ') {
        // Separator normalization is the policy loader's job; a doubled or
        // trailing separator reads as end of line.
        if token.is_empty() {
            break;
        }
        let (left_word, right_word, equals) = split_clause(token)?;
        let left = parse_left(left_word, &mut numbers)?;
        let right = parse_right(right_word, &mut numbers)?;
        elements.push(ConditionElement {
            left,
            right,
            equals,
        });
    }
    debug!(
        event = "Condition",
        phase = "Parse",
        clauses = elements.len(),
        operands = numbers.len()
    );
    Ok(Condition { elements, numbers })
}

/// Split one clause on its operator. Only `=` and `!=` are legal; `==` is
/// rejected even though the first `=` alone would split cleanly.
fn split_clause(token: &str) -> Result<(&str, &str, bool), ConditionError> {
    let bytes = token.as_bytes();
    let Some(op) = token.find('=') else {
        return Err(ConditionError::Parse(format!(
            "clause without operator: {token}"
        )));
    };
    if op == 0 {
        return Err(ConditionError::Parse(format!(
            "clause with empty left side: {token}"
        )));
    }
    if bytes[op - 1] == b'!' {
        return Ok((&token[..op - 1], &token[op + 1..], false));
    }
    if bytes.get(op + 1) == Some(&b'=') {
        return Err(ConditionError::Parse(format!(
            "illegal operator in clause: {token}"
        )));
    }
    Ok((&token[..op], &token[op + 1..], true))
}

fn parse_left(word: &str, numbers: &mut Vec<NumberUnion>) -> Result<Operand, ConditionError> {
    if let Ok(keyword) = word.parse::<Keyword>() {
        return Ok(Operand::Field(keyword));
    }
    if word.starts_with('@') {
        return Err(ConditionError::Parse(format!(
            "group reference not allowed on the left side: {word}"
        )));
    }
    numbers.push(parse_number_union(word)?);
    Ok(Operand::Literal)
}

fn parse_right(word: &str, numbers: &mut Vec<NumberUnion>) -> Result<Operand, ConditionError> {
    if let Ok(keyword) = word.parse::<Keyword>() {
        return Ok(Operand::Field(keyword));
    }
    numbers.push(parse_number_union(word)?);
    Ok(Operand::Literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        single = { "task.uid=1000", 1, 1 },
        negated = { "task.uid!=1000", 1, 1 },
        keyword_both_sides = { "S_IXUSR=path1.perm", 1, 0 },
        literal_left = { "1000=task.uid", 1, 1 },
        literal_both = { "1-5=3", 1, 2 },
        group_right = { "task.uid=@parser-grp", 1, 1 },
        two_clauses = { "task.uid=1000 task.gid!=100", 2, 2 },
        empty = { "", 0, 0 },
    )]
    fn test_parse_counts(text: &str, clauses: usize, operands: usize) {
        let cond = parse(text).unwrap();
        assert_eq!(cond.len(), clauses);
        assert_eq!(cond.operand_count(), operands);
    }

    #[parameterized(
        bare_word = { "foo" },
        missing_operator = { "task.uid" },
        double_equals = { "task.uid==5" },
        empty_left = { "=5" },
        negated_empty_left = { "!=5" },
        empty_right = { "task.uid=" },
        left_group = { "@grp=5" },
        bad_number = { "task.uid=zebra" },
        inverted_range = { "task.uid=9-5" },
        second_operator = { "task.uid=5=6" },
        bad_second_clause = { "task.uid=1000 nonsense" },
    )]
    fn test_parse_rejects(text: &str) {
        assert!(matches!(parse(text), Err(ConditionError::Parse(_))));
    }

    #[test]
    fn test_operator_and_operand_order_survive() {
        let cond = parse("task.uid=1000 task.gid!=@parser-order 0x5=task.pid").unwrap();
        assert_eq!(cond.len(), 3);
        assert_eq!(cond.operand_count(), 2);
        assert_eq!(cond.elements[0].equals, true);
        assert_eq!(cond.elements[1].equals, false);
        assert_eq!(cond.elements[2].equals, true);
        assert_eq!(cond.elements[2].left, Operand::Literal);
        assert_eq!(
            cond.elements[2].right,
            Operand::Field(Keyword::TaskPid)
        );
        assert!(matches!(cond.numbers[0], NumberUnion::Range(_)));
        assert!(matches!(cond.numbers[1], NumberUnion::Group(_)));
    }

    #[test]
    fn test_empty_token_ends_the_line() {
        let cond = parse("task.uid=1000  this-is-never-reached").unwrap();
        assert_eq!(cond.len(), 1);
    }

    #[test]
    fn test_display_round_trip() {
        let text = "task.uid=1000-0x7D0 path1.perm!=0644 task.gid=@parser-rt";
        let cond = parse(text).unwrap();
        assert_eq!(cond.to_string(), text);
        assert_eq!(parse(&cond.to_string()).unwrap(), cond);
    }
}
