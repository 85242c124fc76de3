//! Rule evaluator

use super::ast::{BoolOp, Node};
use super::error::{Result, RuleError};
use super::record::{AttrValue, DataRecord};

/// Comparison operators, in detection order. Two-character operators come
/// before their one-character prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gte,
    Lte,
    Gt,
    Lt,
    Eq,
}

const COMPARE_OPS: [(&str, CompareOp); 5] = [
    (">=", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
    ("==", CompareOp::Eq),
];

/// Evaluate a tree against a data record.
///
/// Both children of an operator node are always evaluated. A leaf that cannot
/// be checked (no operator, missing attribute, wrong type, bad literal)
/// evaluates to `false`.
pub fn evaluate(node: &Node, record: &DataRecord) -> bool {
    match node {
        Node::Condition { text } => match check_condition(text, record) {
            Ok(result) => result,
            Err(e) => {
                log::debug!("Condition '{}' evaluated to false: {}", text, e);
                false
            }
        },
        Node::BinaryOp {
            operator,
            left,
            right,
        } => {
            let left = evaluate(left, record);
            let right = evaluate(right, record);
            match operator {
                BoolOp::And => left && right,
                BoolOp::Or => left || right,
            }
        }
    }
}

/// Check a single condition, reporting why it could not be decided.
pub fn check_condition(text: &str, record: &DataRecord) -> Result<bool> {
    let text = text.trim();
    let (symbol, op) = COMPARE_OPS
        .iter()
        .find(|(symbol, _)| text.contains(*symbol))
        .copied()
        .ok_or_else(|| RuleError::MalformedCondition(text.to_string()))?;

    let (attribute, literal) = text
        .split_once(symbol)
        .ok_or_else(|| RuleError::MalformedCondition(text.to_string()))?;
    let attribute = attribute.trim();
    let literal = literal.trim();

    match op {
        CompareOp::Eq => {
            let expected = literal.trim_matches(|c: char| c == '"' || c == '\'');
            match record.get(attribute) {
                Some(AttrValue::Str(actual)) => Ok(actual == expected),
                // no numeric coercion: 35 never equals "35"
                Some(AttrValue::Int(_)) => Ok(false),
                None => Err(RuleError::missing_attribute(attribute)),
            }
        }
        _ => {
            let expected: i64 = literal
                .parse()
                .map_err(|_| RuleError::InvalidLiteral(literal.to_string()))?;
            let actual = match record.get(attribute) {
                Some(AttrValue::Int(v)) => *v,
                Some(AttrValue::Str(_)) => {
                    return Err(RuleError::type_mismatch(attribute, "an integer"))
                }
                None => return Err(RuleError::missing_attribute(attribute)),
            };
            Ok(compare_numbers(op, actual, expected))
        }
    }
}

fn compare_numbers(op: CompareOp, actual: i64, expected: i64) -> bool {
    match op {
        CompareOp::Gte => actual >= expected,
        CompareOp::Lte => actual <= expected,
        CompareOp::Gt => actual > expected,
        CompareOp::Lt => actual < expected,
        CompareOp::Eq => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parser::parse;

    fn employee() -> DataRecord {
        [
            ("age", AttrValue::Int(35)),
            ("department", "Sales".into()),
            ("salary", AttrValue::Int(60000)),
            ("experience", AttrValue::Int(3)),
        ]
        .into_iter()
        .collect()
    }

    fn record_with(pairs: Vec<(&str, AttrValue)>) -> DataRecord {
        pairs.into_iter().collect()
    }

    #[test]
    fn test_greater_than() {
        let rule = parse("age > 30");
        assert!(evaluate(&rule, &record_with(vec![("age", AttrValue::Int(35))])));
        assert!(!evaluate(&rule, &record_with(vec![("age", AttrValue::Int(20))])));
    }

    #[test]
    fn test_inclusive_operators() {
        let record = employee();
        assert!(evaluate(&parse("age >= 35"), &record));
        assert!(!evaluate(&parse("age <= 34"), &record));
        assert!(evaluate(&parse("age <= 35"), &record));
        assert!(!evaluate(&parse("age >= 36"), &record));
    }

    #[test]
    fn test_less_than() {
        let record = employee();
        assert!(evaluate(&parse("experience < 5"), &record));
        assert!(!evaluate(&parse("experience < 3"), &record));
    }

    #[test]
    fn test_negative_literal() {
        let record = record_with(vec![("balance", AttrValue::Int(-5))]);
        assert!(evaluate(&parse("balance < -1"), &record));
        assert!(evaluate(&parse("balance >= -5"), &record));
    }

    #[test]
    fn test_string_equality() {
        let record = employee();
        assert!(evaluate(&parse("department == \"Sales\""), &record));
        assert!(evaluate(&parse("department == 'Sales'"), &record));
        assert!(evaluate(&parse("department == Sales"), &record));
        assert!(!evaluate(&parse("department == \"Marketing\""), &record));
    }

    #[test]
    fn test_equality_has_no_numeric_coercion() {
        let record = employee();
        assert!(!evaluate(&parse("age == 35"), &record));
        assert!(!evaluate(&parse("age == \"35\""), &record));
    }

    #[test]
    fn test_and_or_combination() {
        let record = employee();
        assert!(evaluate(&parse("age > 30 AND salary > 50000"), &record));
        assert!(!evaluate(&parse("age > 30 AND salary > 70000"), &record));
        assert!(evaluate(&parse("age > 40 OR department == \"Sales\""), &record));
        assert!(!evaluate(&parse("age > 40 OR department == \"HR\""), &record));
    }

    #[test]
    fn test_two_term_rule_matches_halves() {
        let records = vec![
            employee(),
            record_with(vec![("age", AttrValue::Int(20)), ("salary", AttrValue::Int(90000))]),
            record_with(vec![("age", AttrValue::Int(50))]),
            DataRecord::new(),
        ];
        let (left, right) = ("age > 30", "salary > 50000");
        for record in &records {
            let l = evaluate(&parse(left), record);
            let r = evaluate(&parse(right), record);
            assert_eq!(
                evaluate(&parse(&format!("{} AND {}", left, right)), record),
                l && r
            );
            assert_eq!(
                evaluate(&parse(&format!("{} OR {}", left, right)), record),
                l || r
            );
        }
    }

    #[test]
    fn test_malformed_condition_is_false() {
        let record = employee();
        assert!(!evaluate(&parse("age is old"), &record));
        assert!(matches!(
            check_condition("age is old", &record),
            Err(RuleError::MalformedCondition(_))
        ));
        assert!(!evaluate(&Node::condition(""), &record));
    }

    #[test]
    fn test_missing_attribute_is_false() {
        let record = employee();
        assert!(!evaluate(&parse("height > 100"), &record));
        assert!(!evaluate(&parse("height < 100"), &record));
        assert!(!evaluate(&parse("city == \"Paris\""), &record));
        assert!(matches!(
            check_condition("height > 100", &record),
            Err(RuleError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_numeric_operator_on_string_attribute() {
        let record = employee();
        assert!(!evaluate(&parse("department > 3"), &record));
        assert!(matches!(
            check_condition("department > 3", &record),
            Err(RuleError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_non_integer_literal() {
        let record = employee();
        assert!(!evaluate(&parse("age > thirty"), &record));
        assert!(matches!(
            check_condition("age > 30.5", &record),
            Err(RuleError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn test_extra_connective_degrades_right_condition() {
        // Right condition is "salary > 50000 AND experience > 1", whose literal
        // is not an integer.
        let rule = parse("age > 30 AND salary > 50000 AND experience > 1");
        assert!(!evaluate(&rule, &employee()));
    }

    #[test]
    fn test_operator_priority() {
        // ">=" is detected before ">" so the literal parses cleanly.
        assert!(check_condition("age >= 35", &employee()).unwrap());
        // ">" is detected before "==", splitting the text at ">".
        assert!(matches!(
            check_condition("department == <none>", &employee()),
            Err(RuleError::InvalidLiteral(_))
        ));
    }

    #[test]
    fn test_evaluate_is_repeatable() {
        let rule = parse("age > 30 AND department == \"Sales\"");
        let record = employee();
        let first = evaluate(&rule, &record);
        let second = evaluate(&rule, &record);
        assert_eq!(first, second);
        assert_eq!(rule, parse("age > 30 AND department == \"Sales\""));
    }
}
