//! Rule string parser
//!
//! Only one connective is recognized per rule. `AND` is searched first, then
//! `OR`, and the string is split at the first match:
//! - `age > 30` becomes a single condition
//! - `age > 30 AND salary > 50000` becomes `AND(age > 30, salary > 50000)`
//!
//! Anything after the first connective, including further `AND`/`OR` tokens,
//! stays in the right-hand condition text. Rules needing more terms are built
//! with the combinator instead.

use super::ast::{BoolOp, Node};

const CONNECTIVES: [(&str, BoolOp); 2] = [("AND", BoolOp::And), ("OR", BoolOp::Or)];

/// Parse a rule string into an expression tree. Never fails; malformed
/// conditions are reported at evaluation time.
pub fn parse(input: &str) -> Node {
    for (keyword, op) in CONNECTIVES {
        if let Some((left, right)) = input.split_once(keyword) {
            return Node::binary(op, Node::condition(left.trim()), Node::condition(right.trim()));
        }
    }

    Node::condition(input.trim())
}
