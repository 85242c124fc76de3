// SPDX-License-Identifier: MIT

//! Expression tree for rules

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::RuleError;

/// A node of a rule expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Raw comparison text, e.g. `age > 30`
    Condition { text: String },
    /// Two subtrees joined by AND/OR
    BinaryOp {
        operator: BoolOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Node {
    pub fn condition(text: impl Into<String>) -> Self {
        Node::Condition { text: text.into() }
    }

    pub fn binary(operator: BoolOp, left: Node, right: Node) -> Self {
        Node::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Condition leaves in left-to-right order
    pub fn conditions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Condition { text } => out.push(text),
            Node::BinaryOp { left, right, .. } => {
                left.collect_conditions(out);
                right.collect_conditions(out);
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Condition { .. } => 1,
            Node::BinaryOp { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::And => write!(f, "AND"),
            BoolOp::Or => write!(f, "OR"),
        }
    }
}

// Case-sensitive: "and" is rejected.
impl FromStr for BoolOp {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(BoolOp::And),
            "OR" => Ok(BoolOp::Or),
            other => Err(RuleError::invalid_input(format!(
                "operator must be AND or OR, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Condition { text } => write!(f, "{}", text),
            Node::BinaryOp {
                operator,
                left,
                right,
            } => {
                write_operand(f, left)?;
                write!(f, " {} ", operator)?;
                write_operand(f, right)
            }
        }
    }
}

/// Nested operator nodes are parenthesized for readability only; the parser
/// does not accept parentheses.
fn write_operand(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    match node {
        Node::Condition { .. } => write!(f, "{}", node),
        Node::BinaryOp { .. } => write!(f, "({})", node),
    }
}
