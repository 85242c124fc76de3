// SPDX-License-Identifier: MIT

//! Merging registered rules into one tree
//!
//! Rules are chained left to right into a right-leaning list of operator
//! nodes. Each chain step attaches the named rule as the right child of the
//! current node, then immediately replaces it with a fresh operator node
//! unless the name is the last one. The resulting shape for `[a, b, c]` is:
//!
//! ```text
//!   OP
//!  /  \
//! a    OP
//!     /  \
//!   ""    c
//! ```
//!
//! Interior rules are looked up but do not survive, and interior operator
//! nodes never receive a left child. That slot holds an empty condition,
//! which always evaluates to `false`.
//!
//! Each name adds one level of nesting. Results deeper than
//! [`MAX_TREE_DEPTH`] are rejected so that every stored tree stays within
//! the nesting limit of the JSON and YAML rule file readers (128).

use std::collections::HashMap;
use std::sync::Arc;

use super::ast::{BoolOp, Node};
use super::error::{Result, RuleError};

/// Deepest tree `combine` will produce. With single-condition rules this
/// allows chains of up to 64 names.
pub const MAX_TREE_DEPTH: usize = 64;

/// Read access to named rule trees
pub trait RuleLookup {
    fn lookup(&self, name: &str) -> Option<&Node>;
}

impl RuleLookup for HashMap<String, Node> {
    fn lookup(&self, name: &str) -> Option<&Node> {
        self.get(name)
    }
}

impl RuleLookup for HashMap<String, Arc<Node>> {
    fn lookup(&self, name: &str) -> Option<&Node> {
        self.get(name).map(Arc::as_ref)
    }
}

/// Operator node under construction
struct PendingOp {
    left: Option<Node>,
    right: Option<Node>,
}

impl PendingOp {
    fn new() -> Self {
        Self {
            left: None,
            right: None,
        }
    }
}

/// Combine named rules with a single operator.
///
/// Fails with `RuleNotFound` on the first name absent from `rules`, and with
/// `InvalidInput` when fewer than two names are given or the result would be
/// deeper than [`MAX_TREE_DEPTH`].
pub fn combine<R: RuleLookup + ?Sized>(names: &[String], operator: BoolOp, rules: &R) -> Result<Node> {
    if names.len() < 2 {
        return Err(RuleError::invalid_input(
            "at least two rules are required to combine",
        ));
    }

    let mut chain = vec![PendingOp::new()];
    for (i, name) in names.iter().enumerate() {
        let tree = rules
            .lookup(name)
            .cloned()
            .ok_or_else(|| RuleError::rule_not_found(name.as_str()))?;

        let current = chain.len() - 1;
        if i == 0 {
            chain[current].left = Some(tree);
        } else {
            chain[current].right = Some(tree);
            if i < names.len() - 1 {
                // Overwrites the rule just attached; the new node becomes current.
                chain[current].right = None;
                chain.push(PendingOp::new());
            }
        }
    }

    let combined = assemble(chain, operator);
    if combined.depth() > MAX_TREE_DEPTH {
        return Err(RuleError::invalid_input(format!(
            "combined rule would nest {} levels deep, limit is {}",
            combined.depth(),
            MAX_TREE_DEPTH
        )));
    }
    Ok(combined)
}

/// Fold the chain back to front, linking each node's right child to the next.
fn assemble(chain: Vec<PendingOp>, operator: BoolOp) -> Node {
    let mut next: Option<Node> = None;
    for pending in chain.into_iter().rev() {
        let right = next.take().or(pending.right).unwrap_or_else(vacant);
        let left = pending.left.unwrap_or_else(vacant);
        next = Some(Node::binary(operator, left, right));
    }
    next.unwrap_or_else(vacant)
}

fn vacant() -> Node {
    Node::condition("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluator::evaluate;
    use crate::engine::parser::parse;
    use crate::engine::record::{AttrValue, DataRecord};

    fn registry(rules: &[(&str, &str)]) -> HashMap<String, Node> {
        rules
            .iter()
            .map(|(name, text)| (name.to_string(), parse(text)))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_combine_two_rules() {
        let rules = registry(&[("r1", "age > 30"), ("r2", "salary > 50000")]);
        let combined = combine(&names(&["r1", "r2"]), BoolOp::And, &rules).unwrap();
        assert_eq!(
            combined,
            Node::binary(
                BoolOp::And,
                Node::condition("age > 30"),
                Node::condition("salary > 50000"),
            )
        );
    }

    #[test]
    fn test_combine_keeps_subtrees() {
        let rules = registry(&[("r1", "age > 30 AND salary > 50000"), ("r2", "experience > 5")]);
        let combined = combine(&names(&["r1", "r2"]), BoolOp::Or, &rules).unwrap();
        assert_eq!(
            combined,
            Node::binary(BoolOp::Or, rules["r1"].clone(), rules["r2"].clone())
        );
    }

    #[test]
    fn test_combine_three_drops_interior_rule() {
        let rules = registry(&[
            ("r1", "age > 30"),
            ("r2", "department == \"Sales\""),
            ("r3", "salary > 50000"),
        ]);
        let combined = combine(&names(&["r1", "r2", "r3"]), BoolOp::And, &rules).unwrap();

        assert_eq!(
            combined,
            Node::binary(
                BoolOp::And,
                Node::condition("age > 30"),
                Node::binary(BoolOp::And, Node::condition(""), Node::condition("salary > 50000")),
            )
        );
        let leaves = combined.conditions();
        assert!(!leaves.contains(&"department == \"Sales\""));
        assert!(leaves.contains(&"age > 30"));
        assert!(leaves.contains(&"salary > 50000"));
    }

    #[test]
    fn test_combine_four_builds_chain() {
        let rules = registry(&[("a", "a > 1"), ("b", "b > 1"), ("c", "c > 1"), ("d", "d > 1")]);
        let combined = combine(&names(&["a", "b", "c", "d"]), BoolOp::Or, &rules).unwrap();
        assert_eq!(
            combined,
            Node::binary(
                BoolOp::Or,
                Node::condition("a > 1"),
                Node::binary(
                    BoolOp::Or,
                    Node::condition(""),
                    Node::binary(BoolOp::Or, Node::condition(""), Node::condition("d > 1")),
                ),
            )
        );
    }

    #[test]
    fn test_combined_chain_evaluation() {
        let rules = registry(&[("r1", "age > 30"), ("r2", "age > 0"), ("r3", "age < 100")]);
        let record: DataRecord = [("age", AttrValue::Int(35))].into_iter().collect();

        // the vacant left slot is false, so an AND chain of three never holds
        let and = combine(&names(&["r1", "r2", "r3"]), BoolOp::And, &rules).unwrap();
        assert!(!evaluate(&and, &record));

        let or = combine(&names(&["r1", "r2", "r3"]), BoolOp::Or, &rules).unwrap();
        assert!(evaluate(&or, &record));
    }

    #[test]
    fn test_combine_missing_rule() {
        let rules = registry(&[("r1", "age > 30")]);
        let result = combine(&names(&["r1", "ghost"]), BoolOp::And, &rules);
        match result {
            Err(RuleError::RuleNotFound { name }) => assert_eq!(name, "ghost"),
            other => panic!("Expected RuleNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_combine_requires_two_names() {
        let rules = registry(&[("r1", "age > 30")]);
        assert!(matches!(
            combine(&names(&["r1"]), BoolOp::And, &rules),
            Err(RuleError::InvalidInput(_))
        ));
        assert!(matches!(
            combine(&[], BoolOp::Or, &rules),
            Err(RuleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_combine_depth_limit() {
        let rules: HashMap<String, Node> = (0..MAX_TREE_DEPTH + 1)
            .map(|i| (format!("r{}", i), parse(&format!("age > {}", i))))
            .collect();
        let mut all: Vec<String> = (0..MAX_TREE_DEPTH + 1).map(|i| format!("r{}", i)).collect();

        assert!(matches!(
            combine(&all, BoolOp::Or, &rules),
            Err(RuleError::InvalidInput(_))
        ));

        all.pop();
        let combined = combine(&all, BoolOp::Or, &rules).unwrap();
        assert_eq!(combined.depth(), MAX_TREE_DEPTH);
    }

    #[test]
    fn test_combine_depth_limit_counts_nested_combines() {
        let mut rules: HashMap<String, Node> = (0..40)
            .map(|i| (format!("r{}", i), parse(&format!("age > {}", i))))
            .collect();
        let chain: Vec<String> = (0..40).map(|i| format!("r{}", i)).collect();
        let deep = combine(&chain, BoolOp::And, &rules).unwrap();
        assert_eq!(deep.depth(), 40);
        rules.insert("deep".to_string(), deep);

        let mut outer: Vec<String> = (0..30).map(|i| format!("r{}", i)).collect();
        outer.push("deep".to_string());
        assert!(matches!(
            combine(&outer, BoolOp::And, &rules),
            Err(RuleError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_combine_with_arc_registry() {
        let rules: HashMap<String, Arc<Node>> = [
            ("r1".to_string(), Arc::new(parse("age > 30"))),
            ("r2".to_string(), Arc::new(parse("age < 60"))),
        ]
        .into_iter()
        .collect();
        let combined = combine(&names(&["r1", "r2"]), BoolOp::And, &rules).unwrap();
        assert_eq!(combined.to_string(), "age > 30 AND age < 60");
    }
}
