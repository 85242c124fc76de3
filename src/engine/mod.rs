// SPDX-License-Identifier: MIT

//! Rule engine core
//!
//! Rules are simple comparison expressions over a flat data record:
//! - `age > 30`
//! - `department == "Sales"`
//! - `age > 30 AND salary > 50000`
//!
//! The three entry points below are what the registry, server and CLI call.
//! All of them are synchronous and pure; storing the resulting trees is the
//! caller's concern.

pub mod ast;
pub mod combinator;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod record;

pub use ast::{BoolOp, Node};
pub use combinator::{combine, RuleLookup, MAX_TREE_DEPTH};
pub use error::{Result, RuleError};
pub use evaluator::{check_condition, evaluate};
pub use parser::parse;
pub use record::{AttrValue, DataRecord};

/// Parse a rule for storage under `name`.
pub fn create_rule(name: &str, rule_text: &str) -> Result<Node> {
    if name.trim().is_empty() || rule_text.trim().is_empty() {
        return Err(RuleError::invalid_input(
            "rule name and rule text cannot be empty",
        ));
    }
    Ok(parse(rule_text))
}

/// Combine registered rules. `operator` must be exactly `AND` or `OR`.
pub fn combine_rules<R: RuleLookup + ?Sized>(
    names: &[String],
    operator: &str,
    rules: &R,
) -> Result<Node> {
    let operator: BoolOp = operator.parse()?;
    combine(names, operator, rules)
}

/// Evaluate the rule registered under `name` against `record`.
pub fn evaluate_rule<R: RuleLookup + ?Sized>(
    name: &str,
    record: &DataRecord,
    rules: &R,
) -> Result<bool> {
    let tree = rules
        .lookup(name)
        .ok_or_else(|| RuleError::rule_not_found(name))?;
    Ok(evaluate(tree, record))
}
