//! Rule file persistence
//!
//! Rules are stored as a name to tree mapping. The file format follows the
//! extension: `.yaml`/`.yml` files use YAML, everything else JSON.

use crate::engine::{Node, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::registry::RuleRegistry;

pub type RuleSet = BTreeMap<String, Node>;

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Load rules from a file. A missing file yields an empty set.
pub fn load_rules<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let path = path.as_ref();
    if !path.exists() {
        log::info!("Rule file {:?} not found, starting empty", path);
        return Ok(RuleSet::new());
    }
    let content = fs::read_to_string(path)?;
    let rules = if is_yaml(path) {
        parse_yaml(&content)?
    } else {
        parse_json(&content)?
    };
    log::info!("Loaded {} rules from {:?}", rules.len(), path);
    Ok(rules)
}

/// Write rules to a file, replacing its contents
pub fn save_rules<P: AsRef<Path>>(path: P, rules: &RuleSet) -> Result<()> {
    let path = path.as_ref();
    let content = if is_yaml(path) {
        serde_yaml::to_string(rules)?
    } else {
        serde_json::to_string_pretty(rules)?
    };
    fs::write(path, content)?;
    log::info!("Saved {} rules to {:?}", rules.len(), path);
    Ok(())
}

pub fn parse_json(content: &str) -> Result<RuleSet> {
    // An empty file is treated like a missing one.
    if content.trim().is_empty() {
        return Ok(RuleSet::new());
    }
    Ok(serde_json::from_str(content)?)
}

pub fn parse_yaml(content: &str) -> Result<RuleSet> {
    if content.trim().is_empty() {
        return Ok(RuleSet::new());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Load a rule file into `registry`
pub async fn load_into<P: AsRef<Path>>(path: P, registry: &RuleRegistry) -> Result<usize> {
    let rules = load_rules(path)?;
    let count = rules.len();
    registry.extend(rules).await;
    Ok(count)
}

/// Save the contents of `registry` to a rule file
pub async fn save_from<P: AsRef<Path>>(path: P, registry: &RuleRegistry) -> Result<()> {
    let snapshot = registry.snapshot().await;
    save_rules(path, &snapshot)
}
