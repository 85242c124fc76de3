// SPDX-License-Identifier: MIT

use crate::engine::{self, DataRecord, Node, Result, RuleError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared name to tree store.
///
/// Mutations take the write lock. Trees are handed out as `Arc<Node>` so
/// evaluation runs outside the lock.
#[derive(Clone)]
pub struct RuleRegistry {
    rules: Arc<RwLock<HashMap<String, Arc<Node>>>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or overwrite a tree
    pub async fn insert(&self, name: impl Into<String>, tree: Node) {
        let mut rules = self.rules.write().await;
        rules.insert(name.into(), Arc::new(tree));
    }

    pub async fn get(&self, name: &str) -> Option<Arc<Node>> {
        let rules = self.rules.read().await;
        rules.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.rules.read().await.contains_key(name)
    }

    pub async fn remove(&self, name: &str) -> Option<Arc<Node>> {
        let mut rules = self.rules.write().await;
        rules.remove(name)
    }

    pub async fn clear(&self) {
        self.rules.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }

    /// Rule names in sorted order
    pub async fn names(&self) -> Vec<String> {
        let rules = self.rules.read().await;
        let mut names: Vec<String> = rules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Sorted copy of all trees, used for persistence and listings
    pub async fn snapshot(&self) -> BTreeMap<String, Node> {
        let rules = self.rules.read().await;
        rules
            .iter()
            .map(|(name, tree)| (name.clone(), tree.as_ref().clone()))
            .collect()
    }

    pub async fn extend(&self, trees: impl IntoIterator<Item = (String, Node)>) {
        let mut rules = self.rules.write().await;
        for (name, tree) in trees {
            rules.insert(name, Arc::new(tree));
        }
    }

    /// Parse `rule_text` and store it under `name`
    pub async fn create_rule(&self, name: &str, rule_text: &str) -> Result<Arc<Node>> {
        let tree = Arc::new(engine::create_rule(name, rule_text)?);
        self.rules
            .write()
            .await
            .insert(name.to_string(), tree.clone());
        log::info!("Rule '{}' created: {}", name, tree);
        Ok(tree)
    }

    /// Combine existing rules and store the result under `name`.
    ///
    /// The write lock is held from lookup to insert.
    pub async fn combine_rules(
        &self,
        name: &str,
        rule_names: &[String],
        operator: &str,
    ) -> Result<Arc<Node>> {
        if name.trim().is_empty() {
            return Err(RuleError::invalid_input("combined rule name cannot be empty"));
        }
        let mut rules = self.rules.write().await;
        let tree = Arc::new(engine::combine_rules(rule_names, operator, &*rules)?);
        rules.insert(name.to_string(), tree.clone());
        log::info!(
            "Combined rule '{}' created from {:?} with {}",
            name,
            rule_names,
            operator
        );
        Ok(tree)
    }

    pub async fn evaluate_rule(&self, name: &str, record: &DataRecord) -> Result<bool> {
        let tree = self
            .get(name)
            .await
            .ok_or_else(|| RuleError::rule_not_found(name))?;
        Ok(engine::evaluate(&tree, record))
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
