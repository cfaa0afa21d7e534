use crate::error::PolicyError;
use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON policy file, see `InclusionPolicy::from_env`.
pub const POLICY_ENV: &str = "OUTBACK_POLICY";

/// Description of the type the outcome capability is being attached to.
///
/// `categories` lists every category the target belongs to, most specific
/// first, e.g. `["appointment_calendar", "service", "domain"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl TargetDescriptor {
    pub fn new<N>(name: N) -> Self
    where
        N: ToString,
    {
        Self {
            name: name.to_string(),
            categories: vec![],
        }
    }

    /// Adds single category. Call multiple times for multiple categories.
    pub fn category<C>(mut self, category: C) -> Self
    where
        C: ToString,
    {
        self.categories.push(category.to_string());
        self
    }

    /// Name followed by categories, the set every policy entry is matched against.
    fn lineage(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.categories.iter().map(String::as_str))
    }
}

/// Restricts which targets may hold the outcome capability.
///
/// A target is rejected if its name or any of its categories is in `deny`.
/// When `allow` is non-empty, a target is accepted only if its name or one
/// of its categories is listed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionPolicy {
    pub deny: Vec<String>,
    pub allow: Vec<String>,
}

/// Persistence models and request controllers should stay thin, business
/// logic goes into plain domain objects.
pub const DEFAULT_DENY: [&str; 2] = ["model", "controller"];

impl Default for InclusionPolicy {
    fn default() -> Self {
        Self {
            deny: DEFAULT_DENY.iter().map(|c| c.to_string()).collect(),
            allow: vec![],
        }
    }
}

impl InclusionPolicy {
    /// Policy that accepts every target.
    pub fn permissive() -> Self {
        Self {
            deny: vec![],
            allow: vec![],
        }
    }

    pub fn deny<C: ToString>(mut self, category: C) -> Self {
        self.deny.push(category.to_string());
        self
    }

    pub fn allow<C: ToString>(mut self, category: C) -> Self {
        self.allow.push(category.to_string());
        self
    }

    pub fn is_permitted(&self, target: &TargetDescriptor) -> bool {
        self.check(target).is_ok()
    }

    /// Evaluates the policy against `target`, describing why it was rejected.
    pub fn check(&self, target: &TargetDescriptor) -> Result<(), PolicyError> {
        if !self.allow.is_empty() && !target.lineage().any(|c| self.allow.iter().any(|a| a == c)) {
            return Err(PolicyError::NotAllowed {
                target: target.name.clone(),
                allowed: self.allow.clone(),
            });
        }

        if let Some(category) = target.lineage().find(|c| self.deny.iter().any(|d| d == c)) {
            return Err(PolicyError::Denied {
                target: target.name.clone(),
                category: category.to_string(),
            });
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("could not parse inclusion policy")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("could not read inclusion policy from {}", path.display()))?;

        Self::from_json_str(&json)
    }

    /// Loads policy from the file named by `OUTBACK_POLICY`, defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_env_var(POLICY_ENV)
    }

    fn from_env_var(name: &str) -> anyhow::Result<Self> {
        match std::env::var_os(name) {
            Some(path) => {
                debug!("InclusionPolicy::from_env - {}: {:?}", name, path);
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }
}
