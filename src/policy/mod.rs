pub mod rules;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

use crate::context::RequestContext;
pub use rules::Check;

/// List and show tenant networks
pub const TENANT_NETWORKS: &str = "os_compute_api:os-tenant-networks";

pub const CONTEXT_IS_ADMIN: &str = "context_is_admin";
pub const ADMIN_OR_OWNER: &str = "admin_or_owner";

/// Built-in rules; a policy file may override any of them
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    (CONTEXT_IS_ADMIN, "role:admin"),
    (ADMIN_OR_OWNER, "is_admin:True or project_id:%(project_id)s"),
    (TENANT_NETWORKS, "rule:admin_or_owner"),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Policy doesn't allow {0} to be performed.")]
    NotAuthorized(String),

    #[error("Invalid policy rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Failed to load policy file: {0}")]
    Load(String),
}

/// Attributes of the object an action is performed on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target(BTreeMap<String, String>);

impl Target {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default target: the caller's own project and user
    pub fn from_context(ctx: &RequestContext) -> Self {
        let mut target = Self::new();
        if let Some(project_id) = &ctx.project_id {
            target = target.with("project_id", project_id.clone());
        }
        if let Some(user_id) = &ctx.user_id {
            target = target.with("user_id", user_id.clone());
        }
        target
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct PolicyEnforcer {
    rules: HashMap<String, Check>,
}

impl PolicyEnforcer {
    /// Enforcer holding only the built-in rules
    pub fn with_defaults() -> Result<Self, PolicyError> {
        let mut enforcer = Self { rules: HashMap::new() };
        for (name, rule) in DEFAULT_RULES {
            enforcer.set_rule(name, rule)?;
        }
        Ok(enforcer)
    }

    /// Defaults overlaid with a YAML file of `name: "check string"` entries
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PolicyError::Load(format!("{}: {}", path.display(), e)))?;
        let mut enforcer = Self::with_defaults()?;
        enforcer.load_overrides(&raw)?;
        tracing::info!("Loaded policy overrides from {}", path.display());
        Ok(enforcer)
    }

    pub fn load_overrides(&mut self, yaml: &str) -> Result<(), PolicyError> {
        let overrides: Option<BTreeMap<String, String>> =
            serde_yaml::from_str(yaml).map_err(|e| PolicyError::Load(e.to_string()))?;
        for (name, rule) in overrides.unwrap_or_default() {
            self.set_rule(&name, &rule)?;
        }
        Ok(())
    }

    pub fn set_rule(&mut self, name: &str, rule: &str) -> Result<(), PolicyError> {
        let check = rules::parse(rule).map_err(|reason| PolicyError::InvalidRule {
            name: name.to_string(),
            reason,
        })?;
        self.rules.insert(name.to_string(), check);
        Ok(())
    }

    /// Evaluate `action`; unknown actions are denied
    pub fn authorize(
        &self,
        action: &str,
        target: &Target,
        ctx: &RequestContext,
    ) -> Result<(), PolicyError> {
        let allowed = match self.rules.get(action) {
            Some(check) => check.evaluate(&self.rules, target, ctx),
            None => {
                tracing::warn!("No policy rule registered for {}", action);
                false
            }
        };

        if allowed {
            Ok(())
        } else {
            tracing::warn!(
                request_id = %ctx.request_id,
                project_id = ?ctx.project_id,
                user_id = ?ctx.user_id,
                "Policy check for {} failed",
                action
            );
            Err(PolicyError::NotAuthorized(action.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(project: Option<&str>, roles: &[&str]) -> RequestContext {
        RequestContext::new(
            Some("alice".into()),
            project.map(str::to_string),
            roles.iter().map(|r| r.to_string()).collect(),
        )
    }

    #[test]
    fn default_rules_parse() {
        for (name, rule) in DEFAULT_RULES {
            assert!(rules::parse(rule).is_ok(), "default rule {name} does not parse");
        }
    }

    #[test]
    fn default_admin_or_owner_rule_checks_project() {
        let enforcer = PolicyEnforcer::with_defaults().unwrap();
        let member = ctx(Some("p1"), &["member"]);
        let own = Target::from_context(&member);
        let foreign = Target::new().with("project_id", "p2");
        assert!(member.can_with_target(&enforcer, ADMIN_OR_OWNER, &own).is_ok());
        assert!(member.can_with_target(&enforcer, ADMIN_OR_OWNER, &foreign).is_err());
    }

    #[test]
    fn project_member_may_list_tenant_networks() {
        let enforcer = PolicyEnforcer::with_defaults().unwrap();
        assert!(ctx(Some("p1"), &["member"]).can(&enforcer, TENANT_NETWORKS).is_ok());
    }

    #[test]
    fn unscoped_caller_is_denied() {
        let enforcer = PolicyEnforcer::with_defaults().unwrap();
        let err = ctx(None, &["member"]).can(&enforcer, TENANT_NETWORKS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Policy doesn't allow os_compute_api:os-tenant-networks to be performed."
        );
    }

    #[test]
    fn admin_passes_for_foreign_target() {
        let enforcer = PolicyEnforcer::with_defaults().unwrap();
        let admin = ctx(Some("ops"), &["admin"]);
        let target = Target::new().with("project_id", "someone-else");
        assert!(admin.can_with_target(&enforcer, TENANT_NETWORKS, &target).is_ok());
    }

    #[test]
    fn unknown_action_is_denied() {
        let enforcer = PolicyEnforcer::with_defaults().unwrap();
        assert!(ctx(Some("p1"), &["admin"]).can(&enforcer, "os_compute_api:unknown").is_err());
    }

    #[test]
    fn yaml_overrides_replace_defaults() {
        let mut enforcer = PolicyEnforcer::with_defaults().unwrap();
        enforcer
            .load_overrides("\"os_compute_api:os-tenant-networks\": \"role:admin\"\n")
            .unwrap();
        assert!(ctx(Some("p1"), &["member"]).can(&enforcer, TENANT_NETWORKS).is_err());
        assert!(ctx(Some("p1"), &["admin"]).can(&enforcer, TENANT_NETWORKS).is_ok());
    }

    #[test]
    fn invalid_override_is_reported() {
        let mut enforcer = PolicyEnforcer::with_defaults().unwrap();
        let err = enforcer.load_overrides("broken: \"role:admin or\"\n").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidRule { ref name, .. } if name == "broken"));
    }

    #[test]
    fn empty_override_file_keeps_defaults() {
        let mut enforcer = PolicyEnforcer::with_defaults().unwrap();
        enforcer.load_overrides("").unwrap();
        assert!(ctx(Some("p1"), &["member"]).can(&enforcer, TENANT_NETWORKS).is_ok());
    }
}
