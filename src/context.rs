use serde::Serialize;
use uuid::Uuid;

use crate::policy::{PolicyEnforcer, PolicyError, Target};

/// Caller identity attached to every authenticated request
#[derive(Clone, Debug, Serialize)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub roles: Vec<String>,
    pub is_admin: bool,
    #[serde(skip)]
    pub auth_token: Option<String>,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(user_id: Option<String>, project_id: Option<String>, roles: Vec<String>) -> Self {
        let is_admin = roles.iter().any(|r| r.eq_ignore_ascii_case("admin"));
        Self {
            user_id,
            project_id,
            roles,
            is_admin,
            auth_token: None,
            request_id: new_request_id(),
        }
    }

    /// Context scoped to a single project with no user, roles or token
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self::new(None, Some(project_id.into()), Vec::new())
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Authorize `action` against the caller's own project and user
    pub fn can(&self, enforcer: &PolicyEnforcer, action: &str) -> Result<(), PolicyError> {
        let target = Target::from_context(self);
        self.can_with_target(enforcer, action, &target)
    }

    pub fn can_with_target(
        &self,
        enforcer: &PolicyEnforcer,
        action: &str,
        target: &Target,
    ) -> Result<(), PolicyError> {
        enforcer.authorize(action, target, self)
    }
}

fn new_request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}
