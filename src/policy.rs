use std::sync::Arc;

use crate::config::{AccessPolicyKind, AppConfig};

/// AccessDenied
///
/// Returned by an `AccessPolicy` when the requesting user may not see the
/// moderation panel. `reason` becomes the `message` of the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct AccessDenied {
    pub reason: String,
}

/// AccessPolicy
///
/// The authorization predicate applied to the requesting user's role labels.
/// Kept behind a trait so the policy can change without touching the pipeline.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, roles: &[String]) -> Result<(), AccessDenied>;
}

/// PolicyState
///
/// The shareable form held by the application state.
pub type PolicyState = Arc<dyn AccessPolicy>;

/// BaselineRoleDenied
///
/// Inclusion-based check: holding the baseline role is disqualifying on its own,
/// even when elevated roles are also present.
#[derive(Debug, Clone)]
pub struct BaselineRoleDenied {
    pub baseline_role: String,
}

impl AccessPolicy for BaselineRoleDenied {
    fn authorize(&self, roles: &[String]) -> Result<(), AccessDenied> {
        if roles.iter().any(|role| *role == self.baseline_role) {
            return Err(AccessDenied {
                reason: format!("User role == [\"{}\"]", self.baseline_role),
            });
        }
        Ok(())
    }
}

/// ElevatedRoleRequired
///
/// Admits a user only when at least one of their roles is in `elevated_roles`.
#[derive(Debug, Clone)]
pub struct ElevatedRoleRequired {
    pub elevated_roles: Vec<String>,
}

impl AccessPolicy for ElevatedRoleRequired {
    fn authorize(&self, roles: &[String]) -> Result<(), AccessDenied> {
        if roles.iter().any(|role| self.elevated_roles.contains(role)) {
            Ok(())
        } else {
            Err(AccessDenied {
                reason: "User role lacks an elevated role".to_string(),
            })
        }
    }
}

/// Builds the policy selected by the configuration.
pub fn from_config(config: &AppConfig) -> PolicyState {
    match config.access_policy {
        AccessPolicyKind::BaselineDenied => Arc::new(BaselineRoleDenied {
            baseline_role: config.baseline_role.clone(),
        }),
        AccessPolicyKind::ElevatedRequired => Arc::new(ElevatedRoleRequired {
            elevated_roles: config.elevated_roles.clone(),
        }),
    }
}
