#[cfg(test)]
mod tests;

use crate::services::base::status::Status;
use std::fmt::{Display, Formatter};

const DEFAULT_ORG_NAMESPACE: &str = "default";
const ORG_NAMESPACE_PREFIX: &str = "org-";
const STACK_NAMESPACE_PREFIX: &str = "stacks-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenantKind {
    Org,
    Stack,
}

/// A tenant reference supplied by the caller. Never persisted, only used to resolve a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tenant {
    pub id: i64,
    pub kind: TenantKind,
}

impl Tenant {
    pub fn org(id: i64) -> Self {
        Tenant {
            id,
            kind: TenantKind::Org,
        }
    }

    pub fn stack(id: i64) -> Self {
        Tenant {
            id,
            kind: TenantKind::Stack,
        }
    }

    pub fn is_org(&self) -> bool {
        self.kind == TenantKind::Org
    }

    pub fn namespace(&self) -> String {
        namespace_for(self.id, self.is_org())
    }

    /// Picks the tenant from the configured IDs. The org ID defaults to 1 on local
    /// instances, so a positive stack ID must win over it.
    pub fn from_ids(org_id: Option<i64>, stack_id: Option<i64>) -> Result<Self, Status> {
        match (org_id.unwrap_or_default(), stack_id.unwrap_or_default()) {
            (_, stack_id) if stack_id > 0 => Ok(Tenant::stack(stack_id)),
            (org_id, _) if org_id > 0 => Ok(Tenant::org(org_id)),
            _ => Err(Status::NamespaceMissing),
        }
    }
}

impl Display for Tenant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TenantKind::Org => write!(f, "org {}", self.id),
            TenantKind::Stack => write!(f, "stack {}", self.id),
        }
    }
}

/// Resolves the namespace of a tenant. The format is persisted in resource references
/// and must not change: org 1 is `default`, other orgs are `org-<id>`, stacks are `stacks-<id>`.
pub fn namespace_for(tenant_id: i64, is_org: bool) -> String {
    if !is_org {
        return format!("{}{}", STACK_NAMESPACE_PREFIX, tenant_id);
    }
    if tenant_id == 1 {
        DEFAULT_ORG_NAMESPACE.to_string()
    } else {
        format!("{}{}", ORG_NAMESPACE_PREFIX, tenant_id)
    }
}

/// Inverse of [`namespace_for`].
pub fn parse_namespace(namespace: &str) -> Option<Tenant> {
    if namespace == DEFAULT_ORG_NAMESPACE {
        return Some(Tenant::org(1));
    }
    if let Some(id) = namespace.strip_prefix(STACK_NAMESPACE_PREFIX) {
        return id.parse().ok().map(Tenant::stack);
    }
    namespace
        .strip_prefix(ORG_NAMESPACE_PREFIX)
        .and_then(|id| id.parse().ok())
        .filter(|id| *id != 1)
        .map(Tenant::org)
}
