// src/services/access.rs
//
// Translates a caller's identity into the set of agents and vendors their
// queries may touch. Admins see everything; managers see themselves plus
// their assigned subordinates; everyone else sees only themselves.

use std::collections::BTreeSet;

use crate::errors::{AppError, AppResult};
use crate::models::{Employee, EmployeeStatus};
use crate::repos::EmployeeRepo;

/// Legacy "any agent" marker. A requested id equal to this narrows nothing.
pub const ANY_AGENT_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeSet {
    All,
    Ids(BTreeSet<i64>),
}

impl ScopeSet {
    pub fn ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        ScopeSet::Ids(ids.into_iter().collect())
    }

    pub fn contains(&self, id: i64) -> bool {
        match self {
            ScopeSet::All => true,
            ScopeSet::Ids(ids) => ids.contains(&id),
        }
    }

    /// `None` means unrestricted — the repository layer skips the predicate.
    pub fn to_id_vec(&self) -> Option<Vec<i64>> {
        match self {
            ScopeSet::All => None,
            ScopeSet::Ids(ids) => Some(ids.iter().copied().collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    pub agents: ScopeSet,
    pub vendors: ScopeSet,
    pub is_admin: bool,
}

impl AccessScope {
    pub fn for_employee(employee: &Employee, subordinates: &[i64]) -> Self {
        if employee.is_admin {
            return AccessScope {
                agents: ScopeSet::All,
                vendors: ScopeSet::All,
                is_admin: true,
            };
        }

        let mut agents = BTreeSet::from([employee.id]);
        if employee.is_manager {
            agents.extend(subordinates.iter().copied());
        }

        AccessScope {
            agents: ScopeSet::Ids(agents),
            vendors: ScopeSet::All,
            is_admin: false,
        }
    }

    /// Narrows the agent side to an explicitly requested id set. Sentinel ids
    /// are dropped first; a request of only sentinels narrows nothing. Any
    /// requested id outside the caller's scope fails AccessDenied — requested
    /// ids are never silently dropped. Admins bypass the check.
    pub fn narrow_agents(&self, requested: &[i64]) -> AppResult<AccessScope> {
        let explicit: BTreeSet<i64> = requested
            .iter()
            .copied()
            .filter(|id| *id != ANY_AGENT_ID)
            .collect();

        if explicit.is_empty() {
            return Ok(self.clone());
        }

        if !self.is_admin {
            if let Some(outside) = explicit.iter().find(|id| !self.agents.contains(**id)) {
                return Err(AppError::AccessDenied(format!(
                    "Agent {} is outside your scope",
                    outside
                )));
            }
        }

        Ok(AccessScope {
            agents: ScopeSet::ids(explicit),
            vendors: self.vendors.clone(),
            is_admin: self.is_admin,
        })
    }

    pub fn narrow_vendors(&self, requested: &[i64]) -> AppResult<AccessScope> {
        if requested.is_empty() {
            return Ok(self.clone());
        }

        let explicit: BTreeSet<i64> = requested.iter().copied().collect();

        if !self.is_admin {
            if let Some(outside) = explicit.iter().find(|id| !self.vendors.contains(**id)) {
                return Err(AppError::AccessDenied(format!(
                    "Vendor {} is outside your scope",
                    outside
                )));
            }
        }

        Ok(AccessScope {
            agents: self.agents.clone(),
            vendors: ScopeSet::ids(explicit),
            is_admin: self.is_admin,
        })
    }

    pub fn ensure_agent(&self, agent_id: i64) -> AppResult<()> {
        if self.is_admin || self.agents.contains(agent_id) {
            Ok(())
        } else {
            Err(AppError::AccessDenied(format!(
                "Agent {} is outside your scope",
                agent_id
            )))
        }
    }

    pub fn ensure_vendor(&self, vendor_id: i64) -> AppResult<()> {
        if self.is_admin || self.vendors.contains(vendor_id) {
            Ok(())
        } else {
            Err(AppError::AccessDenied(format!(
                "Vendor {} is outside your scope",
                vendor_id
            )))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::AccessDenied(
                "Administrator capability required".to_string(),
            ))
        }
    }
}

pub struct AccessResolver<'a> {
    employees: &'a dyn EmployeeRepo,
}

impl<'a> AccessResolver<'a> {
    pub fn new(employees: &'a dyn EmployeeRepo) -> Self {
        Self { employees }
    }

    /// Pure apart from one read of the manager-employee mapping when the
    /// caller is a manager. Soft-deleted callers resolve to NotFound.
    pub async fn resolve(&self, caller_employee_id: i64) -> AppResult<AccessScope> {
        let employee = self
            .employees
            .find_by_id(caller_employee_id)
            .await?
            .filter(|e| e.status == EmployeeStatus::Active)
            .ok_or_else(|| {
                AppError::NotFound(format!("Employee {} not found", caller_employee_id))
            })?;

        let subordinates = if employee.is_manager && !employee.is_admin {
            self.employees.subordinate_ids(employee.id).await?
        } else {
            Vec::new()
        };

        Ok(AccessScope::for_employee(&employee, &subordinates))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::testing::*;

    #[test]
    fn plain_employee_sees_only_themselves() {
        let e = employee(4, "Dana");
        let scope = AccessScope::for_employee(&e, &[]);
        assert_eq!(scope.agents, ScopeSet::ids([4]));
        assert_eq!(scope.vendors, ScopeSet::All);
        assert!(!scope.is_admin);
    }

    #[test]
    fn manager_scope_includes_self_and_subordinates() {
        let m = manager(1, "Morgan");
        let scope = AccessScope::for_employee(&m, &[2, 3]);
        assert_eq!(scope.agents, ScopeSet::ids([1, 2, 3]));
        assert_eq!(scope.vendors, ScopeSet::All);
    }

    #[test]
    fn admin_scope_is_unrestricted() {
        let a = admin(9, "Avery");
        let scope = AccessScope::for_employee(&a, &[]);
        assert_eq!(scope.agents, ScopeSet::All);
        assert_eq!(scope.vendors, ScopeSet::All);
        assert!(scope.is_admin);
    }

    #[test]
    fn admin_and_manager_flags_can_coexist() {
        let mut e = manager(5, "Sam");
        e.is_admin = true;
        let scope = AccessScope::for_employee(&e, &[6]);
        // admin wins: no point materializing the subordinate set
        assert_eq!(scope.agents, ScopeSet::All);
    }

    #[test]
    fn narrowing_outside_scope_is_denied() {
        let e = employee(4, "Dana");
        let scope = AccessScope::for_employee(&e, &[]);
        let err = scope.narrow_agents(&[4, 17]).unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[test]
    fn narrowing_to_subset_keeps_subset() {
        let m = manager(1, "Morgan");
        let scope = AccessScope::for_employee(&m, &[2, 3]);
        let narrowed = scope.narrow_agents(&[3]).unwrap();
        assert_eq!(narrowed.agents, ScopeSet::ids([3]));
    }

    #[test]
    fn sentinel_agent_id_defers_to_resolved_scope() {
        let m = manager(1, "Morgan");
        let scope = AccessScope::for_employee(&m, &[2]);
        let narrowed = scope.narrow_agents(&[ANY_AGENT_ID]).unwrap();
        assert_eq!(narrowed, scope);

        // mixed request: sentinel dropped, the concrete id narrows
        let narrowed = scope.narrow_agents(&[ANY_AGENT_ID, 2]).unwrap();
        assert_eq!(narrowed.agents, ScopeSet::ids([2]));
    }

    #[test]
    fn admin_bypasses_narrowing_checks() {
        let a = admin(9, "Avery");
        let scope = AccessScope::for_employee(&a, &[]);
        let narrowed = scope.narrow_agents(&[123, 456]).unwrap();
        assert_eq!(narrowed.agents, ScopeSet::ids([123, 456]));
    }

    #[tokio::test]
    async fn resolve_unknown_caller_is_not_found() {
        let repo = MemEmployeeRepo::new(vec![employee(1, "Ana")]);
        let resolver = AccessResolver::new(&repo);
        let err = resolver.resolve(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_deleted_caller_is_not_found() {
        let mut e = employee(1, "Ana");
        e.status = EmployeeStatus::Deleted;
        let repo = MemEmployeeRepo::new(vec![e]);
        let resolver = AccessResolver::new(&repo);
        let err = resolver.resolve(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn new_assignment_shows_up_on_re_resolve() {
        let repo = MemEmployeeRepo::new(vec![
            manager(1, "Morgan"),
            employee(2, "Ana"),
            employee(3, "Ben"),
            employee(4, "Cleo"),
        ]);
        repo.assign(1, 2);
        repo.assign(1, 3);

        let resolver = AccessResolver::new(&repo);
        let scope = resolver.resolve(1).await.unwrap();
        assert_eq!(scope.agents, ScopeSet::ids([1, 2, 3]));

        repo.assign(1, 4);
        let scope = resolver.resolve(1).await.unwrap();
        assert_eq!(scope.agents, ScopeSet::ids([1, 2, 3, 4]));
    }
}
