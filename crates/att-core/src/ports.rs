//! Narrow interfaces to the organization directory and credential store.
//!
//! Both checks run before any attendance logic: a caller that fails them
//! never reaches the resolver or the transition engine.

use serde::Serialize;

use crate::error::{AttendanceError, Denial, Entity};
use crate::types::{EmployeeIdentifier, OrgId, StaffId, SystemId};

/// The only caller role allowed to record attendance.
pub const SYSTEM_ROLE: &str = "System";

/// Who is calling, as presented with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub org_id: OrgId,
    pub system_id: SystemId,
    pub role: String,
}

/// A staff member as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: StaffId,
    pub org_id: OrgId,
    pub name: String,
    pub employee_code: Option<String>,
    pub email: Option<String>,
    pub badge_active: bool,
}

/// Organization and staff lookups.
pub trait Directory {
    type Error: From<AttendanceError>;

    /// Whether the organization exists.
    fn organization_exists(&self, org_id: &OrgId) -> Result<bool, Self::Error>;

    /// Finds a staff member by code or email across all organizations.
    fn find_staff(
        &self,
        identifier: &EmployeeIdentifier,
    ) -> Result<Option<StaffMember>, Self::Error>;
}

/// Service identity lookups.
pub trait CredentialStore: Directory {
    /// The organization a system identity is bound to, if it exists.
    fn system_organization(&self, system_id: &SystemId) -> Result<Option<OrgId>, Self::Error>;
}

/// Verifies the caller is a system identity bound to the requested organization.
pub fn authorize_caller<S: CredentialStore>(store: &S, caller: &Caller) -> Result<(), S::Error> {
    if caller.role != SYSTEM_ROLE {
        return Err(AttendanceError::from(Denial::RoleNotPermitted {
            role: caller.role.clone(),
        })
        .into());
    }
    if !store.organization_exists(&caller.org_id)? {
        return Err(AttendanceError::not_found(Entity::Organization, caller.org_id.as_str()).into());
    }
    match store.system_organization(&caller.system_id)? {
        None => Err(AttendanceError::not_found(Entity::System, caller.system_id.as_str()).into()),
        Some(org_id) if org_id != caller.org_id => {
            Err(AttendanceError::from(Denial::SystemOrgMismatch).into())
        }
        Some(_) => Ok(()),
    }
}

/// Resolves the scanned employee within the caller's organization.
pub fn resolve_staff<D: Directory>(
    directory: &D,
    org_id: &OrgId,
    identifier: &EmployeeIdentifier,
) -> Result<StaffMember, D::Error> {
    let staff = directory
        .find_staff(identifier)?
        .ok_or_else(|| AttendanceError::not_found(Entity::Staff, identifier.value()))?;
    if &staff.org_id != org_id {
        return Err(AttendanceError::from(Denial::StaffOrgMismatch).into());
    }
    if !staff.badge_active {
        return Err(AttendanceError::from(Denial::BadgeDeactivated).into());
    }
    Ok(staff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryDirectory {
        orgs: Vec<OrgId>,
        systems: HashMap<SystemId, OrgId>,
        staff: Vec<StaffMember>,
    }

    impl Directory for MemoryDirectory {
        type Error = AttendanceError;

        fn organization_exists(&self, org_id: &OrgId) -> Result<bool, Self::Error> {
            Ok(self.orgs.contains(org_id))
        }

        fn find_staff(
            &self,
            identifier: &EmployeeIdentifier,
        ) -> Result<Option<StaffMember>, Self::Error> {
            Ok(self
                .staff
                .iter()
                .find(|s| match identifier {
                    EmployeeIdentifier::Code(code) => s.employee_code.as_ref() == Some(code),
                    EmployeeIdentifier::Email(email) => s.email.as_ref() == Some(email),
                })
                .cloned())
        }
    }

    impl CredentialStore for MemoryDirectory {
        fn system_organization(&self, system_id: &SystemId) -> Result<Option<OrgId>, Self::Error> {
            Ok(self.systems.get(system_id).cloned())
        }
    }

    fn org(id: &str) -> OrgId {
        OrgId::new(id).unwrap()
    }

    fn fixture() -> MemoryDirectory {
        let mut dir = MemoryDirectory {
            orgs: vec![org("acme"), org("globex")],
            ..MemoryDirectory::default()
        };
        dir.systems
            .insert(SystemId::new("kiosk-1").unwrap(), org("acme"));
        dir.staff.push(StaffMember {
            id: StaffId::new("staff-1").unwrap(),
            org_id: org("acme"),
            name: "Ana".to_string(),
            employee_code: Some("E-1".to_string()),
            email: Some("ana@acme.test".to_string()),
            badge_active: true,
        });
        dir.staff.push(StaffMember {
            id: StaffId::new("staff-2").unwrap(),
            org_id: org("acme"),
            name: "Ben".to_string(),
            employee_code: Some("E-2".to_string()),
            email: None,
            badge_active: false,
        });
        dir
    }

    fn caller(org_id: &str, system: &str, role: &str) -> Caller {
        Caller {
            org_id: org(org_id),
            system_id: SystemId::new(system).unwrap(),
            role: role.to_string(),
        }
    }

    #[test]
    fn system_caller_bound_to_org_is_authorized() {
        let dir = fixture();
        assert_eq!(authorize_caller(&dir, &caller("acme", "kiosk-1", "System")), Ok(()));
    }

    #[test]
    fn non_system_role_is_rejected() {
        let dir = fixture();
        let err = authorize_caller(&dir, &caller("acme", "kiosk-1", "Admin")).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::from(Denial::RoleNotPermitted {
                role: "Admin".to_string()
            })
        );
    }

    #[test]
    fn system_bound_elsewhere_is_rejected() {
        let dir = fixture();
        let err = authorize_caller(&dir, &caller("globex", "kiosk-1", "System")).unwrap_err();
        assert_eq!(err, AttendanceError::from(Denial::SystemOrgMismatch));

        let err = authorize_caller(&dir, &caller("acme", "kiosk-9", "System")).unwrap_err();
        assert_eq!(err.kind(), "NotFound");

        let err = authorize_caller(&dir, &caller("initech", "kiosk-1", "System")).unwrap_err();
        assert_eq!(err, AttendanceError::not_found(Entity::Organization, "initech"));
    }

    #[test]
    fn staff_lookup_reports_each_condition_distinctly() {
        let dir = fixture();
        let code = |c: &str| EmployeeIdentifier::Code(c.to_string());

        let staff = resolve_staff(&dir, &org("acme"), &code("E-1")).unwrap();
        assert_eq!(staff.name, "Ana");

        let by_email = EmployeeIdentifier::Email("ana@acme.test".to_string());
        assert_eq!(resolve_staff(&dir, &org("acme"), &by_email).unwrap().id, staff.id);

        assert_eq!(
            resolve_staff(&dir, &org("acme"), &code("E-404")).unwrap_err(),
            AttendanceError::not_found(Entity::Staff, "E-404")
        );
        assert_eq!(
            resolve_staff(&dir, &org("globex"), &code("E-1")).unwrap_err(),
            AttendanceError::from(Denial::StaffOrgMismatch)
        );
        assert_eq!(
            resolve_staff(&dir, &org("acme"), &code("E-2")).unwrap_err(),
            AttendanceError::from(Denial::BadgeDeactivated)
        );
    }
}
