//! Directory and credential lookups backed by the database.

use att_core::{CredentialStore, Directory, EmployeeIdentifier, OrgId, StaffMember, SystemId};
use rusqlite::OptionalExtension;

use crate::{Database, DbError, organization_exists, query_staff};

impl Directory for Database {
    type Error = DbError;

    fn organization_exists(&self, org_id: &OrgId) -> Result<bool, DbError> {
        organization_exists(&self.conn, org_id)
    }

    fn find_staff(&self, identifier: &EmployeeIdentifier) -> Result<Option<StaffMember>, DbError> {
        let staff = match identifier {
            EmployeeIdentifier::Code(code) => {
                query_staff(&self.conn, "WHERE employee_code = ?", [code.as_str()])?
            }
            EmployeeIdentifier::Email(email) => {
                query_staff(&self.conn, "WHERE email = ?", [email.to_lowercase()])?
            }
        };
        Ok(staff.into_iter().next())
    }
}

impl CredentialStore for Database {
    fn system_organization(&self, system_id: &SystemId) -> Result<Option<OrgId>, DbError> {
        let org_id: Option<String> = self
            .conn
            .query_row(
                "SELECT org_id FROM system_identities WHERE id = ?",
                [system_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(org_id.map(OrgId::new).transpose()?)
    }
}
